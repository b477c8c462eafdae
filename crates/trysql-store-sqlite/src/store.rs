//! [`SqliteTenants`] — the SQLite implementation of [`TenantStore`].

use std::path::PathBuf;

use chrono::TimeDelta;
use trysql_core::{
  PublicId, SweepReport, TableDescription, Tabular, store::TenantStore,
};

use crate::{
  Error, Result,
  locator::TenantLocator,
  reaper::Reaper,
  registry::SqliteRegistry,
};

/// Registry plus tenant files, all under one data directory.
///
/// Cloning is cheap — the registry connection is shared.
#[derive(Clone)]
pub struct SqliteTenants {
  registry: SqliteRegistry,
  locator:  TenantLocator,
}

impl SqliteTenants {
  /// Open the store rooted at `data_dir`, creating the directory and the
  /// registry file if needed.
  pub async fn open(data_dir: impl Into<PathBuf>) -> Result<Self> {
    let locator = TenantLocator::new(data_dir);
    locator.ensure_dir().await?;
    let registry = SqliteRegistry::open(locator.registry_path()).await?;
    Ok(Self { registry, locator })
  }

  pub fn new(registry: SqliteRegistry, locator: TenantLocator) -> Self {
    Self { registry, locator }
  }

  pub fn registry(&self) -> &SqliteRegistry { &self.registry }

  pub fn locator(&self) -> &TenantLocator { &self.locator }

  pub fn reaper(&self) -> Reaper<'_> { Reaper::new(&self.registry, &self.locator) }
}

impl TenantStore for SqliteTenants {
  type Error = Error;

  async fn create_tenant(&self) -> Result<PublicId> {
    let id = self.registry.create().await?;
    tracing::info!(%id, "created tenant");
    Ok(id)
  }

  async fn exists(&self, id: PublicId) -> Result<bool> {
    self.registry.exists(&id).await
  }

  async fn touch(&self, id: PublicId) -> Result<()> {
    self.registry.touch(&id).await
  }

  async fn describe(&self, id: PublicId) -> Result<Vec<TableDescription>> {
    self.locator.open(&id).await?.describe().await
  }

  async fn execute(&self, id: PublicId, sql: String) -> Result<Tabular> {
    self.locator.open(&id).await?.execute(sql).await
  }

  async fn reset(&self, id: PublicId) -> Result<()> {
    let had_entry = self.registry.remove(&id).await?;
    let had_file = self.locator.remove(&id).await?;
    if !had_entry && !had_file {
      return Err(Error::NotFound(id));
    }
    tracing::info!(%id, had_entry, had_file, "reset tenant");
    Ok(())
  }

  async fn sweep(&self, max_age: TimeDelta) -> Result<SweepReport> {
    self.reaper().sweep(max_age).await
  }
}
