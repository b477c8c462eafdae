//! Mapping between public identifiers and tenant database files.
//!
//! A tenant `abcDE` lives at `<dir>/user_abcDE.sqlite`. The mapping is
//! invertible so the reaper can recover identifiers from a directory listing.

use std::path::{Path, PathBuf};

use trysql_core::{PublicId, TableDescription, Tabular};

use crate::{Error, Result, exec};

/// File name of the registry inside the data directory.
pub const REGISTRY_FILE: &str = "master.sqlite";

const TENANT_PREFIX: &str = "user_";
const TENANT_SUFFIX: &str = ".sqlite";

/// Resolves tenants to files under one data directory.
#[derive(Debug, Clone)]
pub struct TenantLocator {
  dir: PathBuf,
}

impl TenantLocator {
  pub fn new(dir: impl Into<PathBuf>) -> Self { Self { dir: dir.into() } }

  pub fn dir(&self) -> &Path { &self.dir }

  pub fn registry_path(&self) -> PathBuf { self.dir.join(REGISTRY_FILE) }

  pub fn file_name(id: &PublicId) -> String {
    format!("{TENANT_PREFIX}{id}{TENANT_SUFFIX}")
  }

  pub fn path_for(&self, id: &PublicId) -> PathBuf {
    self.dir.join(Self::file_name(id))
  }

  /// Inverse of [`TenantLocator::file_name`]. Anything that does not follow
  /// the naming scheme yields `None`.
  pub fn public_id_from_file_name(name: &str) -> Option<PublicId> {
    let id = name.strip_prefix(TENANT_PREFIX)?.strip_suffix(TENANT_SUFFIX)?;
    PublicId::parse(id).ok()
  }

  /// Create the data directory if it does not exist yet.
  pub async fn ensure_dir(&self) -> Result<()> {
    tokio::fs::create_dir_all(&self.dir)
      .await
      .map_err(|e| Error::io(&self.dir, e))
  }

  /// Open the tenant's database, creating the directory and file on first use.
  ///
  /// The registry is not consulted.
  pub async fn open(&self, id: &PublicId) -> Result<TenantDb> {
    self.ensure_dir().await?;
    let conn = tokio_rusqlite::Connection::open(self.path_for(id)).await?;
    Ok(TenantDb { id: id.clone(), conn })
  }

  /// Delete the tenant's file. Returns `false` when it was already gone.
  pub async fn remove(&self, id: &PublicId) -> Result<bool> {
    let path = self.path_for(id);
    match tokio::fs::remove_file(&path).await {
      Ok(()) => Ok(true),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
      Err(e) => Err(Error::io(path, e)),
    }
  }

  /// Identifiers of every tenant file present on disk. A missing data
  /// directory holds no tenants.
  pub async fn list_tenant_files(&self) -> Result<Vec<PublicId>> {
    let mut entries = match tokio::fs::read_dir(&self.dir).await {
      Ok(entries) => entries,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
      Err(e) => return Err(Error::io(&self.dir, e)),
    };

    let mut ids = Vec::new();
    while let Some(entry) =
      entries.next_entry().await.map_err(|e| Error::io(&self.dir, e))?
    {
      let file_type = entry
        .file_type()
        .await
        .map_err(|e| Error::io(entry.path(), e))?;
      if !file_type.is_file() {
        continue;
      }
      if let Some(id) = entry
        .file_name()
        .to_str()
        .and_then(Self::public_id_from_file_name)
      {
        ids.push(id);
      }
    }
    ids.sort();
    Ok(ids)
  }
}

// ─── Tenant handle ───────────────────────────────────────────────────────────

/// An open connection to one tenant database.
///
/// Opened per request and dropped afterwards, so a handle never outlives the
/// reaper deleting its file by more than one request.
pub struct TenantDb {
  id:   PublicId,
  conn: tokio_rusqlite::Connection,
}

impl TenantDb {
  pub fn id(&self) -> &PublicId { &self.id }

  /// Every user table, its columns and all of its rows.
  pub async fn describe(&self) -> Result<Vec<TableDescription>> {
    let tables = self
      .conn
      .call(|conn| Ok(exec::describe(conn)?))
      .await?;
    Ok(tables)
  }

  /// Execute exactly one SQL statement.
  pub async fn execute(&self, sql: impl Into<String>) -> Result<Tabular> {
    let sql = sql.into();
    self.conn.call(move |conn| Ok(exec::execute(conn, &sql))).await?
  }
}
