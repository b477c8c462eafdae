//! The stale-store reaper.
//!
//! A sweep has two phases:
//!
//! 1. **Registry-driven**: every entry older than the cutoff loses its file
//!    (if present) and then its row, in one bulk delete.
//! 2. **Orphans**: every tenant file on disk whose identifier no longer has a
//!    registry row is deleted.
//!
//! The first error aborts the sweep. Callers creating tenants log it and carry
//! on.

use chrono::{DateTime, TimeDelta, Utc};
use trysql_core::SweepReport;

use crate::{
  Result,
  locator::TenantLocator,
  registry::{SqliteRegistry, cutoff},
};

pub struct Reaper<'a> {
  registry: &'a SqliteRegistry,
  locator:  &'a TenantLocator,
}

impl<'a> Reaper<'a> {
  pub fn new(registry: &'a SqliteRegistry, locator: &'a TenantLocator) -> Self {
    Self { registry, locator }
  }

  /// Sweep everything untouched for longer than `max_age`.
  pub async fn sweep(&self, max_age: TimeDelta) -> Result<SweepReport> {
    self.sweep_before(cutoff(max_age)?).await
  }

  /// Sweep everything last touched strictly before `cutoff`.
  pub async fn sweep_before(&self, cutoff: DateTime<Utc>) -> Result<SweepReport> {
    let stale = self.registry.list_stale_before(cutoff).await?;
    for id in &stale {
      if self.locator.remove(id).await? {
        tracing::debug!(%id, "removed stale tenant file");
      }
    }
    let deleted = self.registry.delete_stale_before(cutoff).await?;

    let orphaned = self.reconcile_orphans().await?;

    if deleted > 0 || !orphaned.is_empty() {
      tracing::info!(stale = deleted, orphaned = orphaned.len(), "sweep removed tenants");
    }
    Ok(SweepReport { stale, orphaned })
  }

  /// Delete tenant files that no registry entry claims.
  pub async fn reconcile_orphans(&self) -> Result<Vec<trysql_core::PublicId>> {
    // Files first: a tenant's row is inserted before its file can exist, so
    // every listed file that is live is also in the id snapshot below.
    let files = self.locator.list_tenant_files().await?;
    let live = self.registry.list_public_ids().await?;
    let mut orphaned = Vec::new();
    for id in files {
      if live.contains(&id) {
        continue;
      }
      if self.locator.remove(&id).await? {
        tracing::debug!(%id, "removed orphaned tenant file");
        orphaned.push(id);
      }
    }
    Ok(orphaned)
  }
}
