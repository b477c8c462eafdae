//! The `TenantStore` trait.
//!
//! Implemented by storage backends (e.g. `trysql-store-sqlite`). The HTTP
//! layer depends on this abstraction, not on any concrete backend.

use std::future::Future;

use chrono::TimeDelta;

use crate::{
  error::Classify,
  id::PublicId,
  tabular::{TableDescription, Tabular},
};

/// Default retention window: a tenant untouched for this long is stale.
pub const DEFAULT_RETENTION: TimeDelta = TimeDelta::days(1);

/// Outcome of one reaper pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
  /// Registry entries removed for staleness.
  pub stale:    Vec<PublicId>,
  /// Tenant files deleted because no registry entry claimed them.
  pub orphaned: Vec<PublicId>,
}

/// Lifecycle and query operations over isolated tenant databases.
///
/// Existence checks are the caller's job: `describe` and `execute` open the
/// tenant's file whether or not the registry knows about it.
pub trait TenantStore: Send + Sync {
  type Error: std::error::Error + Classify + Send + Sync + 'static;

  /// Allocate a new identifier and register it with current freshness.
  fn create_tenant(
    &self,
  ) -> impl Future<Output = Result<PublicId, Self::Error>> + Send + '_;

  /// Whether a live registry entry exists for `id`.
  fn exists(
    &self,
    id: PublicId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Mark `id` as used now. Fails with a not-found error if unregistered.
  fn touch(
    &self,
    id: PublicId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Every user table in the tenant database, with all rows.
  fn describe(
    &self,
    id: PublicId,
  ) -> impl Future<Output = Result<Vec<TableDescription>, Self::Error>> + Send + '_;

  /// Run exactly one SQL statement against the tenant database.
  fn execute(
    &self,
    id: PublicId,
    sql: String,
  ) -> impl Future<Output = Result<Tabular, Self::Error>> + Send + '_;

  /// Drop the tenant: its registry entry and its file.
  fn reset(
    &self,
    id: PublicId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Delete stale tenants and reconcile orphaned files.
  fn sweep(
    &self,
    max_age: TimeDelta,
  ) -> impl Future<Output = Result<SweepReport, Self::Error>> + Send + '_;
}
