//! JSON HTTP API for trysql.
//!
//! Exposes an axum [`Router`] backed by any [`trysql_core::TenantStore`].
//! CORS, tracing layers and transport concerns are the caller's
//! responsibility.
//!
//! | Method | Path         | Handler                |
//! |--------|--------------|------------------------|
//! | `GET`  | `/api`       | [`tables::describe`]   |
//! | `POST` | `/api`       | [`query::execute`]     |
//! | `POST` | `/api/new`   | [`tenants::create`]    |
//! | `POST` | `/api/reset` | [`tenants::reset`]     |

pub mod error;
pub mod query;
pub mod tables;
pub mod tenants;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use chrono::TimeDelta;
use trysql_core::TenantStore;

pub use error::ApiError;

/// Shared state threaded through all handlers.
pub struct AppState<S> {
  pub store:     Arc<S>,
  /// Tenants untouched for longer than this are swept before each creation.
  pub retention: TimeDelta,
}

// Derived `Clone` would demand `S: Clone`.
impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), retention: self.retention }
  }
}

/// Build the API router for `state`.
///
/// The returned `Router<()>` can be merged into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: TenantStore + 'static,
{
  Router::new()
    .route("/api", get(tables::describe::<S>).post(query::execute::<S>))
    .route("/api/new", post(tenants::create::<S>))
    .route("/api/reset", post(tenants::reset::<S>))
    .with_state(state)
}

#[cfg(test)]
mod tests;
