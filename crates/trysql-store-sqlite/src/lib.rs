//! SQLite backend for the trysql tenant service.
//!
//! One shared registry database tracks every tenant; each tenant owns a
//! separate SQLite file in the same directory. All access goes through
//! [`tokio_rusqlite`] so blocking SQLite calls never stall the async runtime.

mod encode;
mod exec;
mod schema;

pub mod error;
pub mod locator;
pub mod reaper;
pub mod registry;
pub mod store;

pub use error::{Error, Result};
pub use locator::{TenantDb, TenantLocator};
pub use reaper::Reaper;
pub use registry::SqliteRegistry;
pub use store::SqliteTenants;
