//! Core types and trait definitions for the trysql tenant service.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! The SQLite backend and the JSON API both build on it.

pub mod error;
pub mod id;
pub mod store;
pub mod tabular;
pub mod value;

pub use error::{Classify, Error, ErrorKind, Result};
pub use id::PublicId;
pub use store::{SweepReport, TenantStore};
pub use tabular::{Row, TableDescription, Tabular};
pub use value::Value;
