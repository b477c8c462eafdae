//! Error type for `trysql-store-sqlite`.

use std::path::PathBuf;

use chrono::TimeDelta;
use rusqlite::ErrorCode;
use thiserror::Error;
use trysql_core::{Classify, ErrorKind, PublicId};

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] trysql_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  /// The tenant's SQL failed. Displays the engine's message unchanged.
  #[error("{0}")]
  Execution(rusqlite::Error),

  #[error("no SQL statement to execute")]
  EmptyStatement,

  #[error("exactly one SQL statement is accepted per request")]
  MultipleStatements,

  #[error("i/o error on {path:?}: {source}")]
  Io {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("database not found: {0}")]
  NotFound(PublicId),

  #[error("no unique public id after {0} attempts")]
  IdsExhausted(usize),

  #[error("retention {0} is negative or out of range")]
  RetentionOutOfRange(TimeDelta),
}

impl Error {
  pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
    Error::Io { path: path.into(), source }
  }
}

impl Classify for Error {
  fn kind(&self) -> ErrorKind {
    match self {
      Error::Core(e) => e.kind(),
      Error::NotFound(_) => ErrorKind::NotFound,
      Error::Execution(e) if is_storage_failure(e) => ErrorKind::Storage,
      Error::Execution(_) | Error::EmptyStatement | Error::MultipleStatements => {
        ErrorKind::Execution
      }
      Error::RetentionOutOfRange(_) => ErrorKind::Validation,
      Error::Database(_)
      | Error::Io { .. }
      | Error::DateParse(_)
      | Error::IdsExhausted(_) => ErrorKind::Storage,
    }
  }
}

/// Engine failures caused by the file or the disk rather than by the SQL.
fn is_storage_failure(e: &rusqlite::Error) -> bool {
  matches!(
    e,
    rusqlite::Error::SqliteFailure(
      rusqlite::ffi::Error {
        code: ErrorCode::SystemIoFailure
          | ErrorCode::CannotOpen
          | ErrorCode::NotADatabase
          | ErrorCode::DiskFull
          | ErrorCode::DatabaseCorrupt,
        ..
      },
      _,
    )
  )
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
