//! Error types for `trysql-core`, plus the taxonomy every backend maps into.

use thiserror::Error;

/// Coarse classification shared by every layer.
///
/// The HTTP adapter picks a status code from this alone; backends decide
/// which of their variants land where.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  /// Unknown, reaped or reset public identifier.
  NotFound,
  /// Missing or malformed request input.
  Validation,
  /// The SQL itself failed: syntax, constraint, type mismatch.
  Execution,
  /// Filesystem or engine I/O failure.
  Storage,
}

/// Implemented by every error type that crosses the store boundary.
pub trait Classify {
  fn kind(&self) -> ErrorKind;
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid public id: {0:?}")]
  InvalidPublicId(String),
}

impl Classify for Error {
  fn kind(&self) -> ErrorKind {
    match self {
      Error::InvalidPublicId(_) => ErrorKind::Validation,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
