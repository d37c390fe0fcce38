//! Error type for `tracklog-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] tracklog_core::Error),

  #[error("database error: {0}")]
  Database(#[source] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("malformed row: {0}")]
  MalformedRow(String),

  /// A natural-key read-back found no row.
  #[error("not found: {0}")]
  NotFound(String),

  /// A uniqueness, foreign-key or CHECK constraint failed. The enclosing
  /// transaction has been rolled back.
  #[error("constraint violation: {0}")]
  ConstraintViolation(String),

  #[error("tracker {tracker:?} is of type {kind:?}, not {backend:?}")]
  BackendMismatch {
    tracker: String,
    kind:    String,
    backend: String,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl From<rusqlite::Error> for Error {
  fn from(err: rusqlite::Error) -> Self {
    match err {
      rusqlite::Error::SqliteFailure(code, msg)
        if code.code == rusqlite::ErrorCode::ConstraintViolation =>
      {
        Error::ConstraintViolation(msg.unwrap_or_else(|| code.to_string()))
      }
      other => Error::Database(tokio_rusqlite::Error::Rusqlite(other)),
    }
  }
}

impl From<tokio_rusqlite::Error> for Error {
  fn from(err: tokio_rusqlite::Error) -> Self {
    match err {
      tokio_rusqlite::Error::Rusqlite(inner) => inner.into(),
      other => Error::Database(other),
    }
  }
}
