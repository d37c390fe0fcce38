//! Error types for `tracklog-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("no issue logger registered for tracker type {0:?}")]
  UnknownLogger(String),

  #[error("an issue logger is already registered for tracker type {0:?}")]
  DuplicateLogger(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
