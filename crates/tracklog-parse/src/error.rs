//! Error types for `tracklog-parse`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("input is not UTF-8 text: {0}")]
  NotText(#[from] std::str::Utf8Error),

  #[error("malformed xml: {0}")]
  Xml(String),

  #[error("malformed json: {0}")]
  Json(#[source] serde_json::Error),

  #[error("unmarshalling failed: {0}")]
  Unmarshalling(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
