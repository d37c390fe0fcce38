//! Text parsing adapter for tracker payloads.
//!
//! Raw bytes go in, a [`Parsed`] value comes out: an [`Element`] tree for
//! XML and a [`serde_json::Value`] for JSON. Both parsers reject input that
//! is not UTF-8 text before looking at its structure.

pub mod error;
pub mod json;
pub mod xml;

pub use error::{Error, Result};
pub use json::parse_json;
pub use xml::{Element, parse_xml};

/// A successfully parsed payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed<T> {
  data: T,
}

impl<T> Parsed<T> {
  pub(crate) fn new(data: T) -> Self { Self { data } }

  pub fn data(&self) -> &T { &self.data }

  pub fn into_data(self) -> T { self.data }
}

/// Check that `raw` is UTF-8 text.
fn as_text(raw: &[u8]) -> Result<&str> { Ok(std::str::from_utf8(raw)?) }
