//! JSON payloads.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{Error, Parsed, Result, as_text};

/// Parse `raw` into a JSON value.
pub fn parse_json(raw: impl AsRef<[u8]>) -> Result<Parsed<Value>> {
  let text = as_text(raw.as_ref())?;
  let value = serde_json::from_str(text).map_err(Error::Json)?;
  Ok(Parsed::new(value))
}

impl Parsed<Value> {
  /// Map the parsed value onto `T`.
  pub fn unmarshal<T: DeserializeOwned>(&self) -> Result<T> {
    T::deserialize(self.data()).map_err(|e| Error::Unmarshalling(e.to_string()))
  }
}

#[cfg(test)]
mod tests {
  use serde::Deserialize;

  use super::*;

  #[derive(Debug, Deserialize, PartialEq)]
  struct Ticket {
    id:     u32,
    status: String,
  }

  #[test]
  fn parses_object() {
    let parsed = parse_json(br#"{"id": 42, "status": "open"}"#).unwrap();
    assert_eq!(parsed.data()["status"], "open");
    // Repeated access reads the same value.
    assert_eq!(parsed.data(), parsed.data());
  }

  #[test]
  fn rejects_binary_input() {
    let err = parse_json([0xff, 0xfe, 0x00]).unwrap_err();
    assert!(matches!(err, Error::NotText(_)));
  }

  #[test]
  fn rejects_malformed_json() {
    let err = parse_json("{\"id\": ").unwrap_err();
    assert!(matches!(err, Error::Json(_)));
  }

  #[test]
  fn unmarshals_into_struct() {
    let parsed = parse_json(r#"{"id": 42, "status": "open"}"#).unwrap();
    let ticket: Ticket = parsed.unmarshal().unwrap();
    assert_eq!(ticket, Ticket { id: 42, status: "open".into() });
  }

  #[test]
  fn unmarshal_reports_missing_field() {
    let parsed = parse_json(r#"{"id": 42}"#).unwrap();
    let err = parsed.unmarshal::<Ticket>().unwrap_err();
    assert!(matches!(err, Error::Unmarshalling(msg) if msg.contains("status")));
  }
}
