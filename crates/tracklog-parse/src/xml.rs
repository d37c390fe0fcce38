//! XML payloads, read into a small owned element tree.
//!
//! Names keep their namespace prefix as written. Text and CDATA directly
//! inside an element are concatenated into [`Element::text`]; whitespace
//! between elements is dropped.

use std::collections::BTreeMap;

use quick_xml::{
  Reader,
  events::{BytesStart, Event},
};

use crate::{Error, Parsed, Result, as_text};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
  pub name:       String,
  pub attributes: BTreeMap<String, String>,
  pub text:       String,
  pub children:   Vec<Element>,
}

impl Element {
  /// The first child named `name`.
  pub fn child(&self, name: &str) -> Option<&Element> {
    self.children.iter().find(|c| c.name == name)
  }

  pub fn children_named<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Iterator<Item = &'a Element> + 'a {
    self.children.iter().filter(move |c| c.name == name)
  }

  pub fn attr(&self, name: &str) -> Option<&str> {
    self.attributes.get(name).map(String::as_str)
  }

  /// Trimmed text of the child `name`, or an unmarshalling error if the
  /// child is missing.
  pub fn required_text(&self, name: &str) -> Result<&str> {
    self
      .child(name)
      .map(|c| c.text.trim())
      .ok_or_else(|| {
        Error::Unmarshalling(format!("<{}> has no <{name}> child", self.name))
      })
  }
}

/// Parse `raw` into its root element.
pub fn parse_xml(raw: impl AsRef<[u8]>) -> Result<Parsed<Element>> {
  let text = as_text(raw.as_ref())?;
  let mut reader = Reader::from_str(text);
  reader.config_mut().trim_text(true);

  let mut stack: Vec<Element> = Vec::new();
  let mut root: Option<Element> = None;

  loop {
    let event = match reader.read_event() {
      Ok(event) => event,
      Err(e) => {
        let at = reader.error_position();
        return Err(Error::Xml(format!("at byte {at}: {e}")));
      }
    };

    match event {
      Event::Start(ref e) => stack.push(open(e)?),
      Event::Empty(ref e) => {
        let element = open(e)?;
        close(&mut stack, &mut root, element)?;
      }
      Event::End(_) => {
        let element = stack
          .pop()
          .ok_or_else(|| Error::Xml("unexpected closing tag".into()))?;
        close(&mut stack, &mut root, element)?;
      }
      Event::Text(e) => {
        let text = e.unescape().map_err(|e| Error::Xml(e.to_string()))?;
        push_text(&mut stack, &text)?;
      }
      Event::CData(e) => {
        let bytes = e.into_inner();
        push_text(&mut stack, &String::from_utf8_lossy(&bytes))?;
      }
      Event::Eof => break,
      // Declarations, comments, processing instructions and doctypes.
      _ => {}
    }
  }

  if let Some(open) = stack.last() {
    return Err(Error::Xml(format!("unclosed element <{}>", open.name)));
  }
  root
    .map(Parsed::new)
    .ok_or_else(|| Error::Xml("document has no root element".into()))
}

fn open(start: &BytesStart<'_>) -> Result<Element> {
  let mut attributes = BTreeMap::new();
  for attr in start.attributes() {
    let attr = attr.map_err(|e| Error::Xml(e.to_string()))?;
    let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
    let value = attr
      .unescape_value()
      .map_err(|e| Error::Xml(e.to_string()))?
      .into_owned();
    attributes.insert(key, value);
  }

  Ok(Element {
    name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
    attributes,
    ..Element::default()
  })
}

/// Attach a finished element to its parent, or make it the root.
fn close(
  stack: &mut [Element],
  root: &mut Option<Element>,
  element: Element,
) -> Result<()> {
  match stack.last_mut() {
    Some(parent) => parent.children.push(element),
    None if root.is_some() => {
      return Err(Error::Xml(format!(
        "second root element <{}>",
        element.name
      )));
    }
    None => *root = Some(element),
  }
  Ok(())
}

fn push_text(stack: &mut [Element], text: &str) -> Result<()> {
  match stack.last_mut() {
    Some(current) => {
      current.text.push_str(text);
      Ok(())
    }
    None => {
      Err(Error::Xml(format!("text outside the root element: {text:?}")))
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const TICKET: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
    <!-- exported ticket -->
    <ticket id="42" tracker="trac">
      <summary>crash &amp; burn</summary>
      <status>closed</status>
      <description><![CDATA[<b>bold</b> claim]]></description>
      <change field="status" old="new" new="open"/>
      <change field="status" old="open" new="closed"/>
    </ticket>"#;

  #[test]
  fn builds_element_tree() {
    let parsed = parse_xml(TICKET).unwrap();
    let ticket = parsed.data();

    assert_eq!(ticket.name, "ticket");
    assert_eq!(ticket.attr("id"), Some("42"));
    assert_eq!(ticket.children.len(), 5);
    assert_eq!(ticket.required_text("summary").unwrap(), "crash & burn");
    assert_eq!(
      ticket.child("description").unwrap().text,
      "<b>bold</b> claim"
    );

    let news: Vec<_> = ticket
      .children_named("change")
      .filter_map(|c| c.attr("new"))
      .collect();
    assert_eq!(news, ["open", "closed"]);
  }

  #[test]
  fn data_is_stable_across_calls() {
    let parsed = parse_xml(TICKET).unwrap();
    assert_eq!(parsed.data(), parsed.data());
    assert_eq!(parsed.clone().into_data(), *parsed.data());
  }

  #[test]
  fn keeps_namespace_prefixes() {
    let parsed =
      parse_xml(r#"<rdf:RDF xmlns:rdf="urn:x"><rdf:li>a</rdf:li></rdf:RDF>"#)
        .unwrap();
    assert_eq!(parsed.data().name, "rdf:RDF");
    assert_eq!(parsed.data().required_text("rdf:li").unwrap(), "a");
  }

  #[test]
  fn rejects_binary_input() {
    let err = parse_xml(b"<a>\xff</a>").unwrap_err();
    assert!(matches!(err, Error::NotText(_)));
  }

  #[test]
  fn rejects_mismatched_tags() {
    let err = parse_xml("<a><b></a>").unwrap_err();
    assert!(matches!(err, Error::Xml(_)));
  }

  #[test]
  fn rejects_unclosed_root() {
    let err = parse_xml("<a><b/>").unwrap_err();
    assert!(matches!(err, Error::Xml(_)));
  }

  #[test]
  fn rejects_empty_document() {
    let err = parse_xml("<?xml version=\"1.0\"?>").unwrap_err();
    assert!(matches!(err, Error::Xml(msg) if msg.contains("no root")));
  }

  #[test]
  fn rejects_second_root() {
    let err = parse_xml("<a/><b/>").unwrap_err();
    assert!(matches!(err, Error::Xml(msg) if msg.contains("second root")));
  }

  #[test]
  fn missing_child_is_unmarshalling_error() {
    let parsed = parse_xml("<ticket><status>new</status></ticket>").unwrap();
    let err = parsed.data().required_text("summary").unwrap_err();
    assert!(matches!(err, Error::Unmarshalling(_)));
  }
}
