//! Bundled issue-log backends, one per tracker type.
//!
//! Each backend only differs in the field names it recognises and the
//! custom columns of its log table; the replay itself is shared.

mod launchpad;
mod redmine;
mod sourceforge;
mod trac;

use std::sync::Arc;

use tracklog_core::{backend::LogBackend, registry::LoggerRegistry};

pub use launchpad::Launchpad;
pub use redmine::Redmine;
pub use sourceforge::SourceForge;
pub use trac::Trac;

/// Every bundled backend.
pub fn bundled() -> Vec<Arc<dyn LogBackend>> {
  vec![
    Arc::new(Launchpad),
    Arc::new(Redmine),
    Arc::new(SourceForge),
    Arc::new(Trac),
  ]
}

/// Register every bundled backend in `registry`.
pub fn register_all(registry: &mut LoggerRegistry) -> tracklog_core::Result<()> {
  for backend in bundled() {
    registry.register(backend)?;
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use tracklog_core::snapshot::SnapshotField;

  use super::*;

  fn registry() -> LoggerRegistry {
    let mut registry = LoggerRegistry::new();
    register_all(&mut registry).unwrap();
    registry
  }

  #[test]
  fn all_bundled_backends_are_registered() {
    let names: Vec<_> = registry().names().map(str::to_owned).collect();
    assert_eq!(names, ["launchpad", "redmine", "sourceforge", "trac"]);
  }

  #[test]
  fn table_names_are_distinct() {
    let mut tables: Vec<_> = bundled().iter().map(|b| b.table_name()).collect();
    tables.sort_unstable();
    tables.dedup();
    assert_eq!(tables.len(), bundled().len());
  }

  #[test]
  fn priority_recognised_by_trac_but_not_launchpad() {
    let registry = registry();
    let trac = registry.lookup("trac").unwrap();
    let launchpad = registry.lookup("launchpad").unwrap();

    assert_eq!(trac.translate_field("priority"), Some(SnapshotField::Priority));
    assert_eq!(launchpad.translate_field("priority"), None);
    assert_eq!(launchpad.translate_field("resolution"), None);
  }

  #[test]
  fn renamed_fields_translate() {
    let registry = registry();
    let launchpad = registry.lookup("launchpad").unwrap();
    let redmine = registry.lookup("redmine").unwrap();
    let trac = registry.lookup("trac").unwrap();

    assert_eq!(launchpad.translate_field("title"), Some(SnapshotField::Summary));
    assert_eq!(redmine.translate_field("subject"), Some(SnapshotField::Summary));
    assert_eq!(trac.translate_field("owner"), Some(SnapshotField::AssignedTo));
    assert_eq!(
      trac.translate_field("milestone"),
      Some(SnapshotField::Custom("milestone"))
    );
  }

  #[test]
  fn custom_targets_are_declared_columns() {
    let fields = [
      "milestone", "component", "version", "severity", "keywords", "tags",
      "category", "fixed_version", "done_ratio", "artifact_group",
    ];
    for backend in bundled() {
      for field in fields {
        if let Some(SnapshotField::Custom(column)) = backend.translate_field(field) {
          assert!(
            backend.custom_columns().contains(&column),
            "{}: {column} is not a column of {}",
            backend.name(),
            backend.table_name()
          );
        }
      }
    }
  }
}
