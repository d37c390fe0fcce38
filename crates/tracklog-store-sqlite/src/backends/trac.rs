use tracklog_core::{
  backend::{FieldTable, LogBackend, translate},
  snapshot::SnapshotField,
};

use crate::schema::log_table_ddl;

const FIELDS: FieldTable = &[
  ("summary", SnapshotField::Summary),
  ("description", SnapshotField::Description),
  ("status", SnapshotField::Status),
  ("resolution", SnapshotField::Resolution),
  ("priority", SnapshotField::Priority),
  ("type", SnapshotField::Kind),
  ("owner", SnapshotField::AssignedTo),
  ("component", SnapshotField::Custom("component")),
  ("milestone", SnapshotField::Custom("milestone")),
  ("version", SnapshotField::Custom("version")),
  ("severity", SnapshotField::Custom("severity")),
  ("keywords", SnapshotField::Custom("keywords")),
];

const CUSTOM: &[&str] =
  &["component", "milestone", "version", "severity", "keywords"];

/// Trac reports every ticket field, priority and resolution included.
#[derive(Debug, Clone, Copy, Default)]
pub struct Trac;

impl LogBackend for Trac {
  fn name(&self) -> &'static str { "trac" }

  fn table_name(&self) -> &'static str { "issues_log_trac" }

  fn translate_field(&self, field: &str) -> Option<SnapshotField> {
    translate(FIELDS, field)
  }

  fn custom_columns(&self) -> &'static [&'static str] { CUSTOM }

  fn schema_ddl(&self) -> String { log_table_ddl(self.table_name(), CUSTOM) }
}
