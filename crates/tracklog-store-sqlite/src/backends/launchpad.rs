use tracklog_core::{
  backend::{FieldTable, LogBackend, translate},
  snapshot::SnapshotField,
};

use crate::schema::log_table_ddl;

// Launchpad's activity log has no priority or resolution changes.
const FIELDS: FieldTable = &[
  ("title", SnapshotField::Summary),
  ("description", SnapshotField::Description),
  ("status", SnapshotField::Status),
  ("assignee", SnapshotField::AssignedTo),
  ("milestone", SnapshotField::Custom("milestone")),
  ("tags", SnapshotField::Custom("tags")),
];

const CUSTOM: &[&str] = &["milestone", "tags"];

#[derive(Debug, Clone, Copy, Default)]
pub struct Launchpad;

impl LogBackend for Launchpad {
  fn name(&self) -> &'static str { "launchpad" }

  fn table_name(&self) -> &'static str { "issues_log_launchpad" }

  fn translate_field(&self, field: &str) -> Option<SnapshotField> {
    translate(FIELDS, field)
  }

  fn custom_columns(&self) -> &'static [&'static str] { CUSTOM }

  fn schema_ddl(&self) -> String { log_table_ddl(self.table_name(), CUSTOM) }
}
