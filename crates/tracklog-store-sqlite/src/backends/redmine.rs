use tracklog_core::{
  backend::{FieldTable, LogBackend, translate},
  snapshot::SnapshotField,
};

use crate::schema::log_table_ddl;

const FIELDS: FieldTable = &[
  ("subject", SnapshotField::Summary),
  ("description", SnapshotField::Description),
  ("status", SnapshotField::Status),
  ("priority", SnapshotField::Priority),
  ("tracker", SnapshotField::Kind),
  ("assigned_to", SnapshotField::AssignedTo),
  ("category", SnapshotField::Custom("category")),
  ("fixed_version", SnapshotField::Custom("fixed_version")),
  ("done_ratio", SnapshotField::Custom("done_ratio")),
];

const CUSTOM: &[&str] = &["category", "fixed_version", "done_ratio"];

/// Redmine journals; Redmine has no resolution field.
#[derive(Debug, Clone, Copy, Default)]
pub struct Redmine;

impl LogBackend for Redmine {
  fn name(&self) -> &'static str { "redmine" }

  fn table_name(&self) -> &'static str { "issues_log_redmine" }

  fn translate_field(&self, field: &str) -> Option<SnapshotField> {
    translate(FIELDS, field)
  }

  fn custom_columns(&self) -> &'static [&'static str] { CUSTOM }

  fn schema_ddl(&self) -> String { log_table_ddl(self.table_name(), CUSTOM) }
}
