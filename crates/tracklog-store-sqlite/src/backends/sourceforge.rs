use tracklog_core::{
  backend::{FieldTable, LogBackend, translate},
  snapshot::SnapshotField,
};

use crate::schema::log_table_ddl;

const FIELDS: FieldTable = &[
  ("summary", SnapshotField::Summary),
  ("status", SnapshotField::Status),
  ("resolution", SnapshotField::Resolution),
  ("priority", SnapshotField::Priority),
  ("assigned_to", SnapshotField::AssignedTo),
  ("artifact_group", SnapshotField::Custom("artifact_group")),
];

const CUSTOM: &[&str] = &["artifact_group"];

#[derive(Debug, Clone, Copy, Default)]
pub struct SourceForge;

impl LogBackend for SourceForge {
  fn name(&self) -> &'static str { "sourceforge" }

  fn table_name(&self) -> &'static str { "issues_log_sourceforge" }

  fn translate_field(&self, field: &str) -> Option<SnapshotField> {
    translate(FIELDS, field)
  }

  fn custom_columns(&self) -> &'static [&'static str] { CUSTOM }

  fn schema_ddl(&self) -> String { log_table_ddl(self.table_name(), CUSTOM) }
}
