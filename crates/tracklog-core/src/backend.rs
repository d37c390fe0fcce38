//! The capability interface every issue-log backend implements.
//!
//! The replay algorithm is the same for all trackers. What differs is which
//! field names a tracker reports in its change history, which snapshot
//! columns they map onto, and the shape of the backend's log table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  model::{Change, Issue},
  snapshot::{IssueSnapshot, SnapshotField},
};

/// A static field-name → snapshot-column translation table.
pub type FieldTable = &'static [(&'static str, SnapshotField)];

/// Look `field` up in a translation table.
pub fn translate(table: FieldTable, field: &str) -> Option<SnapshotField> {
  table
    .iter()
    .find(|(name, _)| *name == field)
    .map(|(_, column)| *column)
}

/// One row of a backend's log table: the cumulative state of an issue right
/// after `change_id` applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRow {
  pub change_id:    i64,
  pub tracker_id:   i64,
  pub issue_id:     i64,
  /// External issue identifier, copied for readability of the log table.
  pub issue:        String,
  pub submitted_by: Option<i64>,
  pub submitted_on: DateTime<Utc>,
  pub changed_by:   Option<i64>,
  /// When the originating change happened.
  pub date:         DateTime<Utc>,
  pub snapshot:     IssueSnapshot,
}

impl LogRow {
  pub fn new(issue: &Issue, change: &Change, snapshot: IssueSnapshot) -> Self {
    Self {
      change_id: change.id,
      tracker_id: issue.tracker_id,
      issue_id: issue.id,
      issue: issue.issue.clone(),
      submitted_by: issue.submitted_by,
      submitted_on: issue.submitted_on,
      changed_by: change.changed_by,
      date: change.changed_on,
      snapshot,
    }
  }
}

/// Per-tracker specialisation of the issue-log replay.
///
/// Implementations are registered by tracker type name in a
/// [`LoggerRegistry`](crate::registry::LoggerRegistry).
pub trait LogBackend: Send + Sync {
  /// Tracker type this backend handles, e.g. `"trac"`.
  fn name(&self) -> &'static str;

  /// Name of the log table this backend writes to.
  fn table_name(&self) -> &'static str;

  /// Map a tracker-reported field name onto a snapshot column. `None` means
  /// the change is not tracked by this backend.
  fn translate_field(&self, field: &str) -> Option<SnapshotField>;

  /// Backend-specific columns of the log table, beyond the issue columns.
  fn custom_columns(&self) -> &'static [&'static str] { &[] }

  /// Build the log row persisted for one applied change.
  fn build_log_row(
    &self,
    issue: &Issue,
    change: &Change,
    snapshot: IssueSnapshot,
  ) -> LogRow {
    LogRow::new(issue, change, snapshot)
  }

  /// DDL creating the log table; must be idempotent.
  fn schema_ddl(&self) -> String;

  fn drop_ddl(&self) -> String {
    format!("DROP TABLE IF EXISTS {};", self.table_name())
  }
}
