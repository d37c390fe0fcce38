//! Point-in-time issue state.
//!
//! A snapshot is an immutable record of the tracked columns of one issue.
//! Replaying a change never mutates a snapshot; [`IssueSnapshot::apply`]
//! returns the successor state instead.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::Issue;

/// A snapshot column a backend can map a tracker field onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnapshotField {
  Kind,
  Summary,
  Description,
  Status,
  Resolution,
  Priority,
  AssignedTo,
  /// A backend-specific column of that backend's log table.
  Custom(&'static str),
}

impl SnapshotField {
  /// Column name used in the log tables.
  pub fn column(&self) -> &'static str {
    match self {
      Self::Kind => "type",
      Self::Summary => "summary",
      Self::Description => "description",
      Self::Status => "status",
      Self::Resolution => "resolution",
      Self::Priority => "priority",
      Self::AssignedTo => "assigned_to",
      Self::Custom(name) => *name,
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueSnapshot {
  #[serde(rename = "type")]
  pub kind:        Option<String>,
  pub summary:     Option<String>,
  pub description: Option<String>,
  pub status:      Option<String>,
  pub resolution:  Option<String>,
  pub priority:    Option<String>,
  /// Account name of the assignee, as trackers report it in changes.
  pub assigned_to: Option<String>,
  /// Values of backend-specific columns, keyed by column name.
  pub custom:      BTreeMap<String, Option<String>>,
}

impl IssueSnapshot {
  /// Seed a baseline from the issue's current canonical row.
  ///
  /// `assignee` is the `user_id` of the person the issue is assigned to.
  /// Backend-specific columns start out unset.
  pub fn from_issue(issue: &Issue, assignee: Option<String>) -> Self {
    Self {
      kind:        issue.kind.clone(),
      summary:     Some(issue.summary.clone()),
      description: issue.description.clone(),
      status:      Some(issue.status.clone()),
      resolution:  issue.resolution.clone(),
      priority:    issue.priority.clone(),
      assigned_to: assignee,
      custom:      BTreeMap::new(),
    }
  }

  /// Ensure every backend-specific column is present, unset if new.
  #[must_use]
  pub fn with_custom_columns(mut self, columns: &[&str]) -> Self {
    for column in columns {
      self.custom.entry((*column).to_owned()).or_insert(None);
    }
    self
  }

  pub fn get(&self, field: &SnapshotField) -> Option<&str> {
    match field {
      SnapshotField::Kind => self.kind.as_deref(),
      SnapshotField::Summary => self.summary.as_deref(),
      SnapshotField::Description => self.description.as_deref(),
      SnapshotField::Status => self.status.as_deref(),
      SnapshotField::Resolution => self.resolution.as_deref(),
      SnapshotField::Priority => self.priority.as_deref(),
      SnapshotField::AssignedTo => self.assigned_to.as_deref(),
      SnapshotField::Custom(name) => {
        self.custom.get(*name).and_then(|v| v.as_deref())
      }
    }
  }

  /// The successor snapshot with `field` set to `value`.
  #[must_use]
  pub fn apply(&self, field: &SnapshotField, value: Option<&str>) -> Self {
    let mut next = self.clone();
    let value = value.map(str::to_owned);
    match field {
      SnapshotField::Kind => next.kind = value,
      SnapshotField::Summary => next.summary = value,
      SnapshotField::Description => next.description = value,
      SnapshotField::Status => next.status = value,
      SnapshotField::Resolution => next.resolution = value,
      SnapshotField::Priority => next.priority = value,
      SnapshotField::AssignedTo => next.assigned_to = value,
      SnapshotField::Custom(name) => {
        next.custom.insert((*name).to_owned(), value);
      }
    }
    next
  }
}
