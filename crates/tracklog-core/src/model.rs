//! The canonical entity model and the ingestion input graph.
//!
//! Every tracker backend converges into these types. Persisted entities carry
//! an integer surrogate `id` assigned by the store in insertion order; the
//! `New*` types are what fetchers hand to the upsert engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── Persisted entities ──────────────────────────────────────────────────────

/// A remote issue tracker, identified by its URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tracker {
  pub id:           i64,
  pub url:          String,
  /// Backend type name, e.g. `"trac"` or `"launchpad"`.
  #[serde(rename = "type")]
  pub kind:         String,
  /// Refreshed every time the tracker is ingested again.
  pub retrieved_on: DateTime<Utc>,
}

/// An account on one tracker. Identities are never merged across trackers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
  pub id:         i64,
  /// The tracker-local account name.
  pub user_id:    String,
  pub tracker_id: i64,
  pub name:       Option<String>,
  pub email:      Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
  pub id:           i64,
  /// The tracker-local issue identifier (e.g. `"42"` or `"LP#1234"`).
  pub issue:        String,
  pub tracker_id:   i64,
  #[serde(rename = "type")]
  pub kind:         Option<String>,
  pub summary:      String,
  pub description:  Option<String>,
  pub status:       String,
  pub resolution:   Option<String>,
  pub priority:     Option<String>,
  /// `None` once the submitting person has been deleted.
  pub submitted_by: Option<i64>,
  pub submitted_on: DateTime<Utc>,
  pub assigned_to:  Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
  pub id:           i64,
  pub issue_id:     i64,
  pub text:         String,
  pub submitted_by: Option<i64>,
  pub submitted_on: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
  pub id:           i64,
  pub issue_id:     i64,
  pub name:         String,
  pub description:  Option<String>,
  pub url:          String,
  pub submitted_by: Option<i64>,
  pub submitted_on: DateTime<Utc>,
}

/// One entry of an issue's append-only change ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
  pub id:         i64,
  pub issue_id:   i64,
  /// The field name as reported by the tracker, before any translation.
  pub field:      String,
  pub old_value:  Option<String>,
  pub new_value:  Option<String>,
  pub changed_by: Option<i64>,
  pub changed_on: DateTime<Utc>,
}

/// A directed edge between two issues (`issue_id` → `related_to`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
  pub id:         i64,
  pub issue_id:   i64,
  pub related_to: i64,
  /// Free-form relation label, e.g. `"duplicates"` or `"blocks"`.
  #[serde(rename = "type")]
  pub kind:       String,
}

// ─── Ingestion input graph ───────────────────────────────────────────────────

/// A person as reported by a fetcher; resolved to a [`Person`] by natural key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPerson {
  pub user_id: String,
  #[serde(default)]
  pub name:    Option<String>,
  #[serde(default)]
  pub email:   Option<String>,
}

impl NewPerson {
  /// A person known only by account name.
  pub fn new(user_id: impl Into<String>) -> Self {
    Self { user_id: user_id.into(), name: None, email: None }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewComment {
  pub text:         String,
  pub submitted_by: NewPerson,
  pub submitted_on: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAttachment {
  pub name:         String,
  #[serde(default)]
  pub description:  Option<String>,
  pub url:          String,
  pub submitted_by: NewPerson,
  pub submitted_on: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewChange {
  pub field:      String,
  #[serde(default)]
  pub old_value:  Option<String>,
  #[serde(default)]
  pub new_value:  Option<String>,
  pub changed_by: NewPerson,
  pub changed_on: DateTime<Utc>,
}

/// An edge to another issue of the same tracker, named by its external id.
///
/// The target may not have been ingested yet, so these are resolved by the
/// orchestrator once a whole batch is in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRelation {
  pub related_to: String,
  #[serde(rename = "type")]
  pub kind:       String,
}

/// A complete issue graph as produced by a fetcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewIssue {
  pub issue:        String,
  #[serde(rename = "type", default)]
  pub kind:         Option<String>,
  pub summary:      String,
  #[serde(default)]
  pub description:  Option<String>,
  pub status:       String,
  #[serde(default)]
  pub resolution:   Option<String>,
  #[serde(default)]
  pub priority:     Option<String>,
  pub submitted_by: NewPerson,
  pub submitted_on: DateTime<Utc>,
  #[serde(default)]
  pub assigned_to:  Option<NewPerson>,
  #[serde(default)]
  pub comments:     Vec<NewComment>,
  #[serde(default)]
  pub attachments:  Vec<NewAttachment>,
  #[serde(default)]
  pub changes:      Vec<NewChange>,
  #[serde(default)]
  pub related:      Vec<NewRelation>,
}

impl NewIssue {
  /// Convenience constructor with every optional part left empty.
  pub fn new(
    issue: impl Into<String>,
    summary: impl Into<String>,
    status: impl Into<String>,
    submitted_by: NewPerson,
    submitted_on: DateTime<Utc>,
  ) -> Self {
    Self {
      issue: issue.into(),
      kind: None,
      summary: summary.into(),
      description: None,
      status: status.into(),
      resolution: None,
      priority: None,
      submitted_by,
      submitted_on,
      assigned_to: None,
      comments: Vec::new(),
      attachments: Vec::new(),
      changes: Vec::new(),
      related: Vec::new(),
    }
  }
}
