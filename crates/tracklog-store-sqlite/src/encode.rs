//! Encoding and decoding helpers between tracklog domain types and SQLite
//! rows.
//!
//! Timestamps are stored as fixed-width RFC 3339 UTC strings with microsecond
//! precision, so ordering by the text column is chronological ordering.
//! Rows holding timestamps are read into `Raw*` structs first and decoded
//! outside the rusqlite row callback.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::Row;
use tracklog_core::model::{
  Attachment, Change, Comment, Issue, Person, Relationship, Tracker,
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Column lists ────────────────────────────────────────────────────────────

pub const TRACKER_COLUMNS: &str = "id, url, type, retrieved_on";

pub const PERSON_COLUMNS: &str = "id, user_id, tracker_id, name, email";

pub const ISSUE_COLUMNS: &str = "id, issue, tracker_id, type, summary, \
  description, status, resolution, priority, submitted_by, submitted_on, \
  assigned_to";

pub const COMMENT_COLUMNS: &str =
  "id, issue_id, text, submitted_by, submitted_on";

pub const ATTACHMENT_COLUMNS: &str =
  "id, issue_id, name, description, url, submitted_by, submitted_on";

pub const CHANGE_COLUMNS: &str =
  "id, issue_id, field, old_value, new_value, changed_by, changed_on";

pub const RELATIONSHIP_COLUMNS: &str = "id, issue_id, related_to, type";

// ─── Rows without timestamps ─────────────────────────────────────────────────

pub fn person_from_row(row: &Row<'_>) -> rusqlite::Result<Person> {
  Ok(Person {
    id:         row.get(0)?,
    user_id:    row.get(1)?,
    tracker_id: row.get(2)?,
    name:       row.get(3)?,
    email:      row.get(4)?,
  })
}

pub fn relationship_from_row(row: &Row<'_>) -> rusqlite::Result<Relationship> {
  Ok(Relationship {
    id:         row.get(0)?,
    issue_id:   row.get(1)?,
    related_to: row.get(2)?,
    kind:       row.get(3)?,
  })
}

// ─── Raw row types ───────────────────────────────────────────────────────────

pub struct RawTracker {
  pub id:           i64,
  pub url:          String,
  pub kind:         String,
  pub retrieved_on: String,
}

impl RawTracker {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:           row.get(0)?,
      url:          row.get(1)?,
      kind:         row.get(2)?,
      retrieved_on: row.get(3)?,
    })
  }

  pub fn into_tracker(self) -> Result<Tracker> {
    Ok(Tracker {
      id:           self.id,
      url:          self.url,
      kind:         self.kind,
      retrieved_on: decode_dt(&self.retrieved_on)?,
    })
  }
}

pub struct RawIssue {
  pub id:           i64,
  pub issue:        String,
  pub tracker_id:   i64,
  pub kind:         Option<String>,
  pub summary:      String,
  pub description:  Option<String>,
  pub status:       String,
  pub resolution:   Option<String>,
  pub priority:     Option<String>,
  pub submitted_by: Option<i64>,
  pub submitted_on: String,
  pub assigned_to:  Option<i64>,
}

impl RawIssue {
  /// Read the [`ISSUE_COLUMNS`] starting at column 0.
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:           row.get(0)?,
      issue:        row.get(1)?,
      tracker_id:   row.get(2)?,
      kind:         row.get(3)?,
      summary:      row.get(4)?,
      description:  row.get(5)?,
      status:       row.get(6)?,
      resolution:   row.get(7)?,
      priority:     row.get(8)?,
      submitted_by: row.get(9)?,
      submitted_on: row.get(10)?,
      assigned_to:  row.get(11)?,
    })
  }

  pub fn into_issue(self) -> Result<Issue> {
    Ok(Issue {
      id:           self.id,
      issue:        self.issue,
      tracker_id:   self.tracker_id,
      kind:         self.kind,
      summary:      self.summary,
      description:  self.description,
      status:       self.status,
      resolution:   self.resolution,
      priority:     self.priority,
      submitted_by: self.submitted_by,
      submitted_on: decode_dt(&self.submitted_on)?,
      assigned_to:  self.assigned_to,
    })
  }
}

pub struct RawComment {
  pub id:           i64,
  pub issue_id:     i64,
  pub text:         String,
  pub submitted_by: Option<i64>,
  pub submitted_on: String,
}

impl RawComment {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:           row.get(0)?,
      issue_id:     row.get(1)?,
      text:         row.get(2)?,
      submitted_by: row.get(3)?,
      submitted_on: row.get(4)?,
    })
  }

  pub fn into_comment(self) -> Result<Comment> {
    Ok(Comment {
      id:           self.id,
      issue_id:     self.issue_id,
      text:         self.text,
      submitted_by: self.submitted_by,
      submitted_on: decode_dt(&self.submitted_on)?,
    })
  }
}

pub struct RawAttachment {
  pub id:           i64,
  pub issue_id:     i64,
  pub name:         String,
  pub description:  Option<String>,
  pub url:          String,
  pub submitted_by: Option<i64>,
  pub submitted_on: String,
}

impl RawAttachment {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:           row.get(0)?,
      issue_id:     row.get(1)?,
      name:         row.get(2)?,
      description:  row.get(3)?,
      url:          row.get(4)?,
      submitted_by: row.get(5)?,
      submitted_on: row.get(6)?,
    })
  }

  pub fn into_attachment(self) -> Result<Attachment> {
    Ok(Attachment {
      id:           self.id,
      issue_id:     self.issue_id,
      name:         self.name,
      description:  self.description,
      url:          self.url,
      submitted_by: self.submitted_by,
      submitted_on: decode_dt(&self.submitted_on)?,
    })
  }
}

pub struct RawChange {
  pub id:         i64,
  pub issue_id:   i64,
  pub field:      String,
  pub old_value:  Option<String>,
  pub new_value:  Option<String>,
  pub changed_by: Option<i64>,
  pub changed_on: String,
}

impl RawChange {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      issue_id:   row.get(1)?,
      field:      row.get(2)?,
      old_value:  row.get(3)?,
      new_value:  row.get(4)?,
      changed_by: row.get(5)?,
      changed_on: row.get(6)?,
    })
  }

  pub fn into_change(self) -> Result<Change> {
    Ok(Change {
      id:         self.id,
      issue_id:   self.issue_id,
      field:      self.field,
      old_value:  self.old_value,
      new_value:  self.new_value,
      changed_by: self.changed_by,
      changed_on: decode_dt(&self.changed_on)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn encoded_timestamps_sort_chronologically() {
    let whole = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
    let later = whole + chrono::Duration::milliseconds(500);
    assert!(encode_dt(whole) < encode_dt(later));
    assert_eq!(encode_dt(whole).len(), encode_dt(later).len());
  }

  #[test]
  fn decode_inverts_encode() {
    let dt = Utc.with_ymd_and_hms(2011, 3, 14, 9, 26, 53).unwrap();
    assert_eq!(decode_dt(&encode_dt(dt)).unwrap(), dt);
  }

  #[test]
  fn decode_rejects_garbage() {
    assert!(matches!(decode_dt("yesterday"), Err(Error::DateParse(_))));
  }
}
