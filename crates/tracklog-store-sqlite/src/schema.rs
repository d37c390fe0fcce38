//! SQL schema for the canonical tracker store and the per-backend log tables.
//!
//! The canonical schema is executed once at connection startup. Log tables
//! are created on demand by the replay driver from each backend's DDL.

/// Canonical schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS trackers (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    url          TEXT NOT NULL UNIQUE,
    type         TEXT NOT NULL,
    retrieved_on TEXT NOT NULL       -- refreshed on every ingestion
);

-- People are scoped to one tracker; identities are never merged.
CREATE TABLE IF NOT EXISTS people (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id    TEXT    NOT NULL,
    tracker_id INTEGER NOT NULL REFERENCES trackers(id) ON DELETE CASCADE,
    name       TEXT,
    email      TEXT,
    UNIQUE (user_id, tracker_id)
);

CREATE TABLE IF NOT EXISTS issues (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    issue        TEXT    NOT NULL,
    tracker_id   INTEGER NOT NULL REFERENCES trackers(id) ON DELETE CASCADE,
    type         TEXT,
    summary      TEXT    NOT NULL,
    description  TEXT,
    status       TEXT    NOT NULL,
    resolution   TEXT,
    priority     TEXT,
    submitted_by INTEGER REFERENCES people(id) ON DELETE SET NULL,
    submitted_on TEXT    NOT NULL,
    assigned_to  INTEGER REFERENCES people(id) ON DELETE SET NULL,
    UNIQUE (issue, tracker_id)
);

CREATE TABLE IF NOT EXISTS related_to (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    issue_id   INTEGER NOT NULL REFERENCES issues(id) ON DELETE CASCADE,
    related_to INTEGER NOT NULL REFERENCES issues(id) ON DELETE CASCADE,
    type       TEXT    NOT NULL,
    UNIQUE (issue_id, related_to)
);

-- Comments, attachments and changes are write-once.
CREATE TABLE IF NOT EXISTS comments (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    issue_id     INTEGER NOT NULL REFERENCES issues(id) ON DELETE CASCADE,
    text         TEXT    NOT NULL,
    submitted_by INTEGER REFERENCES people(id) ON DELETE SET NULL,
    submitted_on TEXT    NOT NULL
);

CREATE TABLE IF NOT EXISTS attachments (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    issue_id     INTEGER NOT NULL REFERENCES issues(id) ON DELETE CASCADE,
    name         TEXT    NOT NULL,
    description  TEXT,
    url          TEXT    NOT NULL,
    submitted_by INTEGER REFERENCES people(id) ON DELETE SET NULL,
    submitted_on TEXT    NOT NULL
);

CREATE TABLE IF NOT EXISTS changes (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    issue_id   INTEGER NOT NULL REFERENCES issues(id) ON DELETE CASCADE,
    field      TEXT    NOT NULL CHECK (field <> ''),
    old_value  TEXT,
    new_value  TEXT,
    changed_by INTEGER REFERENCES people(id) ON DELETE SET NULL,
    changed_on TEXT    NOT NULL
);

CREATE INDEX IF NOT EXISTS people_tracker_idx    ON people(tracker_id);
CREATE INDEX IF NOT EXISTS issues_tracker_idx    ON issues(tracker_id);
CREATE INDEX IF NOT EXISTS comments_issue_idx    ON comments(issue_id);
CREATE INDEX IF NOT EXISTS attachments_issue_idx ON attachments(issue_id);
CREATE INDEX IF NOT EXISTS changes_replay_idx    ON changes(issue_id, changed_on, id);

PRAGMA user_version = 1;
";

/// Columns every log table has, in insert order. Custom columns follow.
pub const LOG_COLUMNS: &[&str] = &[
  "change_id",
  "tracker_id",
  "issue_id",
  "issue",
  "type",
  "summary",
  "description",
  "status",
  "resolution",
  "priority",
  "assigned_to",
  "submitted_by",
  "submitted_on",
  "changed_by",
  "date",
];

/// DDL for a backend log table: the issue columns, the links back to the
/// originating change, and one nullable `TEXT` column per custom column.
///
/// `change_id` is unique, so a replay over rows that were already logged
/// fails instead of duplicating them.
pub fn log_table_ddl(table: &str, custom_columns: &[&str]) -> String {
  let custom: String = custom_columns
    .iter()
    .map(|c| format!(",\n    \"{c}\" TEXT"))
    .collect();

  format!(
    "CREATE TABLE IF NOT EXISTS {table} (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    change_id    INTEGER NOT NULL UNIQUE REFERENCES changes(id) ON DELETE CASCADE,
    tracker_id   INTEGER NOT NULL REFERENCES trackers(id) ON DELETE CASCADE,
    issue_id     INTEGER NOT NULL REFERENCES issues(id) ON DELETE CASCADE,
    issue        TEXT    NOT NULL,
    type         TEXT,
    summary      TEXT,
    description  TEXT,
    status       TEXT,
    resolution   TEXT,
    priority     TEXT,
    assigned_to  TEXT,
    submitted_by INTEGER REFERENCES people(id) ON DELETE SET NULL,
    submitted_on TEXT    NOT NULL,
    changed_by   INTEGER REFERENCES people(id) ON DELETE SET NULL,
    date         TEXT    NOT NULL{custom}
);
CREATE INDEX IF NOT EXISTS {table}_issue_idx ON {table}(issue_id);
CREATE INDEX IF NOT EXISTS {table}_tracker_idx ON {table}(tracker_id);
"
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn log_table_ddl_appends_custom_columns() {
    let ddl = log_table_ddl("issues_log_x", &["milestone", "keywords"]);
    assert!(ddl.contains("CREATE TABLE IF NOT EXISTS issues_log_x"));
    assert!(ddl.contains("\"milestone\" TEXT"));
    assert!(ddl.contains("\"keywords\" TEXT"));
  }

  #[test]
  fn log_table_ddl_is_valid_sql() {
    let conn = rusqlite::Connection::open_in_memory().unwrap();
    conn.execute_batch(SCHEMA).unwrap();
    conn
      .execute_batch(&log_table_ddl("issues_log_x", &["component"]))
      .unwrap();
    // Running it again is a no-op.
    conn
      .execute_batch(&log_table_ddl("issues_log_x", &["component"]))
      .unwrap();
  }
}
