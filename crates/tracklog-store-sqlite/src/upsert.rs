//! Synchronous upsert primitives, run on the connection thread.
//!
//! Get-or-create on trackers, people and relationships is a single
//! `INSERT … ON CONFLICT` followed by a read-back on the same connection, so
//! a conflicting insert never surfaces as an error. Issue ingestion runs in
//! one transaction; any failure drops the transaction and rolls back every
//! row the call inserted.

use std::collections::HashMap;

use rusqlite::{Connection, OptionalExtension as _, params};
use tracklog_core::model::{
  Issue, NewIssue, NewPerson, Person, Relationship, Tracker,
};

use crate::{
  Error, Result,
  encode::{
    ISSUE_COLUMNS, PERSON_COLUMNS, RELATIONSHIP_COLUMNS, RawIssue, RawTracker,
    TRACKER_COLUMNS, encode_dt, person_from_row, relationship_from_row,
  },
};

// ─── Trackers ────────────────────────────────────────────────────────────────

pub fn upsert_tracker(
  conn: &Connection,
  url: &str,
  kind: &str,
  retrieved_on: &str,
) -> Result<Tracker> {
  let raw = conn.query_row(
    &format!(
      "INSERT INTO trackers (url, type, retrieved_on) VALUES (?1, ?2, ?3)
       ON CONFLICT (url) DO UPDATE SET retrieved_on = excluded.retrieved_on
       RETURNING {TRACKER_COLUMNS}"
    ),
    params![url, kind, retrieved_on],
    RawTracker::from_row,
  )?;
  raw.into_tracker()
}

// ─── People ──────────────────────────────────────────────────────────────────

pub fn upsert_person(
  conn: &Connection,
  tracker_id: i64,
  person: &NewPerson,
) -> Result<Person> {
  conn.execute(
    "INSERT INTO people (user_id, tracker_id, name, email)
     VALUES (?1, ?2, ?3, ?4)
     ON CONFLICT (user_id, tracker_id) DO NOTHING",
    params![person.user_id, tracker_id, person.name, person.email],
  )?;

  conn
    .query_row(
      &format!(
        "SELECT {PERSON_COLUMNS} FROM people
         WHERE user_id = ?1 AND tracker_id = ?2"
      ),
      params![person.user_id, tracker_id],
      person_from_row,
    )
    .optional()?
    .ok_or_else(|| {
      Error::NotFound(format!(
        "person {:?} on tracker {tracker_id}",
        person.user_id
      ))
    })
}

/// [`upsert_person`] in its own transaction.
pub fn insert_person(
  conn: &mut Connection,
  tracker_id: i64,
  person: &NewPerson,
) -> Result<Person> {
  let tx = conn.transaction()?;
  let person = upsert_person(&tx, tracker_id, person)?;
  tx.commit()?;
  Ok(person)
}

/// Resolves actors of one issue graph, upserting each person at most once.
struct People<'c> {
  conn:       &'c Connection,
  tracker_id: i64,
  seen:       HashMap<String, i64>,
}

impl<'c> People<'c> {
  fn new(conn: &'c Connection, tracker_id: i64) -> Self {
    Self { conn, tracker_id, seen: HashMap::new() }
  }

  fn resolve(&mut self, person: &NewPerson) -> Result<i64> {
    if let Some(id) = self.seen.get(&person.user_id) {
      return Ok(*id);
    }
    let id = upsert_person(self.conn, self.tracker_id, person)?.id;
    self.seen.insert(person.user_id.clone(), id);
    Ok(id)
  }
}

// ─── Issues ──────────────────────────────────────────────────────────────────

/// Row counts of one `insert_issue` call, for logging.
#[derive(Debug, Default)]
pub struct IssueCounts {
  pub comments:    usize,
  pub attachments: usize,
  pub changes:     usize,
  pub skipped:     usize,
}

/// Insert or refresh `input` and its dependents in one transaction.
///
/// Dependents identical to a row stored for the issue before this call are
/// skipped, which makes re-ingesting the same graph a no-op apart from
/// refreshing the issue's mutable columns. A stored row whose actor was
/// deleted matches any actor.
pub fn insert_issue(
  conn: &mut Connection,
  tracker_id: i64,
  input: &NewIssue,
) -> Result<(Issue, IssueCounts)> {
  let tx = conn.transaction()?;
  let mut people = People::new(&tx, tracker_id);
  let mut counts = IssueCounts::default();

  let submitted_by = people.resolve(&input.submitted_by)?;
  let assigned_to = input
    .assigned_to
    .as_ref()
    .map(|p| people.resolve(p))
    .transpose()?;

  let raw = tx.query_row(
    &format!(
      "INSERT INTO issues (
         issue, tracker_id, type, summary, description, status,
         resolution, priority, submitted_by, submitted_on, assigned_to
       ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
       ON CONFLICT (issue, tracker_id) DO UPDATE SET
         type        = excluded.type,
         summary     = excluded.summary,
         description = excluded.description,
         status      = excluded.status,
         resolution  = excluded.resolution,
         priority    = excluded.priority,
         assigned_to = excluded.assigned_to
       RETURNING {ISSUE_COLUMNS}"
    ),
    params![
      input.issue,
      tracker_id,
      input.kind,
      input.summary,
      input.description,
      input.status,
      input.resolution,
      input.priority,
      submitted_by,
      encode_dt(input.submitted_on),
      assigned_to,
    ],
    RawIssue::from_row,
  )?;
  let issue = raw.into_issue()?;

  // Dependents are only matched against rows stored before this call, so
  // identical entries within one graph are all kept.
  let stored = StoredIds::read(&tx, issue.id)?;

  for comment in &input.comments {
    let actor = people.resolve(&comment.submitted_by)?;
    let inserted = tx.execute(
      "INSERT INTO comments (issue_id, text, submitted_by, submitted_on)
       SELECT ?1, ?2, ?3, ?4
       WHERE NOT EXISTS (
         SELECT 1 FROM comments
         WHERE issue_id = ?1 AND id <= ?5 AND text = ?2
           AND (submitted_by = ?3 OR submitted_by IS NULL)
           AND submitted_on = ?4
       )",
      params![
        issue.id,
        comment.text,
        actor,
        encode_dt(comment.submitted_on),
        stored.comments,
      ],
    )?;
    tally(&mut counts.comments, &mut counts.skipped, inserted);
  }

  for attachment in &input.attachments {
    let actor = people.resolve(&attachment.submitted_by)?;
    let inserted = tx.execute(
      "INSERT INTO attachments (
         issue_id, name, description, url, submitted_by, submitted_on
       )
       SELECT ?1, ?2, ?3, ?4, ?5, ?6
       WHERE NOT EXISTS (
         SELECT 1 FROM attachments
         WHERE issue_id = ?1 AND id <= ?7 AND name = ?2
           AND description IS ?3 AND url = ?4
           AND (submitted_by = ?5 OR submitted_by IS NULL)
           AND submitted_on = ?6
       )",
      params![
        issue.id,
        attachment.name,
        attachment.description,
        attachment.url,
        actor,
        encode_dt(attachment.submitted_on),
        stored.attachments,
      ],
    )?;
    tally(&mut counts.attachments, &mut counts.skipped, inserted);
  }

  for change in &input.changes {
    let actor = people.resolve(&change.changed_by)?;
    let inserted = tx.execute(
      "INSERT INTO changes (
         issue_id, field, old_value, new_value, changed_by, changed_on
       )
       SELECT ?1, ?2, ?3, ?4, ?5, ?6
       WHERE NOT EXISTS (
         SELECT 1 FROM changes
         WHERE issue_id = ?1 AND id <= ?7 AND field = ?2
           AND old_value IS ?3 AND new_value IS ?4
           AND (changed_by = ?5 OR changed_by IS NULL)
           AND changed_on = ?6
       )",
      params![
        issue.id,
        change.field,
        change.old_value,
        change.new_value,
        actor,
        encode_dt(change.changed_on),
        stored.changes,
      ],
    )?;
    tally(&mut counts.changes, &mut counts.skipped, inserted);
  }

  drop(people);
  tx.commit()?;
  Ok((issue, counts))
}

/// Highest dependent row ids of one issue, 0 if it has none.
struct StoredIds {
  comments:    i64,
  attachments: i64,
  changes:     i64,
}

impl StoredIds {
  fn read(conn: &Connection, issue_id: i64) -> Result<Self> {
    let max = |table: &str| -> Result<i64> {
      Ok(conn.query_row(
        &format!("SELECT COALESCE(MAX(id), 0) FROM {table} WHERE issue_id = ?1"),
        params![issue_id],
        |r| r.get(0),
      )?)
    };
    Ok(Self {
      comments:    max("comments")?,
      attachments: max("attachments")?,
      changes:     max("changes")?,
    })
  }
}

fn tally(inserted: &mut usize, skipped: &mut usize, affected: usize) {
  if affected == 0 {
    *skipped += 1;
  } else {
    *inserted += affected;
  }
}

// ─── Relationships ───────────────────────────────────────────────────────────

pub fn upsert_relationship(
  conn: &Connection,
  issue_id: i64,
  related_to: i64,
  kind: &str,
) -> Result<Relationship> {
  conn.execute(
    "INSERT INTO related_to (issue_id, related_to, type) VALUES (?1, ?2, ?3)
     ON CONFLICT (issue_id, related_to) DO NOTHING",
    params![issue_id, related_to, kind],
  )?;

  conn
    .query_row(
      &format!(
        "SELECT {RELATIONSHIP_COLUMNS} FROM related_to
         WHERE issue_id = ?1 AND related_to = ?2"
      ),
      params![issue_id, related_to],
      relationship_from_row,
    )
    .optional()?
    .ok_or_else(|| {
      Error::NotFound(format!("relationship {issue_id} -> {related_to}"))
    })
}
