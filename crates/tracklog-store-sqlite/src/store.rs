//! [`SqliteStore`]: the SQLite implementation of [`TrackerStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::{OptionalExtension as _, params};

use tracklog_core::{
  model::{
    Attachment, Change, Comment, Issue, NewIssue, NewPerson, Person,
    Relationship, Tracker,
  },
  store::TrackerStore,
};

use crate::{
  Error, Result,
  encode::{
    ATTACHMENT_COLUMNS, CHANGE_COLUMNS, COMMENT_COLUMNS, ISSUE_COLUMNS,
    PERSON_COLUMNS, RELATIONSHIP_COLUMNS, RawAttachment, RawChange,
    RawComment, RawIssue, RawTracker, TRACKER_COLUMNS, encode_dt,
    person_from_row, relationship_from_row,
  },
  schema::SCHEMA,
  upsert,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A canonical tracker store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Number of rows in `table`. Only used to inspect the store in tests and
  /// diagnostics, so `table` must be a trusted identifier.
  pub async fn count_rows(&self, table: &'static str) -> Result<i64> {
    Ok(
      self
        .conn
        .call(move |conn| {
          Ok(conn.query_row(
            &format!("SELECT COUNT(*) FROM {table}"),
            [],
            |r| r.get(0),
          )?)
        })
        .await?,
    )
  }
}

// ─── TrackerStore impl ───────────────────────────────────────────────────────

impl TrackerStore for SqliteStore {
  type Error = Error;

  // ── Upserts ───────────────────────────────────────────────────────────────

  async fn insert_tracker(&self, url: &str, kind: &str) -> Result<Tracker> {
    let url_str      = url.to_owned();
    let kind_str     = kind.to_owned();
    let retrieved_on = encode_dt(Utc::now());

    let tracker = self
      .conn
      .call(move |conn| {
        Ok(upsert::upsert_tracker(conn, &url_str, &kind_str, &retrieved_on))
      })
      .await??;

    tracing::debug!(id = tracker.id, url = %tracker.url, "tracker upserted");
    Ok(tracker)
  }

  async fn insert_person(
    &self,
    tracker_id: i64,
    person: NewPerson,
  ) -> Result<Person> {
    self
      .conn
      .call(move |conn| Ok(upsert::insert_person(conn, tracker_id, &person)))
      .await?
  }

  async fn insert_issue(&self, tracker_id: i64, issue: NewIssue) -> Result<Issue> {
    let external = issue.issue.clone();

    let result = self
      .conn
      .call(move |conn| Ok(upsert::insert_issue(conn, tracker_id, &issue)))
      .await?;

    match result {
      Ok((issue, counts)) => {
        tracing::debug!(
          tracker_id,
          issue = %issue.issue,
          comments = counts.comments,
          attachments = counts.attachments,
          changes = counts.changes,
          skipped = counts.skipped,
          "issue upserted"
        );
        Ok(issue)
      }
      Err(err) => {
        tracing::warn!(tracker_id, issue = %external, "issue rolled back: {err}");
        Err(err)
      }
    }
  }

  async fn insert_relationship(
    &self,
    issue_id: i64,
    related_to: i64,
    kind: &str,
  ) -> Result<Relationship> {
    let kind_str = kind.to_owned();
    self
      .conn
      .call(move |conn| {
        Ok(upsert::upsert_relationship(conn, issue_id, related_to, &kind_str))
      })
      .await?
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn get_tracker(&self, url: &str) -> Result<Option<Tracker>> {
    let url_str = url.to_owned();

    let raw: Option<RawTracker> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {TRACKER_COLUMNS} FROM trackers WHERE url = ?1"),
              params![url_str],
              RawTracker::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawTracker::into_tracker).transpose()
  }

  async fn get_issue(&self, tracker_id: i64, issue: &str) -> Result<Option<Issue>> {
    let issue_str = issue.to_owned();

    let raw: Option<RawIssue> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {ISSUE_COLUMNS} FROM issues
                 WHERE tracker_id = ?1 AND issue = ?2"
              ),
              params![tracker_id, issue_str],
              RawIssue::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawIssue::into_issue).transpose()
  }

  async fn list_issues(&self, tracker_id: i64) -> Result<Vec<Issue>> {
    let raws: Vec<RawIssue> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {ISSUE_COLUMNS} FROM issues WHERE tracker_id = ?1 ORDER BY id"
        ))?;
        let rows = stmt
          .query_map(params![tracker_id], RawIssue::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawIssue::into_issue).collect()
  }

  async fn list_people(&self, tracker_id: i64) -> Result<Vec<Person>> {
    Ok(
      self
        .conn
        .call(move |conn| {
          let mut stmt = conn.prepare(&format!(
            "SELECT {PERSON_COLUMNS} FROM people WHERE tracker_id = ?1 ORDER BY id"
          ))?;
          let rows = stmt
            .query_map(params![tracker_id], person_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          Ok(rows)
        })
        .await?,
    )
  }

  async fn list_comments(&self, issue_id: i64) -> Result<Vec<Comment>> {
    let raws: Vec<RawComment> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {COMMENT_COLUMNS} FROM comments
           WHERE issue_id = ?1 ORDER BY submitted_on, id"
        ))?;
        let rows = stmt
          .query_map(params![issue_id], RawComment::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawComment::into_comment).collect()
  }

  async fn list_attachments(&self, issue_id: i64) -> Result<Vec<Attachment>> {
    let raws: Vec<RawAttachment> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {ATTACHMENT_COLUMNS} FROM attachments
           WHERE issue_id = ?1 ORDER BY submitted_on, id"
        ))?;
        let rows = stmt
          .query_map(params![issue_id], RawAttachment::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAttachment::into_attachment).collect()
  }

  async fn list_changes(&self, issue_id: i64) -> Result<Vec<Change>> {
    let raws: Vec<RawChange> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {CHANGE_COLUMNS} FROM changes
           WHERE issue_id = ?1 ORDER BY changed_on, id"
        ))?;
        let rows = stmt
          .query_map(params![issue_id], RawChange::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawChange::into_change).collect()
  }

  async fn list_relationships(&self, issue_id: i64) -> Result<Vec<Relationship>> {
    Ok(
      self
        .conn
        .call(move |conn| {
          let mut stmt = conn.prepare(&format!(
            "SELECT {RELATIONSHIP_COLUMNS} FROM related_to
             WHERE issue_id = ?1 ORDER BY id"
          ))?;
          let rows = stmt
            .query_map(params![issue_id], relationship_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          Ok(rows)
        })
        .await?,
    )
  }

  // ── Deletes ───────────────────────────────────────────────────────────────

  async fn delete_tracker(&self, tracker_id: i64) -> Result<()> {
    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM trackers WHERE id = ?1", params![tracker_id])?)
      })
      .await?;

    if deleted == 0 {
      return Err(Error::NotFound(format!("tracker {tracker_id}")));
    }
    tracing::info!(tracker_id, "tracker deleted");
    Ok(())
  }

  async fn delete_person(&self, person_id: i64) -> Result<()> {
    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM people WHERE id = ?1", params![person_id])?)
      })
      .await?;

    if deleted == 0 {
      return Err(Error::NotFound(format!("person {person_id}")));
    }
    Ok(())
  }
}
