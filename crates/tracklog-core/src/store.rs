//! The `TrackerStore` trait: the upsert contract of the canonical schema.
//!
//! Implemented by storage backends (e.g. `tracklog-store-sqlite`). Fetchers
//! and the orchestrator depend on this abstraction only.

use std::future::Future;

use crate::model::{
  Attachment, Change, Comment, Issue, NewIssue, NewPerson, Person,
  Relationship, Tracker,
};

/// Abstraction over a canonical tracker store.
///
/// Trackers, people and issues are get-or-create on their natural keys, so
/// ingesting the same data twice converges on the same rows. Comments,
/// attachments and changes are write-once.
pub trait TrackerStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Upserts ───────────────────────────────────────────────────────────

  /// Get or create the tracker at `url`, refreshing `retrieved_on`.
  fn insert_tracker<'a>(
    &'a self,
    url: &'a str,
    kind: &'a str,
  ) -> impl Future<Output = Result<Tracker, Self::Error>> + Send + 'a;

  /// Get or create a person on `(user_id, tracker_id)`. An existing row is
  /// returned unmodified.
  fn insert_person(
    &self,
    tracker_id: i64,
    person: NewPerson,
  ) -> impl Future<Output = Result<Person, Self::Error>> + Send + '_;

  /// Insert or refresh an issue together with its comments, attachments and
  /// changes, all in one transaction.
  ///
  /// On error nothing attempted by the call is left in the store.
  fn insert_issue(
    &self,
    tracker_id: i64,
    issue: NewIssue,
  ) -> impl Future<Output = Result<Issue, Self::Error>> + Send + '_;

  /// Get or create the edge `issue_id → related_to`.
  fn insert_relationship<'a>(
    &'a self,
    issue_id: i64,
    related_to: i64,
    kind: &'a str,
  ) -> impl Future<Output = Result<Relationship, Self::Error>> + Send + 'a;

  // ── Reads ─────────────────────────────────────────────────────────────

  fn get_tracker<'a>(
    &'a self,
    url: &'a str,
  ) -> impl Future<Output = Result<Option<Tracker>, Self::Error>> + Send + 'a;

  /// Look an issue up by its natural key.
  fn get_issue<'a>(
    &'a self,
    tracker_id: i64,
    issue: &'a str,
  ) -> impl Future<Output = Result<Option<Issue>, Self::Error>> + Send + 'a;

  fn list_issues(
    &self,
    tracker_id: i64,
  ) -> impl Future<Output = Result<Vec<Issue>, Self::Error>> + Send + '_;

  fn list_people(
    &self,
    tracker_id: i64,
  ) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + '_;

  fn list_comments(
    &self,
    issue_id: i64,
  ) -> impl Future<Output = Result<Vec<Comment>, Self::Error>> + Send + '_;

  fn list_attachments(
    &self,
    issue_id: i64,
  ) -> impl Future<Output = Result<Vec<Attachment>, Self::Error>> + Send + '_;

  /// Changes of an issue in replay order: `changed_on`, then `id`.
  fn list_changes(
    &self,
    issue_id: i64,
  ) -> impl Future<Output = Result<Vec<Change>, Self::Error>> + Send + '_;

  /// Outgoing edges of an issue.
  fn list_relationships(
    &self,
    issue_id: i64,
  ) -> impl Future<Output = Result<Vec<Relationship>, Self::Error>> + Send + '_;

  // ── Deletes ───────────────────────────────────────────────────────────

  /// Delete a tracker and, transitively, everything ingested from it.
  fn delete_tracker(
    &self,
    tracker_id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Delete a person. References to them are nulled, history is kept.
  fn delete_person(
    &self,
    person_id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
