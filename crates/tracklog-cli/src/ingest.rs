//! Loading a tracker dump into a [`TrackerStore`].
//!
//! A dump is one JSON document:
//!
//! ```json
//! { "tracker": { "url": "http://x/proj", "type": "trac" },
//!   "issues":  [ { "issue": "42", "summary": "...", ... } ] }
//! ```
//!
//! Issues are upserted one at a time, each in its own transaction. Relation
//! edges name their target by external id and are resolved once every issue
//! of the dump is stored.

use serde::Deserialize;
use tracklog_core::{
  model::{NewIssue, Tracker},
  store::TrackerStore,
};
use tracklog_parse::parse_json;

#[derive(Debug, Clone, Deserialize)]
pub struct Dump {
  pub tracker: DumpTracker,
  #[serde(default)]
  pub issues:  Vec<NewIssue>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DumpTracker {
  pub url:  String,
  #[serde(rename = "type")]
  pub kind: String,
}

/// Summary of one [`ingest`] run.
#[derive(Debug, Clone)]
pub struct IngestReport {
  pub tracker:       Tracker,
  pub issues:        usize,
  pub relationships: usize,
  /// Relation edges whose target issue is not in the store.
  pub dangling:      usize,
}

/// Parse and unmarshal a JSON dump.
pub fn read_dump(raw: impl AsRef<[u8]>) -> tracklog_parse::Result<Dump> {
  parse_json(raw)?.unmarshal()
}

/// Upsert the tracker, then every issue graph, then the relation edges.
///
/// Stops at the first store error; issues stored before it stay stored.
pub async fn ingest<S: TrackerStore>(
  store: &S,
  dump: Dump,
) -> Result<IngestReport, S::Error> {
  let tracker = store
    .insert_tracker(&dump.tracker.url, &dump.tracker.kind)
    .await?;

  let mut edges = Vec::new();
  let mut issues = 0;
  for mut input in dump.issues {
    let related = std::mem::take(&mut input.related);
    let issue = store.insert_issue(tracker.id, input).await?;
    edges.extend(related.into_iter().map(|r| (issue.id, r)));
    issues += 1;
  }

  let mut relationships = 0;
  let mut dangling = 0;
  for (issue_id, relation) in edges {
    match store.get_issue(tracker.id, &relation.related_to).await? {
      Some(target) => {
        store
          .insert_relationship(issue_id, target.id, &relation.kind)
          .await?;
        relationships += 1;
      }
      None => {
        tracing::warn!(
          issue_id,
          related_to = %relation.related_to,
          "related issue not in store, edge skipped"
        );
        dangling += 1;
      }
    }
  }

  tracing::info!(
    tracker = %tracker.url,
    issues,
    relationships,
    dangling,
    "dump ingested"
  );
  Ok(IngestReport { tracker, issues, relationships, dangling })
}
