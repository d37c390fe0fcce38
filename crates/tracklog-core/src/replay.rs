//! The backend-agnostic issue-log fold.
//!
//! Given an issue, a baseline snapshot and the issue's change ledger, produce
//! one log row per change whose field the backend recognises. Later changes
//! always overwrite earlier ones.

use crate::{
  backend::{LogBackend, LogRow},
  model::{Change, Issue},
  snapshot::IssueSnapshot,
};

/// Order changes the way they are replayed: by `changed_on`, ties broken by
/// insertion order (`id`).
pub fn sort_changes(changes: &mut [Change]) {
  changes.sort_by(|a, b| {
    a.changed_on.cmp(&b.changed_on).then_with(|| a.id.cmp(&b.id))
  });
}

/// Replay `changes` over `baseline` and return the resulting log rows in
/// application order.
pub fn replay_issue(
  backend: &dyn LogBackend,
  issue: &Issue,
  baseline: IssueSnapshot,
  changes: &[Change],
) -> Vec<LogRow> {
  let mut ordered = changes.to_vec();
  sort_changes(&mut ordered);

  let mut current = baseline;
  let mut rows = Vec::new();
  for change in &ordered {
    let Some(field) = backend.translate_field(&change.field) else {
      continue;
    };
    current = current.apply(&field, change.new_value.as_deref());
    rows.push(backend.build_log_row(issue, change, current.clone()));
  }
  rows
}
