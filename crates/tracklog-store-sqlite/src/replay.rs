//! [`IssueLogger`] runs the issue-log replay for one tracker and persists
//! the snapshots into the backend's log table.

use std::sync::Arc;

use rusqlite::{Connection, params, params_from_iter, types::Value};
use tracklog_core::{
  backend::{LogBackend, LogRow},
  model::Tracker,
  replay::replay_issue,
  snapshot::IssueSnapshot,
};

use crate::{
  Error, Result, SqliteStore,
  encode::{
    CHANGE_COLUMNS, ISSUE_COLUMNS, RawChange, RawIssue, decode_dt, encode_dt,
  },
  schema::LOG_COLUMNS,
};

/// Outcome of one [`IssueLogger::generate_log`] run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogReport {
  /// The log table that was populated.
  pub table:  String,
  pub issues: usize,
  pub rows:   usize,
}

/// Replays the change history of every issue of one tracker through one
/// [`LogBackend`].
pub struct IssueLogger<'s> {
  store:   &'s SqliteStore,
  backend: Arc<dyn LogBackend>,
  tracker: Tracker,
}

impl<'s> IssueLogger<'s> {
  pub fn new(
    store: &'s SqliteStore,
    backend: Arc<dyn LogBackend>,
    tracker: Tracker,
  ) -> Self {
    Self { store, backend, tracker }
  }

  pub fn table_name(&self) -> &'static str { self.backend.table_name() }

  /// Create the backend's log table if it does not exist yet.
  pub async fn create_table(&self) -> Result<()> {
    let ddl = self.backend.schema_ddl();
    self
      .store
      .conn
      .call(move |conn| {
        conn.execute_batch(&ddl)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  pub async fn drop_table(&self) -> Result<()> {
    let ddl = self.backend.drop_ddl();
    self
      .store
      .conn
      .call(move |conn| {
        conn.execute_batch(&ddl)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Replay every issue of the tracker and append one log row per
  /// recognised change, all in one transaction.
  ///
  /// The log is not incremental: rows for changes that were already logged
  /// make the run fail with [`Error::ConstraintViolation`], leaving the
  /// table untouched. Call [`truncate_log`](Self::truncate_log) first to
  /// rebuild it.
  pub async fn generate_log(&self) -> Result<LogReport> {
    if self.tracker.kind != self.backend.name() {
      return Err(Error::BackendMismatch {
        tracker: self.tracker.url.clone(),
        kind:    self.tracker.kind.clone(),
        backend: self.backend.name().to_owned(),
      });
    }

    self.create_table().await?;

    let backend    = Arc::clone(&self.backend);
    let tracker_id = self.tracker.id;

    let report = self
      .store
      .conn
      .call(move |conn| Ok(replay_tracker(conn, backend.as_ref(), tracker_id)))
      .await??;

    tracing::info!(
      tracker = %self.tracker.url,
      table = %report.table,
      issues = report.issues,
      rows = report.rows,
      "issue log generated"
    );
    Ok(report)
  }

  /// Delete this tracker's rows from the log table. Returns the number of
  /// rows removed.
  pub async fn truncate_log(&self) -> Result<usize> {
    self.create_table().await?;

    let table      = self.backend.table_name();
    let tracker_id = self.tracker.id;

    let removed = self
      .store
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          &format!("DELETE FROM {table} WHERE tracker_id = ?1"),
          params![tracker_id],
        )?)
      })
      .await?;

    tracing::info!(tracker = %self.tracker.url, table, removed, "issue log truncated");
    Ok(removed)
  }

  /// The log rows of one issue, in the order they were written.
  pub async fn read_log(&self, issue_id: i64) -> Result<Vec<LogRow>> {
    let table  = self.backend.table_name();
    let custom = self.backend.custom_columns();
    let sql    = format!(
      "SELECT {} FROM {table} WHERE issue_id = ?1 ORDER BY id",
      select_list(custom)
    );

    let raws: Vec<Vec<Value>> = self
      .store
      .conn
      .call(move |conn| {
        let width = LOG_COLUMNS.len() + custom.len();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(params![issue_id], |row| {
            (0..width)
              .map(|i| row.get::<_, Value>(i))
              .collect::<rusqlite::Result<Vec<Value>>>()
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(|values| decode_log_row(values, custom))
      .collect()
  }
}

// ─── Connection-thread work ──────────────────────────────────────────────────

fn replay_tracker(
  conn: &mut Connection,
  backend: &dyn LogBackend,
  tracker_id: i64,
) -> Result<LogReport> {
  let tx = conn.transaction()?;

  let issues = {
    let mut stmt = tx.prepare(&format!(
      "SELECT {columns}, a.user_id
       FROM issues i
       LEFT JOIN people a ON a.id = i.assigned_to
       WHERE i.tracker_id = ?1
       ORDER BY i.id",
      columns = qualified_issue_columns()
    ))?;
    stmt
      .query_map(params![tracker_id], |row| {
        Ok((RawIssue::from_row(row)?, row.get::<_, Option<String>>(12)?))
      })?
      .collect::<rusqlite::Result<Vec<_>>>()?
  };

  let insert_sql = insert_statement(backend);
  let mut report = LogReport {
    table:  backend.table_name().to_owned(),
    issues: 0,
    rows:   0,
  };

  for (raw, assignee) in issues {
    let issue = raw.into_issue()?;

    let changes = {
      let mut stmt = tx.prepare_cached(&format!(
        "SELECT {CHANGE_COLUMNS} FROM changes
         WHERE issue_id = ?1 ORDER BY changed_on, id"
      ))?;
      stmt
        .query_map(params![issue.id], RawChange::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?
        .into_iter()
        .map(RawChange::into_change)
        .collect::<Result<Vec<_>>>()?
    };

    let baseline = IssueSnapshot::from_issue(&issue, assignee)
      .with_custom_columns(backend.custom_columns());
    let rows = replay_issue(backend, &issue, baseline, &changes);

    let mut stmt = tx.prepare_cached(&insert_sql)?;
    for row in &rows {
      stmt.execute(params_from_iter(encode_log_row(row, backend.custom_columns())))?;
    }

    tracing::debug!(issue = %issue.issue, changes = changes.len(), rows = rows.len(), "issue replayed");
    report.issues += 1;
    report.rows += rows.len();
  }

  tx.commit()?;
  Ok(report)
}

// ─── Row encoding ────────────────────────────────────────────────────────────

fn qualified_issue_columns() -> String {
  ISSUE_COLUMNS
    .split(',')
    .map(|c| format!("i.{}", c.trim()))
    .collect::<Vec<_>>()
    .join(", ")
}

fn select_list(custom: &[&str]) -> String {
  LOG_COLUMNS
    .iter()
    .map(|c| (*c).to_owned())
    .chain(custom.iter().map(|c| format!("\"{c}\"")))
    .collect::<Vec<_>>()
    .join(", ")
}

fn insert_statement(backend: &dyn LogBackend) -> String {
  let custom = backend.custom_columns();
  let placeholders = (1..=LOG_COLUMNS.len() + custom.len())
    .map(|i| format!("?{i}"))
    .collect::<Vec<_>>()
    .join(", ");
  format!(
    "INSERT INTO {} ({}) VALUES ({placeholders})",
    backend.table_name(),
    select_list(custom)
  )
}

fn text(value: &Option<String>) -> Value {
  value.clone().map_or(Value::Null, Value::Text)
}

fn integer(value: Option<i64>) -> Value {
  value.map_or(Value::Null, Value::Integer)
}

/// Values in [`LOG_COLUMNS`] order, then the custom columns.
fn encode_log_row(row: &LogRow, custom: &[&str]) -> Vec<Value> {
  let snap = &row.snapshot;
  let mut values = vec![
    Value::Integer(row.change_id),
    Value::Integer(row.tracker_id),
    Value::Integer(row.issue_id),
    Value::Text(row.issue.clone()),
    text(&snap.kind),
    text(&snap.summary),
    text(&snap.description),
    text(&snap.status),
    text(&snap.resolution),
    text(&snap.priority),
    text(&snap.assigned_to),
    integer(row.submitted_by),
    Value::Text(encode_dt(row.submitted_on)),
    integer(row.changed_by),
    Value::Text(encode_dt(row.date)),
  ];
  values.extend(
    custom
      .iter()
      .map(|c| text(snap.custom.get(*c).unwrap_or(&None))),
  );
  values
}

fn decode_log_row(values: Vec<Value>, custom: &[&str]) -> Result<LogRow> {
  let mut it = values.into_iter();
  let mut next = || it.next().unwrap_or(Value::Null);

  let change_id    = as_integer(next())?;
  let tracker_id   = as_integer(next())?;
  let issue_id     = as_integer(next())?;
  let issue        = as_text(next()).unwrap_or_default();
  let kind         = as_text(next());
  let summary      = as_text(next());
  let description  = as_text(next());
  let status       = as_text(next());
  let resolution   = as_text(next());
  let priority     = as_text(next());
  let assigned_to  = as_text(next());
  let submitted_by = as_opt_integer(next());
  let submitted_on = decode_dt(&as_text(next()).unwrap_or_default())?;
  let changed_by   = as_opt_integer(next());
  let date         = decode_dt(&as_text(next()).unwrap_or_default())?;

  let custom = custom
    .iter()
    .map(|c| ((*c).to_owned(), as_text(next())))
    .collect();

  Ok(LogRow {
    change_id,
    tracker_id,
    issue_id,
    issue,
    submitted_by,
    submitted_on,
    changed_by,
    date,
    snapshot: IssueSnapshot {
      kind,
      summary,
      description,
      status,
      resolution,
      priority,
      assigned_to,
      custom,
    },
  })
}

fn as_text(value: Value) -> Option<String> {
  match value {
    Value::Text(s) => Some(s),
    _ => None,
  }
}

fn as_opt_integer(value: Value) -> Option<i64> {
  match value {
    Value::Integer(i) => Some(i),
    _ => None,
  }
}

fn as_integer(value: Value) -> Result<i64> {
  as_opt_integer(value)
    .ok_or_else(|| Error::MalformedRow("expected an integer id".to_owned()))
}
