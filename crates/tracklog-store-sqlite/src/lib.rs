//! SQLite backend for tracklog.
//!
//! Implements the canonical-schema upsert engine ([`SqliteStore`]), the
//! persisting issue-log replay ([`IssueLogger`]) and the bundled per-tracker
//! log backends. Wraps [`tokio_rusqlite`] so every operation runs as one
//! synchronous closure on a dedicated connection thread.

mod encode;
mod replay;
mod schema;
mod store;
mod upsert;

pub mod backends;
pub mod error;

pub use error::{Error, Result};
pub use replay::{IssueLogger, LogReport};
pub use schema::log_table_ddl;
pub use store::SqliteStore;
