//! Core types and trait definitions for tracklog.
//!
//! Holds the canonical issue-tracker entity model, the ingestion input graph,
//! the issue-log replay fold and the backend capability trait. No database or
//! network dependencies live here.

// Native `async fn` in traits; the store trait spells out `Send` futures.
#![allow(async_fn_in_trait)]

pub mod backend;
pub mod error;
pub mod model;
pub mod registry;
pub mod replay;
pub mod snapshot;
pub mod store;

pub use error::{Error, Result};
