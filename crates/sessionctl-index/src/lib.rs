//! Full-text search index: a SQLite FTS5-backed document store with
//! recency-adjusted ranking. This crate owns the database file and the
//! incrementality sidecar only; the documents it stores are handed in by
//! `sessionctl-runtime`, which is the one place that knows how to turn a
//! session or an export file into a `SearchDocument`.

pub mod db;
pub mod error;
pub mod ranking;
pub mod schema;
pub mod snippet;
pub mod state;

pub use db::{IndexDb, QueryParams};
pub use error::{Error, Result};
pub use ranking::{recency_adjusted_score, DEFAULT_HALF_LIFE_DAYS};
pub use schema::SCHEMA_VERSION;
pub use snippet::build_snippet;
pub use state::IndexState;
