//! Per-agent on-disk dialect adapters: discovery, header extraction, and
//! textual-content extraction for the two JSONL log formats.
//!
//! Dialect-specific parsing never leaks past this crate; everything above
//! consumes `SessionHeader` (identity fields) or the `Agent` enum from
//! `sessionctl-types`.

pub mod error;
pub mod traits;

pub mod claude;
pub mod codex;

pub mod extract;

pub use error::{Error, Result};
pub use traits::{LogDiscovery, SessionHeader, discovery_for};

pub use claude::{ClaudeDiscovery, extract_claude_header, is_empty_claude_session};
pub use codex::{CodexDiscovery, extract_codex_header, is_empty_codex_session};

pub use extract::{
    Classified, EventKind, TextField, ToolNameTracker, classify_line, extract_texts, rewrite_session_id,
    session_id_pointers,
};
