//! Shared domain types for session discovery, lineage, and derivation.
//!
//! This crate holds schemas only, no I/O or business logic. Everything here
//! is `Serialize`/`Deserialize` so it round-trips through the SQLite index and
//! the `trim_metadata`/`continue_metadata` blocks embedded in session files.

mod agent;
mod analysis;
mod derivation;
mod export;
mod helper;
mod search;
mod session;
mod util;

pub use agent::Agent;
pub use analysis::{TrimPlan, Verdict};
pub use derivation::{ContinueMetadata, Derivation, TrimMetadata, TrimParams};
pub use export::{FrontMatter, TrimStats};
pub use helper::{HELPER_MARKER_KEY, HELPER_MAX_MESSAGE_EVENTS};
pub use search::{SearchDocument, SearchHit};
pub use session::{SessionFilter, SessionOrder, SessionRecord};
pub use util::{is_64_char_hex, truncate};
