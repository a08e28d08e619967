//! Derivation engine, lineage graph, store adapter, and export formatting
//! (spec §4.1–§4.3, §4.6). `sessionctl-runtime` is the only caller outside
//! tests; this crate does no process orchestration and never talks to an
//! agent CLI binary.

pub mod clone;
pub mod error;
pub mod export;
pub mod identity;
pub mod lineage;
pub mod naming;
pub mod placeholders;
pub mod repair;
pub mod smart_trim;
pub mod store;
pub mod trim;

pub use error::{Error, Result};

pub use clone::clone_session;
pub use export::{export_session, render_body, ExportOptions, ExportOutcome};
pub use lineage::{ancestors, continuation_lineage, descendants, full_chain, original_of, ChainNode};
pub use repair::{repair_session, RepairReport};
pub use smart_trim::{smart_trim_session, SmartTrimOptions, SmartTrimOutcome, SmartTrimResult};
pub use store::{classify, detect_agent, discover, is_helper_session, resolve, StoreContext};
pub use trim::{trim_session, TrimOptions, TrimOutcome};
