//! Explicit session deletion, and the best-effort cleanup a helper session
//! gets after it has served its purpose (spec §4.8).

use anyhow::{Context, Result};
use sessionctl_types::SessionRecord;
use std::path::Path;

pub fn delete_session(record: &SessionRecord) -> Result<()> {
    std::fs::remove_file(&record.file_path).with_context(|| format!("deleting session file {}", record.file_path.display()))
}

/// The marker that keeps a helper session out of listings and the index
/// already makes it invisible even if this delete never runs, so failures
/// here are logged rather than propagated.
pub fn try_delete_helper_session(path: &Path) {
    if let Err(err) = std::fs::remove_file(path) {
        tracing::debug!(path = %path.display(), error = %err, "best-effort helper session delete failed");
    }
}
