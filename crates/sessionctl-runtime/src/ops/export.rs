//! Export pipeline orchestration: resolves a target set of sessions and
//! writes each one through `sessionctl_engine::export_session`, tracking
//! skip/failure counts the way a CLI summary line wants them.

use crate::context::RuntimeContext;
use anyhow::Result;
use sessionctl_engine::{export_session, ExportOptions};
use sessionctl_types::SessionRecord;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct ExportSummary {
    pub exported: usize,
    pub skipped: usize,
    pub failed: usize,
}

pub fn export_one(ctx: &RuntimeContext, record: &SessionRecord, force: bool) -> Result<bool> {
    let cwd = record.cwd.as_deref().map(Path::new).unwrap_or(&ctx.store.cwd);
    let options = ExportOptions { output_dir: RuntimeContext::export_dir_for(cwd, record.agent), force };
    let outcome = export_session(record, &options)?;
    Ok(!outcome.skipped)
}

pub fn export_many(ctx: &RuntimeContext, records: &[SessionRecord], force: bool) -> ExportSummary {
    let mut summary = ExportSummary::default();
    for record in records {
        match export_one(ctx, record, force) {
            Ok(true) => summary.exported += 1,
            Ok(false) => summary.skipped += 1,
            Err(err) => {
                tracing::warn!(session_id = %record.session_id, error = %err, "export failed");
                summary.failed += 1;
            }
        }
    }
    summary
}
