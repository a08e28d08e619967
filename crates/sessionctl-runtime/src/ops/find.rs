//! Resolving "which session" from what the CLI was given: an explicit
//! identifier/path, or nothing at all (meaning "the most recent session in
//! the current project").

use crate::context::RuntimeContext;
use anyhow::{anyhow, Context, Result};
use sessionctl_engine as engine;
use sessionctl_types::{Agent, SessionFilter, SessionRecord};

/// `None` means "pick the latest session for the current working
/// directory", tried against Claude Code's project-scoped store first
/// (it actually tracks cwd), then falling back to the most recent Codex
/// session globally (Codex's on-disk layout has no per-project grouping).
pub fn resolve_ref(ctx: &RuntimeContext, reference: Option<&str>) -> Result<SessionRecord> {
    match reference {
        Some(query) => engine::resolve(query, &ctx.store).context("resolving session reference"),
        None => latest_in_scope(ctx),
    }
}

fn latest_in_scope(ctx: &RuntimeContext) -> Result<SessionRecord> {
    let claude_filter = SessionFilter { agent: Some(Agent::ClaudeCode), cwd: Some(ctx.store.cwd.clone()), ..Default::default() };
    let mut claude_matches = engine::discover(&ctx.store, &claude_filter)?;
    if let Some(record) = claude_matches.drain(..).next() {
        return Ok(record);
    }

    let codex_filter = SessionFilter { agent: Some(Agent::Codex), ..Default::default() };
    let mut codex_matches = engine::discover(&ctx.store, &codex_filter)?;
    codex_matches
        .drain(..)
        .next()
        .ok_or_else(|| anyhow!("no sessions found for the current project"))
}

pub fn find_sessions(ctx: &RuntimeContext, filter: &SessionFilter) -> Result<Vec<SessionRecord>> {
    Ok(engine::discover(&ctx.store, filter)?)
}
