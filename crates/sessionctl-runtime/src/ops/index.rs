//! Building and querying the search index. Two build modes: straight from
//! the session store (content comes from rendering each session's body on
//! the fly) and from already-exported text files (for when only the
//! export survives, e.g. after the original session was deleted). Both
//! are incremental, gated by the same `IndexState` fingerprint sidecar.

use crate::context::RuntimeContext;
use anyhow::Result;
use chrono::{DateTime, Utc};
use sessionctl_engine::{self as engine, render_body};
use sessionctl_index::{IndexDb, IndexState, QueryParams};
use sessionctl_types::{Agent, SearchDocument, SearchHit, SessionFilter};
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    pub indexed: usize,
    pub skipped: usize,
    pub removed: usize,
}

fn fingerprint(path: &Path) -> std::io::Result<(i64, u64)> {
    let metadata = std::fs::metadata(path)?;
    let mtime = metadata.modified()?.duration_since(std::time::UNIX_EPOCH).map(|d| d.as_secs() as i64).unwrap_or(0);
    Ok((mtime, metadata.len()))
}

/// Indexes every session the store currently discovers (subject to
/// `filter`), skipping any whose underlying file fingerprint is unchanged
/// since the last build, then drops index entries for sessions no longer
/// discoverable (deleted, or excluded by `filter` in a way that should
/// remove them — callers doing a full rebuild should pass a permissive
/// filter to avoid pruning sessions they simply didn't ask about).
pub fn build_from_raw(ctx: &RuntimeContext, filter: &SessionFilter, force: bool) -> Result<BuildReport> {
    let records = engine::discover(&ctx.store, filter)?;
    let mut db = IndexDb::open(&ctx.index_db_path())?;
    let mut state = IndexState::load(&ctx.index_state_path())?;
    let mut report = BuildReport::default();

    let mut seen_ids = std::collections::HashSet::new();
    for record in &records {
        seen_ids.insert(record.session_id.clone());
        let key = record.file_path.to_string_lossy().into_owned();
        let Ok((mtime, size)) = fingerprint(&record.file_path) else {
            continue;
        };
        if !force && !state.needs_reindex(&key, mtime, size) {
            report.skipped += 1;
            continue;
        }

        let content = render_body(record)?;
        let doc = SearchDocument {
            session_id: record.session_id.clone(),
            agent: record.agent.as_str().to_string(),
            project: record.cwd.as_deref().and_then(|c| Path::new(c).file_name()).and_then(|n| n.to_str()).map(str::to_string),
            branch: record.git_branch.clone(),
            cwd: record.cwd.clone(),
            created: Some(record.created_at),
            modified: record.modified_at,
            lines: record.line_count,
            export_path: String::new(),
            first_msg_role: record.first_user_message_preview.as_ref().map(|_| "user".to_string()),
            first_msg_content: record.first_user_message_preview.clone(),
            last_msg_role: record.last_user_message_preview.as_ref().map(|_| "user".to_string()),
            last_msg_content: record.last_user_message_preview.clone(),
            derivation_type: derivation_label(record),
            is_sidechain: record.is_sidechain,
            content,
        };
        db.upsert(&doc)?;
        state.record(&key, mtime, size);
        report.indexed += 1;
    }

    for existing_id in db.all_session_ids()? {
        if !seen_ids.contains(&existing_id) {
            db.remove(&existing_id)?;
            report.removed += 1;
        }
    }

    state.save_atomic(&ctx.index_state_path())?;
    Ok(report)
}

fn derivation_label(record: &sessionctl_types::SessionRecord) -> String {
    match &record.derivation {
        sessionctl_types::Derivation::Original => "original".to_string(),
        sessionctl_types::Derivation::Trimmed(_) => "trimmed".to_string(),
        sessionctl_types::Derivation::Continued(_) => "continued".to_string(),
    }
}

/// Indexes from export files directly, for deployments that keep exports
/// but prune raw sessions. Front matter gives us metadata; the body
/// becomes searchable `content`. First/last message fields are left
/// unset since an export file alone doesn't retain that breakdown.
pub fn build_from_exports(ctx: &RuntimeContext, export_root: &Path, force: bool) -> Result<BuildReport> {
    let mut db = IndexDb::open(&ctx.index_db_path())?;
    let mut state = IndexState::load(&ctx.index_state_path())?;
    let mut report = BuildReport::default();

    if !export_root.is_dir() {
        return Ok(report);
    }

    for entry in walkdir::WalkDir::new(export_root).into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("txt") {
            continue;
        }
        let key = path.to_string_lossy().into_owned();
        let Ok((mtime, size)) = fingerprint(path) else {
            continue;
        };
        if !force && !state.needs_reindex(&key, mtime, size) {
            report.skipped += 1;
            continue;
        }
        let Ok(raw) = std::fs::read_to_string(path) else {
            continue;
        };
        let Some(doc) = parse_export_document(&raw, &key) else {
            continue;
        };
        db.upsert(&doc)?;
        state.record(&key, mtime, size);
        report.indexed += 1;
    }

    state.save_atomic(&ctx.index_state_path())?;
    Ok(report)
}

fn parse_export_document(raw: &str, export_path: &str) -> Option<SearchDocument> {
    let mut lines = raw.lines();
    if lines.next()? != "---" {
        return None;
    }

    let mut session_id = None;
    let mut agent = None;
    let mut project = None;
    let mut branch = None;
    let mut cwd = None;
    let mut created = None;
    let mut modified = None;
    let mut line_count = 0usize;
    let mut derivation_type = "original".to_string();

    let mut consumed = 1;
    for line in lines.by_ref() {
        consumed += 1;
        if line == "---" {
            break;
        }
        let Some((key, value)) = line.split_once(": ") else { continue };
        match key {
            "session_id" => session_id = Some(value.to_string()),
            "agent" => agent = value.parse::<Agent>().ok(),
            "project" => project = Some(value.to_string()),
            "branch" => branch = Some(value.to_string()),
            "cwd" => cwd = Some(value.to_string()),
            "lines" => line_count = value.parse().unwrap_or(0),
            "created" => created = DateTime::parse_from_rfc3339(value).ok().map(|d| d.with_timezone(&Utc)),
            "modified" => modified = DateTime::parse_from_rfc3339(value).ok().map(|d| d.with_timezone(&Utc)),
            "derivation_type" => derivation_type = value.to_string(),
            _ => {}
        }
    }

    let body: String = raw.lines().skip(consumed).collect::<Vec<_>>().join("\n").trim().to_string();

    Some(SearchDocument {
        session_id: session_id?,
        agent: agent.unwrap_or(Agent::ClaudeCode).as_str().to_string(),
        project,
        branch,
        cwd,
        created,
        modified: modified.unwrap_or_else(Utc::now),
        lines: line_count,
        export_path: export_path.to_string(),
        first_msg_role: None,
        first_msg_content: None,
        last_msg_role: None,
        last_msg_content: None,
        derivation_type,
        is_sidechain: false,
        content: body,
    })
}

pub fn search(ctx: &RuntimeContext, query: Option<&str>, project: Option<&str>, limit: usize) -> Result<Vec<SearchHit>> {
    let db = IndexDb::open(&ctx.index_db_path())?;
    let params = QueryParams {
        query: query.map(str::to_string),
        project: project.map(str::to_string),
        limit,
        half_life_days: sessionctl_index::DEFAULT_HALF_LIFE_DAYS,
        now: Utc::now(),
    };
    Ok(db.query(&params)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use sessionctl_engine::StoreContext;
    use std::io::Write;

    fn runtime_ctx(home: &Path, cwd: &Path, state_dir: &Path) -> RuntimeContext {
        RuntimeContext { store: StoreContext::new(cwd.to_path_buf()).with_claude_home(home.to_path_buf()), config: Config::default(), state_dir: state_dir.to_path_buf() }
    }

    fn write_claude_session(home: &Path, cwd: &Path, session_id: &str, user_text: &str) {
        let encoded = sessionctl_core::encode_claude_project_dir(cwd);
        let dir = home.join("projects").join(encoded);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(format!("{session_id}.jsonl"));
        let mut f = std::fs::File::create(path).unwrap();
        writeln!(
            f,
            r#"{{"type":"user","uuid":"u1","parentUuid":null,"sessionId":"{session_id}","timestamp":"2026-01-01T00:00:00Z","cwd":"{cwd}","isSidechain":false,"isMeta":false,"message":{{"role":"user","content":"{user_text}"}}}}"#,
            cwd = cwd.display()
        )
        .unwrap();
    }

    #[test]
    fn build_from_raw_then_search_finds_indexed_session() {
        let home = tempfile::tempdir().unwrap();
        let cwd = tempfile::tempdir().unwrap();
        let state_dir = tempfile::tempdir().unwrap();
        write_claude_session(home.path(), cwd.path(), "s1", "let's talk about the rollout plan");

        let ctx = runtime_ctx(home.path(), cwd.path(), state_dir.path());
        let report = build_from_raw(&ctx, &SessionFilter::default(), false).unwrap();
        assert_eq!(report.indexed, 1);

        let hits = search(&ctx, Some("rollout"), None, 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].document.session_id, "s1");
    }

    #[test]
    fn second_build_without_force_skips_unchanged_session() {
        let home = tempfile::tempdir().unwrap();
        let cwd = tempfile::tempdir().unwrap();
        let state_dir = tempfile::tempdir().unwrap();
        write_claude_session(home.path(), cwd.path(), "s1", "hello");

        let ctx = runtime_ctx(home.path(), cwd.path(), state_dir.path());
        build_from_raw(&ctx, &SessionFilter::default(), false).unwrap();
        let second = build_from_raw(&ctx, &SessionFilter::default(), false).unwrap();
        assert_eq!(second.indexed, 0);
        assert_eq!(second.skipped, 1);
    }

    #[test]
    fn removed_session_is_pruned_from_the_index() {
        let home = tempfile::tempdir().unwrap();
        let cwd = tempfile::tempdir().unwrap();
        let state_dir = tempfile::tempdir().unwrap();
        write_claude_session(home.path(), cwd.path(), "s1", "hello");

        let ctx = runtime_ctx(home.path(), cwd.path(), state_dir.path());
        build_from_raw(&ctx, &SessionFilter::default(), false).unwrap();

        let encoded = sessionctl_core::encode_claude_project_dir(cwd.path());
        std::fs::remove_file(home.path().join("projects").join(encoded).join("s1.jsonl")).unwrap();

        let report = build_from_raw(&ctx, &SessionFilter::default(), false).unwrap();
        assert_eq!(report.removed, 1);
    }
}
