//! Session Store Adapter (spec §4.1): discovery, classification, and
//! identifier resolution over both agent dialects.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use sessionctl_core::{encode_claude_project_dir, normalize_path};
use sessionctl_providers::{classify_line, discovery_for, extract_claude_header, extract_codex_header, EventKind, ToolNameTracker};
use sessionctl_types::{
    Agent, ContinueMetadata, Derivation, SessionFilter, SessionOrder, SessionRecord, TrimMetadata, HELPER_MARKER_KEY,
    HELPER_MAX_MESSAGE_EVENTS,
};
use serde_json::Value;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Where to look for each agent's logs and what cwd "project scope" means.
/// Constructed once at the CLI entry point and threaded explicitly — no
/// process-wide globals (SPEC_FULL.md §0.3 Design Notes strategy).
#[derive(Debug, Clone)]
pub struct StoreContext {
    pub claude_home: Option<PathBuf>,
    pub codex_home: Option<PathBuf>,
    pub cwd: PathBuf,
}

impl StoreContext {
    pub fn new(cwd: PathBuf) -> Self {
        Self { claude_home: None, codex_home: None, cwd }
    }

    pub fn with_claude_home(mut self, dir: PathBuf) -> Self {
        self.claude_home = Some(dir);
        self
    }

    pub fn with_codex_home(mut self, dir: PathBuf) -> Self {
        self.codex_home = Some(dir);
        self
    }

    fn home_override(&self, agent: Agent) -> Option<&Path> {
        match agent {
            Agent::ClaudeCode => self.claude_home.as_deref(),
            Agent::Codex => self.codex_home.as_deref(),
        }
    }

    pub fn sessions_root(&self, agent: Agent) -> PathBuf {
        sessionctl_core::sessions_root(agent, self.home_override(agent))
    }
}

/// `detect_agent()` heuristic (SPEC_FULL.md §4.1+, from `trim_session.py`):
/// read up to the first 20 lines; a `session_meta`-typed record or a
/// `response_item`-typed record carrying a `payload` field indicates Agent
/// B; a `sessionId` field or a `user`/`assistant`-typed record carrying a
/// `message` field indicates Agent A. Defaults to Agent A if undetermined.
pub fn detect_agent(path: &Path) -> Agent {
    let Ok(file) = std::fs::File::open(path) else {
        return Agent::ClaudeCode;
    };
    let reader = BufReader::new(file);
    for line in reader.lines().take(20).map_while(|l| l.ok()) {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Ok(value) = serde_json::from_str::<Value>(line) else {
            continue;
        };
        let Some(obj) = value.as_object() else {
            continue;
        };
        let type_tag = obj.get("type").and_then(Value::as_str);
        if matches!(type_tag, Some("session_meta")) || (type_tag == Some("response_item") && obj.contains_key("payload")) {
            return Agent::Codex;
        }
        if obj.contains_key("sessionId")
            || (matches!(type_tag, Some("user") | Some("assistant")) && obj.contains_key("message"))
        {
            return Agent::ClaudeCode;
        }
    }
    Agent::ClaudeCode
}

/// A file that carries the helper marker in its first event and has at
/// most [`HELPER_MAX_MESSAGE_EVENTS`] conversational events is a helper
/// session (spec §4.8): created solely to run an analysis or seeding
/// prompt, and excluded from listings/indexing regardless of whether the
/// best-effort delete that normally follows it actually ran.
pub fn is_helper_session(path: &Path) -> bool {
    let Ok(file) = std::fs::File::open(path) else {
        return false;
    };
    let reader = BufReader::new(file);
    let mut lines = reader.lines().map_while(|l| l.ok());
    let Some(first) = lines.next() else {
        return false;
    };
    let Ok(first_value) = serde_json::from_str::<Value>(first.trim()) else {
        return false;
    };
    if first_value.get(HELPER_MARKER_KEY).is_none() {
        return false;
    }

    let agent = detect_agent(path);
    let mut tracker = ToolNameTracker::new();
    let mut message_events = 0usize;
    for raw in std::iter::once(first).chain(lines) {
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }
        if let Ok(classified) = classify_line(agent, raw, &mut tracker)
            && classified.kind.is_conversational()
        {
            message_events += 1;
            if message_events > HELPER_MAX_MESSAGE_EVENTS {
                return false;
            }
        }
    }
    true
}

/// Read enough of `path` to build a [`SessionRecord`] (spec §4.1
/// `classify(file)`): identity fields from the cheap per-dialect header
/// read, plus a single streaming pass for line count, sidechain detection
/// (first 30 events), and the last user-message preview.
pub fn classify(path: &Path, agent_hint: Option<Agent>) -> Result<SessionRecord> {
    let agent = agent_hint.unwrap_or_else(|| detect_agent(path));
    let metadata = std::fs::metadata(path)?;
    let modified_at: DateTime<Utc> = metadata.modified().ok().map(DateTime::<Utc>::from).unwrap_or_else(Utc::now);

    let (session_id, cwd, git_branch, first_timestamp, first_preview) = match agent {
        Agent::ClaudeCode => {
            let h = extract_claude_header(path)?;
            (h.session_id, h.cwd, h.git_branch, h.timestamp, h.snippet)
        }
        Agent::Codex => {
            let h = extract_codex_header(path)?;
            (h.session_id, h.cwd, h.git_branch, h.timestamp, h.snippet)
        }
    };
    let session_id = session_id.unwrap_or_else(|| filename_stem(path));
    let mut created_at = first_timestamp.as_deref().and_then(parse_timestamp);

    let file = std::fs::File::open(path)?;
    let reader = BufReader::new(file);
    let mut tracker = ToolNameTracker::new();
    let mut line_count = 0usize;
    let mut conversational_event_count = 0usize;
    let mut last_user_preview: Option<String> = None;
    let mut is_sidechain = false;
    let mut derivation = None;

    for (idx, raw) in reader.lines().map_while(|l| l.ok()).enumerate() {
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }
        line_count += 1;

        if idx == 0 {
            derivation = derivation_from_first_line(raw);
        }

        let Ok(classified) = classify_line(agent, raw, &mut tracker) else {
            continue;
        };
        if classified.kind.is_conversational() {
            conversational_event_count += 1;
        }
        if idx < 30 && classified.is_sidechain {
            is_sidechain = true;
        }
        if classified.kind == EventKind::User
            && let Some(text) = classified.texts.first()
        {
            last_user_preview = Some(sessionctl_types::truncate(&text.text, 200));
        }
        if created_at.is_none()
            && let Some(ts) = classified.value.pointer("/timestamp").and_then(Value::as_str)
        {
            created_at = parse_timestamp(ts);
        }
    }

    Ok(SessionRecord {
        session_id,
        agent,
        file_path: path.to_path_buf(),
        cwd,
        git_branch,
        created_at: created_at.unwrap_or(modified_at),
        modified_at,
        line_count,
        first_user_message_preview: first_preview,
        last_user_message_preview: last_user_preview,
        derivation: derivation.unwrap_or(Derivation::Original),
        is_sidechain,
        conversational_event_count,
    })
}

fn derivation_from_first_line(raw: &str) -> Option<Derivation> {
    let value: Value = serde_json::from_str(raw).ok()?;
    if let Some(meta) = value.get("trim_metadata")
        && let Ok(tm) = serde_json::from_value::<TrimMetadata>(meta.clone())
    {
        return Some(Derivation::Trimmed(tm));
    }
    if let Some(meta) = value.get("continue_metadata")
        && let Ok(cm) = serde_json::from_value::<ContinueMetadata>(meta.clone())
    {
        return Some(Derivation::Continued(cm));
    }
    None
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.with_timezone(&Utc))
}

fn filename_stem(path: &Path) -> String {
    path.file_stem().and_then(|s| s.to_str()).unwrap_or("unknown").to_string()
}

/// `discover(filter)` (spec §4.1): a materialized, newest-first listing
/// over both dialects. Unreadable or malformed files are skipped with a
/// diagnostic rather than failing the whole walk (spec §7).
pub fn discover(ctx: &StoreContext, filter: &SessionFilter) -> Result<Vec<SessionRecord>> {
    let agents: Vec<Agent> = match filter.agent {
        Some(agent) => vec![agent],
        None => vec![Agent::ClaudeCode, Agent::Codex],
    };

    let mut records = Vec::new();
    for agent in agents {
        let root = ctx.sessions_root(agent);
        let discovery = discovery_for(agent);
        let headers = match discovery.scan(&root) {
            Ok(h) => h,
            Err(err) => {
                tracing::warn!(agent = %agent, error = %err, "session store scan failed");
                continue;
            }
        };

        for header in headers {
            if header.is_sidechain && !filter.include_sidechain {
                continue;
            }
            if is_helper_session(&header.file_path) {
                continue;
            }
            let record = match classify(&header.file_path, Some(agent)) {
                Ok(r) => r,
                Err(err) => {
                    tracing::debug!(path = %header.file_path.display(), error = %err, "skipping unreadable session");
                    continue;
                }
            };
            if record.is_malformed() {
                continue;
            }
            if matches_filter(&record, filter) {
                records.push(record);
            }
        }
    }

    let order = filter.order.unwrap_or(SessionOrder::RecentlyModified);
    records.sort_by(|a, b| match order {
        SessionOrder::RecentlyModified => b.modified_at.cmp(&a.modified_at),
        SessionOrder::RecentlyCreated => b.created_at.cmp(&a.created_at),
    });

    if let Some(limit) = filter.limit {
        records.truncate(limit);
    }

    Ok(records)
}

fn matches_filter(record: &SessionRecord, filter: &SessionFilter) -> bool {
    if record.is_sidechain && !filter.include_sidechain {
        return false;
    }
    if filter.only_original && record.is_derived() {
        return false;
    }
    if filter.only_derived && !record.is_derived() {
        return false;
    }
    match &record.derivation {
        Derivation::Trimmed(_) if !filter.include_trimmed => return false,
        Derivation::Continued(_) if !filter.include_continued => return false,
        _ => {}
    }
    if let Some(cwd) = &filter.cwd {
        let target = normalize_path(cwd);
        match &record.cwd {
            Some(c) if normalize_path(Path::new(c)) == target => {}
            _ => return false,
        }
    }
    if let Some(min) = filter.min_line_count
        && record.line_count < min
    {
        return false;
    }
    if let Some(after) = filter.modified_after
        && record.modified_at < after
    {
        return false;
    }
    if let Some(before) = filter.modified_before
        && record.modified_at > before
    {
        return false;
    }
    if !filter.keywords.is_empty() {
        let Ok(text) = std::fs::read_to_string(&record.file_path) else {
            return false;
        };
        let folded = text.to_lowercase();
        if !filter.keywords.iter().all(|k| folded.contains(&k.to_lowercase())) {
            return false;
        }
    }
    true
}

/// `resolve(id-or-path)` (spec §4.1), precedence per SPEC_FULL.md §4.1+:
/// literal path; exact `<id>.jsonl` in the current project's Agent-A
/// directory; substring match across Agent-A stems in the current
/// project; substring match across Agent-B stems anywhere under its
/// sessions root; then broaden to all Agent-A project directories.
pub fn resolve(query: &str, ctx: &StoreContext) -> Result<SessionRecord> {
    let as_path = PathBuf::from(query);
    if as_path.is_file() {
        return classify(&as_path, None);
    }

    let claude_root = ctx.sessions_root(Agent::ClaudeCode);
    let project_dir = claude_root.join(encode_claude_project_dir(&ctx.cwd));

    let exact = project_dir.join(format!("{query}.jsonl"));
    if exact.is_file() {
        return classify(&exact, Some(Agent::ClaudeCode));
    }

    let mut candidates = Vec::new();
    if project_dir.is_dir() {
        collect_substring_matches(&project_dir, query, Some(2), &mut candidates);
    }

    if candidates.is_empty() {
        let codex_root = ctx.sessions_root(Agent::Codex);
        if codex_root.is_dir() {
            collect_substring_matches(&codex_root, query, None, &mut candidates);
        }
    }

    if candidates.is_empty() && claude_root.is_dir() {
        collect_substring_matches(&claude_root, query, Some(3), &mut candidates);
    }

    match candidates.len() {
        0 => Err(Error::NotFound(query.to_string())),
        1 => classify(&candidates[0], None),
        _ => Err(Error::Ambiguous(candidates.iter().map(|p| p.display().to_string()).collect())),
    }
}

fn collect_substring_matches(root: &Path, needle: &str, max_depth: Option<usize>, out: &mut Vec<PathBuf>) {
    let needle = needle.to_lowercase();
    let mut walker = WalkDir::new(root);
    if let Some(depth) = max_depth {
        walker = walker.max_depth(depth);
    }
    for entry in walker.into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        if !path.is_file() || path.extension().is_none_or(|e| e != "jsonl") {
            continue;
        }
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default().to_lowercase();
        if stem.contains(&needle) {
            out.push(path.to_path_buf());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_claude_session(path: &Path, session_id: &str, user_text: &str) {
        let mut f = std::fs::File::create(path).unwrap();
        writeln!(
            f,
            r#"{{"type":"user","uuid":"u1","parentUuid":null,"sessionId":"{session_id}","timestamp":"2026-01-01T00:00:00Z","cwd":"/tmp/proj","isSidechain":false,"isMeta":false,"message":{{"role":"user","content":"{user_text}"}}}}"#
        )
        .unwrap();
    }

    #[test]
    fn classify_reads_claude_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("abc-123.jsonl");
        write_claude_session(&path, "abc-123", "hello world");

        let record = classify(&path, None).unwrap();
        assert_eq!(record.session_id, "abc-123");
        assert_eq!(record.agent, Agent::ClaudeCode);
        assert_eq!(record.line_count, 1);
        assert_eq!(record.first_user_message_preview.as_deref(), Some("hello world"));
        assert!(matches!(record.derivation, Derivation::Original));
    }

    #[test]
    fn detect_agent_defaults_to_claude_on_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.jsonl");
        std::fs::File::create(&path).unwrap();
        assert_eq!(detect_agent(&path), Agent::ClaudeCode);
    }

    #[test]
    fn resolve_exact_literal_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.jsonl");
        write_claude_session(&path, "abc-123", "hi");

        let ctx = StoreContext::new(dir.path().to_path_buf());
        let record = resolve(path.to_str().unwrap(), &ctx).unwrap();
        assert_eq!(record.session_id, "abc-123");
    }

    #[test]
    fn is_helper_session_requires_marker() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("h.jsonl");
        write_claude_session(&path, "abc-123", "hi");
        assert!(!is_helper_session(&path));
    }

    #[test]
    fn is_helper_session_detects_marker_with_few_messages() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("h.jsonl");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(
            f,
            r#"{{"type":"user","uuid":"u1","parentUuid":null,"sessionId":"h1","timestamp":"2026-01-01T00:00:00Z","isSidechain":false,"isMeta":false,"sessionctl_helper":true,"message":{{"role":"user","content":"summarize this"}}}}"#
        )
        .unwrap();
        assert!(is_helper_session(&path));
    }
}
