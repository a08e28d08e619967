//! Export formatting (spec §4.6): front matter plus a prefixed-line,
//! human-readable rendering of the conversation body. Re-exporting an
//! unchanged session is a no-op unless `force` is set (the incremental
//! export gate compares the export file's mtime against the source's).

use crate::error::Result;
use crate::lineage::original_of;
use crate::store::detect_agent;
use chrono::{DateTime, Utc};
use sessionctl_providers::{classify_line, Classified, EventKind, ToolNameTracker};
use sessionctl_types::{Derivation, FrontMatter, SessionRecord, TrimStats};
use serde_json::Value;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub output_dir: PathBuf,
    pub force: bool,
}

#[derive(Debug, Clone)]
pub struct ExportOutcome {
    pub path: PathBuf,
    pub skipped: bool,
    pub bytes_written: usize,
}

/// Single-argument tool calls rendered as `Name(value)` instead of
/// `Name(key=value)` (spec §4.6 compact-args rendering, pinned down by
/// SPEC_FULL.md §4.6+: only this fixed allowlist, and only for a string
/// value under 100 characters).
const SHORTCUT_ARG_KEYS: &[&str] = &["command", "file_path", "pattern", "path", "query", "url", "prompt"];

pub fn export_session(record: &SessionRecord, options: &ExportOptions) -> Result<ExportOutcome> {
    let path = options.output_dir.join(format!("{}.txt", record.session_id));

    if !options.force
        && let Ok(metadata) = std::fs::metadata(&path)
        && let Ok(exported_at) = metadata.modified()
        && DateTime::<Utc>::from(exported_at) >= record.modified_at
    {
        return Ok(ExportOutcome { path, skipped: true, bytes_written: 0 });
    }

    let front_matter = build_front_matter(record)?;
    let body = render_body(record)?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut rendered = render_front_matter(&front_matter);
    rendered.push('\n');
    rendered.push_str(&body);

    let mut file = File::create(&path)?;
    file.write_all(rendered.as_bytes())?;

    Ok(ExportOutcome { path, skipped: false, bytes_written: rendered.len() })
}

fn build_front_matter(record: &SessionRecord) -> Result<FrontMatter> {
    let project = record
        .cwd
        .as_deref()
        .and_then(|cwd| Path::new(cwd).file_name())
        .and_then(|n| n.to_str())
        .map(str::to_string);

    let (derivation_type, parent_session_id, parent_session_file, trim_stats) = match &record.derivation {
        Derivation::Original => (None, None, None, None),
        Derivation::Trimmed(meta) => (
            Some("trimmed".to_string()),
            None,
            Some(meta.parent_file.clone()),
            Some(TrimStats {
                tools_trimmed: meta.tools_trimmed,
                assistant_messages_trimmed: meta.assistant_messages_trimmed,
                bytes_removed: meta.bytes_removed,
                estimated_tokens_saved: meta.estimated_tokens_saved,
            }),
        ),
        Derivation::Continued(meta) => {
            (Some("continued".to_string()), Some(meta.parent_session_id.clone()), Some(meta.parent_session_file.clone()), None)
        }
    };

    let original_session_id =
        if record.is_derived() { Some(original_of(record)?.session_id) } else { None };

    Ok(FrontMatter {
        session_id: record.session_id.clone(),
        agent: record.agent.as_str().to_string(),
        file_path: record.file_path.clone(),
        project,
        branch: record.git_branch.clone(),
        cwd: record.cwd.clone(),
        lines: Some(record.line_count),
        created: Some(record.created_at),
        modified: Some(record.modified_at),
        derivation_type,
        parent_session_id,
        parent_session_file,
        original_session_id,
        trim_stats,
    })
}

fn render_front_matter(front_matter: &FrontMatter) -> String {
    let mut out = String::from("---\n");
    out.push_str(&format!("session_id: {}\n", front_matter.session_id));
    out.push_str(&format!("agent: {}\n", front_matter.agent));
    out.push_str(&format!("file_path: {}\n", front_matter.file_path.display()));
    push_optional(&mut out, "project", front_matter.project.as_deref());
    push_optional(&mut out, "branch", front_matter.branch.as_deref());
    push_optional(&mut out, "cwd", front_matter.cwd.as_deref());
    if let Some(lines) = front_matter.lines {
        out.push_str(&format!("lines: {lines}\n"));
    }
    if let Some(created) = front_matter.created {
        out.push_str(&format!("created: {}\n", created.to_rfc3339()));
    }
    if let Some(modified) = front_matter.modified {
        out.push_str(&format!("modified: {}\n", modified.to_rfc3339()));
    }
    push_optional(&mut out, "derivation_type", front_matter.derivation_type.as_deref());
    push_optional(&mut out, "parent_session_id", front_matter.parent_session_id.as_deref());
    push_optional(&mut out, "parent_session_file", front_matter.parent_session_file.as_deref());
    push_optional(&mut out, "original_session_id", front_matter.original_session_id.as_deref());
    if let Some(stats) = &front_matter.trim_stats {
        out.push_str(&format!(
            "trim_stats: tools_trimmed={} assistant_messages_trimmed={} bytes_removed={} estimated_tokens_saved={}\n",
            stats.tools_trimmed, stats.assistant_messages_trimmed, stats.bytes_removed, stats.estimated_tokens_saved
        ));
    }
    out.push_str("---\n");
    out
}

fn push_optional(out: &mut String, key: &str, value: Option<&str>) {
    if let Some(value) = value {
        out.push_str(&format!("{key}: {value}\n"));
    }
}

/// Renders the transcript body with the fixed prefix scheme (spec §4.6):
/// `> ` for a user message, `⏺ ` for an assistant message or tool call,
/// `  ⎿  ` for a tool result, with continuation lines bare under `>`/`⏺`
/// and indented to the content column under `⎿`. Public so the index
/// builder can reuse it when indexing straight from raw sessions rather
/// than from an export file.
pub fn render_body(record: &SessionRecord) -> Result<String> {
    let agent = detect_agent(&record.file_path);
    let file = File::open(&record.file_path)?;
    let reader = BufReader::new(file);
    let mut tracker = ToolNameTracker::new();

    let mut out = String::new();
    for line in reader.lines().map_while(|l| l.ok()) {
        let raw = line.trim();
        if raw.is_empty() {
            continue;
        }
        let Ok(classified) = classify_line(agent, raw, &mut tracker) else {
            continue;
        };
        if classified.is_sidechain {
            continue;
        }

        match classified.kind {
            EventKind::User => {
                let text = joined_text(&classified);
                if !text.is_empty() {
                    push_marked(&mut out, "> ", &text);
                }
            }
            EventKind::Assistant => {
                for (name, args) in &classified.tool_calls {
                    out.push_str("⏺ ");
                    out.push_str(&render_tool_call(name, args));
                    out.push('\n');
                }
                let text = joined_text(&classified);
                if !text.is_empty() {
                    push_marked(&mut out, "⏺ ", &text);
                }
            }
            EventKind::ToolResult => {
                let text = joined_text(&classified);
                if !text.is_empty() {
                    push_marked(&mut out, "  ⎿  ", &text);
                }
            }
            EventKind::ToolUse
            | EventKind::Reasoning
            | EventKind::SessionMeta
            | EventKind::Snapshot
            | EventKind::QueueOp
            | EventKind::Unknown => {}
        }
    }
    Ok(out)
}

fn joined_text(classified: &Classified) -> String {
    classified.texts.iter().map(|t| t.text.as_str()).collect::<Vec<_>>().join("\n")
}

fn push_marked(out: &mut String, marker: &str, text: &str) {
    let continuation_indent = if marker.contains('⎿') { " ".repeat(marker.chars().count()) } else { String::new() };
    for (i, line) in text.lines().enumerate() {
        if i == 0 {
            out.push_str(marker);
        } else {
            out.push('\n');
            out.push_str(&continuation_indent);
        }
        out.push_str(line);
    }
    out.push('\n');
}

fn render_tool_call(name: &str, args: &Value) -> String {
    let Some(map) = args.as_object() else {
        return format!("{name}()");
    };
    if map.len() == 1
        && let Some((key, value)) = map.iter().next()
        && SHORTCUT_ARG_KEYS.contains(&key.as_str())
        && let Value::String(s) = value
        && s.chars().count() < 100
    {
        return format!("{name}({})", render_arg_value(value));
    }
    let rendered = map.iter().map(|(k, v)| format!("{k}={}", render_arg_value(v))).collect::<Vec<_>>().join(", ");
    format!("{name}({rendered})")
}

fn render_arg_value(value: &Value) -> String {
    match value {
        Value::String(s) => format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\"")),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sessionctl_types::Agent;

    fn sample_record(dir: &Path) -> SessionRecord {
        SessionRecord {
            session_id: "abc-123".to_string(),
            agent: Agent::ClaudeCode,
            file_path: dir.join("abc-123.jsonl"),
            cwd: Some("/home/u/work/sessionctl".to_string()),
            git_branch: Some("main".to_string()),
            created_at: Utc::now(),
            modified_at: Utc::now(),
            line_count: 2,
            first_user_message_preview: Some("hi".to_string()),
            last_user_message_preview: Some("hi".to_string()),
            derivation: Derivation::Original,
            is_sidechain: false,
            conversational_event_count: 2,
        }
    }

    #[test]
    fn export_writes_front_matter_and_body() {
        let dir = tempfile::tempdir().unwrap();
        let record = sample_record(dir.path());
        std::fs::write(
            &record.file_path,
            concat!(
                r#"{"type":"user","uuid":"u1","parentUuid":null,"sessionId":"abc-123","timestamp":"2026-01-01T00:00:00Z","isSidechain":false,"isMeta":false,"message":{"role":"user","content":"go"}}"#,
                "\n",
                r#"{"type":"assistant","uuid":"u2","parentUuid":null,"sessionId":"abc-123","timestamp":"2026-01-01T00:00:01Z","isSidechain":false,"message":{"id":"m1","role":"assistant","model":"x","content":[{"type":"tool_use","id":"call-1","name":"Bash","input":{"command":"ls -la"}}]}}"#,
                "\n"
            ),
        )
        .unwrap();

        let out_dir = tempfile::tempdir().unwrap();
        let options = ExportOptions { output_dir: out_dir.path().to_path_buf(), force: false };
        let outcome = export_session(&record, &options).unwrap();
        assert!(!outcome.skipped);

        let contents = std::fs::read_to_string(&outcome.path).unwrap();
        assert!(contents.starts_with("---\n"));
        assert!(contents.contains("session_id: abc-123"));
        assert!(contents.contains("project: sessionctl"));
        assert!(contents.contains("Bash(\"ls -la\")"));
    }

    #[test]
    fn skips_when_export_is_newer_than_source() {
        let dir = tempfile::tempdir().unwrap();
        let record = sample_record(dir.path());
        std::fs::write(
            &record.file_path,
            r#"{"type":"user","uuid":"u1","parentUuid":null,"sessionId":"abc-123","timestamp":"2026-01-01T00:00:00Z","isSidechain":false,"isMeta":false,"message":{"role":"user","content":"go"}}
"#,
        )
        .unwrap();

        let out_dir = tempfile::tempdir().unwrap();
        let options = ExportOptions { output_dir: out_dir.path().to_path_buf(), force: false };
        let first = export_session(&record, &options).unwrap();
        assert!(!first.skipped);

        let second = export_session(&record, &options).unwrap();
        assert!(second.skipped);
    }
}
