//! LLM-guided smart trim (spec §4.3.2): candidate lines above the
//! content-extraction threshold are batched to worker subprocesses, their
//! verdicts unioned, and every selected line is replaced wholesale with a
//! fixed JSON placeholder marker. Protected events are never offered as
//! candidates in the first place.

use crate::error::{Error, Result};
use crate::identity::write_derived_session;
use crate::naming::{derived_file_path, mint_session_id};
use crate::placeholders::smart_trim_placeholder;
use crate::store::{classify, detect_agent};
use chrono::Utc;
use sessionctl_analysis::{
    build_prompt, dispatch_parallel, partition, CandidateLine, ChunkJob, CommandRunner, PromptContext,
    CONTENT_EXTRACTION_THRESHOLD, DEFAULT_CHUNK_SIZE, SMART_TRIM_HARD_FLOOR,
};
use sessionctl_providers::{classify_line, ToolNameTracker};
use sessionctl_types::{SessionRecord, TrimMetadata};
use std::collections::HashMap;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Duration;

/// Worker dispatch configuration. `command` is the subprocess invocation
/// (program followed by any fixed leading args, e.g. `["claude", "-p"]`);
/// the rendered prompt is appended as the final argument for each chunk.
#[derive(Debug, Clone)]
pub struct SmartTrimOptions {
    pub command: Vec<String>,
    pub char_threshold: usize,
    pub chunk_size: usize,
    pub concurrency: usize,
    pub timeout: Duration,
    pub custom_instructions: Option<String>,
}

impl Default for SmartTrimOptions {
    fn default() -> Self {
        Self {
            command: Vec::new(),
            char_threshold: SMART_TRIM_HARD_FLOOR,
            chunk_size: DEFAULT_CHUNK_SIZE,
            concurrency: 4,
            timeout: Duration::from_secs(120),
            custom_instructions: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SmartTrimOutcome {
    pub record: SessionRecord,
    pub lines_trimmed: usize,
    pub bytes_removed: i64,
    pub estimated_tokens_saved: i64,
}

/// Outcome of a smart-trim pass. An empty verdict set writes no file at all
/// (spec §4.3.2 edge case: "empty verdict set ⇒ no output file, report
/// 'already optimal'").
#[derive(Debug, Clone)]
pub enum SmartTrimResult {
    Trimmed(SmartTrimOutcome),
    AlreadyOptimal,
}

pub async fn smart_trim_session(
    path: &Path,
    options: &SmartTrimOptions,
    runner: &dyn CommandRunner,
) -> Result<SmartTrimResult> {
    let agent = detect_agent(path);
    let char_threshold = options.char_threshold.max(SMART_TRIM_HARD_FLOOR);

    let file = std::fs::File::open(path)?;
    let reader = BufReader::new(file);
    let mut tracker = ToolNameTracker::new();

    let mut raw_lines: Vec<String> = Vec::new();
    let mut candidates: Vec<CandidateLine> = Vec::new();
    let mut lengths: HashMap<usize, usize> = HashMap::new();

    for (idx, line) in reader.lines().map_while(|l| l.ok()).enumerate() {
        let raw = line.trim().to_string();
        if raw.is_empty() {
            continue;
        }
        let line_number = idx + 1;
        if let Ok(classified) = classify_line(agent, &raw, &mut tracker)
            && !classified.kind.is_protected()
        {
            let len = classified.text_len();
            if len >= CONTENT_EXTRACTION_THRESHOLD {
                let preview = classified.texts.iter().map(|t| t.text.as_str()).collect::<Vec<_>>().join(" | ");
                candidates.push(CandidateLine {
                    line_number,
                    length: len,
                    kind_label: format!("{:?}", classified.kind),
                    preview: sessionctl_types::truncate(&preview, 300),
                });
                lengths.insert(line_number, len);
            }
        }
        raw_lines.push(raw);
    }

    let chunks = partition(candidates, options.chunk_size.max(1));
    let chunk_count = chunks.len();
    let mut jobs = Vec::with_capacity(chunk_count);
    for (idx, chunk) in chunks.into_iter().enumerate() {
        let ctx = PromptContext {
            chunk_index: idx,
            chunk_count,
            char_threshold,
            custom_instructions: options.custom_instructions.as_deref(),
        };
        let prompt = build_prompt(&ctx, &chunk);
        let (program, rest) = options
            .command
            .split_first()
            .ok_or_else(|| Error::Malformed("smart-trim requires a worker command".to_string()))?;
        let mut args = rest.to_vec();
        args.push(prompt);
        jobs.push(ChunkJob { label: format!("chunk-{idx}"), program: program.clone(), args });
    }

    let verdict_batches = dispatch_parallel(runner, jobs, options.timeout, options.concurrency.max(1)).await;

    let mut selected: HashMap<usize, usize> = HashMap::new();
    for batch in verdict_batches {
        for verdict in batch {
            if let Some(&len) = lengths.get(&verdict.line_number)
                && len >= SMART_TRIM_HARD_FLOOR
            {
                selected.insert(verdict.line_number, len);
            }
        }
    }

    if selected.is_empty() {
        return Ok(SmartTrimResult::AlreadyOptimal);
    }

    let mut lines_trimmed = 0usize;
    let mut bytes_removed: i64 = 0;
    let mut rendered_lines = Vec::with_capacity(raw_lines.len());
    for (idx, raw) in raw_lines.into_iter().enumerate() {
        let line_number = idx + 1;
        if let Some(&original_len) = selected.get(&line_number) {
            let placeholder = smart_trim_placeholder(original_len, line_number);
            let rendered = serde_json::to_string(&placeholder)?;
            bytes_removed += raw.len() as i64 - rendered.len() as i64;
            lines_trimmed += 1;
            rendered_lines.push(rendered);
        } else {
            rendered_lines.push(raw);
        }
    }

    let now = Utc::now();
    let new_id = mint_session_id(agent);
    let new_path = derived_file_path(agent, path, &new_id, now);
    let estimated_tokens_saved = (bytes_removed / 4).max(0);

    let trim_metadata = TrimMetadata {
        parent_file: path.to_string_lossy().to_string(),
        trimmed_at: now.to_rfc3339(),
        trim_params: None,
        tools_trimmed: 0,
        assistant_messages_trimmed: lines_trimmed,
        bytes_removed,
        estimated_tokens_saved,
    };

    write_derived_session(&new_path, agent, &new_id, &rendered_lines, "trim_metadata", &trim_metadata)?;

    let record = classify(&new_path, Some(agent))?;
    Ok(SmartTrimResult::Trimmed(SmartTrimOutcome { record, lines_trimmed, bytes_removed, estimated_tokens_saved }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::BoxFuture;
    use sessionctl_analysis::ProcessOutput;

    struct FakeRunner {
        reply: String,
    }

    impl CommandRunner for FakeRunner {
        fn run<'a>(&'a self, _program: &'a str, _args: &'a [String]) -> BoxFuture<'a, std::io::Result<ProcessOutput>> {
            let reply = self.reply.clone();
            Box::pin(async move { Ok(ProcessOutput { stdout: reply, stderr: String::new(), success: true }) })
        }
    }

    fn claude_line(uuid: &str, text: &str) -> String {
        format!(
            r#"{{"type":"user","uuid":"{uuid}","parentUuid":null,"sessionId":"orig","timestamp":"2026-01-01T00:00:00Z","cwd":"/tmp","isSidechain":false,"isMeta":false,"message":{{"role":"user","content":"{text}"}}}}"#
        )
    }

    fn claude_tool_result(uuid: &str, tool_use_id: &str, content: &str) -> String {
        format!(
            r#"{{"type":"user","uuid":"{uuid}","parentUuid":null,"sessionId":"orig","timestamp":"2026-01-01T00:00:01Z","isSidechain":false,"isMeta":false,"message":{{"role":"user","content":[{{"type":"tool_result","tool_use_id":"{tool_use_id}","content":"{content}"}}]}}}}"#
        )
    }

    fn claude_tool_use(uuid: &str, tool_use_id: &str, name: &str) -> String {
        format!(
            r#"{{"type":"assistant","uuid":"{uuid}","parentUuid":null,"sessionId":"orig","timestamp":"2026-01-01T00:00:02Z","isSidechain":false,"message":{{"id":"m1","role":"assistant","model":"x","content":[{{"type":"tool_use","id":"{tool_use_id}","name":"{name}","input":{{}}}}]}}}}"#
        )
    }

    #[tokio::test]
    async fn selected_line_is_replaced_with_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orig.jsonl");
        let big = "y".repeat(600);
        let lines = vec![claude_line("u1", "go"), claude_tool_use("u2", "call-1", "Bash"), claude_tool_result("u3", "call-1", &big)];
        std::fs::write(&path, lines.join("\n") + "\n").unwrap();

        let runner = FakeRunner { reply: "[[3, \"bulky tool output\", \"large result\"]]".to_string() };
        let options = SmartTrimOptions { command: vec!["fake".to_string()], ..SmartTrimOptions::default() };

        let result = smart_trim_session(&path, &options, &runner).await.unwrap();
        let outcome = match result {
            SmartTrimResult::Trimmed(outcome) => outcome,
            SmartTrimResult::AlreadyOptimal => panic!("expected a trim to be applied"),
        };
        assert_eq!(outcome.lines_trimmed, 1);
        assert!(outcome.bytes_removed > 0);

        let written = std::fs::read_to_string(&outcome.record.file_path).unwrap();
        assert!(written.contains("trimmed_line"));
        assert!(!written.contains(&big));
    }

    #[tokio::test]
    async fn empty_verdicts_write_no_file_and_report_already_optimal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orig.jsonl");
        let lines = vec![claude_line("u1", "go")];
        std::fs::write(&path, lines.join("\n") + "\n").unwrap();

        let runner = FakeRunner { reply: "[]".to_string() };
        let options = SmartTrimOptions { command: vec!["fake".to_string()], ..SmartTrimOptions::default() };

        let result = smart_trim_session(&path, &options, &runner).await.unwrap();
        assert!(matches!(result, SmartTrimResult::AlreadyOptimal));

        // No sibling file was created alongside the parent.
        let siblings: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(siblings.len(), 1);
    }
}
