//! Builders for minimal but dialect-accurate session fixtures. Lines are
//! written as raw JSON text rather than through the provider crate's
//! schema types, since those are private to `sessionctl-providers` and
//! writing the literal shape is what the provider's own tests do too.

use sessionctl_core::encode_claude_project_dir;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub struct ClaudeFixture {
    pub session_id: String,
    pub cwd: String,
    pub git_branch: Option<String>,
}

impl ClaudeFixture {
    pub fn new(cwd: &str) -> Self {
        Self { session_id: Uuid::new_v4().to_string(), cwd: cwd.to_string(), git_branch: Some("main".to_string()) }
    }

    pub fn user_line(&self, uuid: &str, parent_uuid: Option<&str>, text: &str, timestamp: &str) -> String {
        let parent = parent_uuid.map(|p| format!("\"{p}\"")).unwrap_or_else(|| "null".to_string());
        let branch = self.git_branch.as_deref().unwrap_or("main");
        format!(
            r#"{{"type":"user","uuid":"{uuid}","parentUuid":{parent},"sessionId":"{sid}","timestamp":"{ts}","cwd":"{cwd}","gitBranch":"{branch}","isSidechain":false,"isMeta":false,"message":{{"role":"user","content":"{text}"}}}}"#,
            sid = self.session_id,
            ts = timestamp,
            cwd = self.cwd,
        )
    }

    pub fn assistant_text_line(&self, uuid: &str, parent_uuid: &str, text: &str, timestamp: &str) -> String {
        format!(
            r#"{{"type":"assistant","uuid":"{uuid}","parentUuid":"{parent_uuid}","sessionId":"{sid}","timestamp":"{ts}","isSidechain":false,"message":{{"id":"m-{uuid}","role":"assistant","model":"claude","content":[{{"type":"text","text":"{text}"}}]}}}}"#,
            sid = self.session_id,
            ts = timestamp,
        )
    }

    pub fn assistant_tool_use_line(&self, uuid: &str, parent_uuid: &str, call_id: &str, tool_name: &str, input: &str, timestamp: &str) -> String {
        format!(
            r#"{{"type":"assistant","uuid":"{uuid}","parentUuid":"{parent_uuid}","sessionId":"{sid}","timestamp":"{ts}","isSidechain":false,"message":{{"id":"m-{uuid}","role":"assistant","model":"claude","content":[{{"type":"tool_use","id":"{call_id}","name":"{tool_name}","input":{input}}}]}}}}"#,
            sid = self.session_id,
            ts = timestamp,
        )
    }

    pub fn tool_result_line(&self, uuid: &str, parent_uuid: &str, call_id: &str, output: &str, timestamp: &str) -> String {
        format!(
            r#"{{"type":"user","uuid":"{uuid}","parentUuid":"{parent_uuid}","sessionId":"{sid}","timestamp":"{ts}","isSidechain":false,"isMeta":false,"message":{{"role":"user","content":[{{"type":"tool_result","tool_use_id":"{call_id}","content":"{output}"}}]}}}}"#,
            sid = self.session_id,
            ts = timestamp,
        )
    }

    /// Writes `lines` to `<home>/projects/<encoded cwd>/<session_id>.jsonl`
    /// and returns the path.
    pub fn write(&self, home: &Path, lines: &[String]) -> PathBuf {
        let dir = home.join("projects").join(encode_claude_project_dir(Path::new(&self.cwd)));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(format!("{}.jsonl", self.session_id));
        std::fs::write(&path, lines.join("\n") + "\n").unwrap();
        path
    }

    /// A ready-made two-turn conversation: one user message, one assistant
    /// reply, written straight to disk.
    pub fn write_simple(home: &Path, cwd: &str, user_text: &str, assistant_text: &str) -> (Self, PathBuf) {
        let fixture = Self::new(cwd);
        let u1 = Uuid::new_v4().to_string();
        let a1 = Uuid::new_v4().to_string();
        let lines = vec![
            fixture.user_line(&u1, None, user_text, "2026-01-01T00:00:00Z"),
            fixture.assistant_text_line(&a1, &u1, assistant_text, "2026-01-01T00:00:01Z"),
        ];
        let path = fixture.write(home, &lines);
        (fixture, path)
    }
}

pub struct CodexFixture {
    pub session_id: String,
    pub cwd: String,
}

impl CodexFixture {
    pub fn new(cwd: &str) -> Self {
        Self { session_id: Uuid::new_v4().to_string(), cwd: cwd.to_string() }
    }

    pub fn session_meta_line(&self, timestamp: &str) -> String {
        format!(
            r#"{{"type":"session_meta","timestamp":"{ts}","payload":{{"id":"{sid}","timestamp":"{ts}","cwd":"{cwd}","originator":"codex_cli_rs","cli_version":"0.1.0","source":"cli"}}}}"#,
            sid = self.session_id,
            ts = timestamp,
            cwd = self.cwd,
        )
    }

    pub fn user_message_line(&self, text: &str, timestamp: &str) -> String {
        format!(
            r#"{{"type":"response_item","timestamp":"{ts}","payload":{{"type":"message","role":"user","content":[{{"type":"input_text","text":"{text}"}}]}}}}"#,
            ts = timestamp,
        )
    }

    pub fn agent_message_line(&self, text: &str, timestamp: &str) -> String {
        format!(
            r#"{{"type":"response_item","timestamp":"{ts}","payload":{{"type":"message","role":"assistant","content":[{{"type":"output_text","text":"{text}"}}]}}}}"#,
            ts = timestamp,
        )
    }

    pub fn function_call_line(&self, call_id: &str, name: &str, arguments_json: &str, timestamp: &str) -> String {
        format!(
            r#"{{"type":"response_item","timestamp":"{ts}","payload":{{"type":"function_call","name":"{name}","arguments":"{args}","call_id":"{call_id}"}}}}"#,
            ts = timestamp,
            args = arguments_json.replace('"', "\\\""),
        )
    }

    pub fn function_call_output_line(&self, call_id: &str, output: &str, timestamp: &str) -> String {
        format!(r#"{{"type":"response_item","timestamp":"{ts}","payload":{{"type":"function_call_output","call_id":"{call_id}","output":"{output}"}}}}"#, ts = timestamp)
    }

    /// Codex's on-disk path: `<home>/sessions/rollout-<ts>-<uuid>.jsonl`.
    /// Real installs nest this under `yyyy/mm/dd/`; discovery walks
    /// unbounded so the flat layout here is equally discoverable.
    pub fn write(&self, home: &Path, lines: &[String]) -> PathBuf {
        let dir = home.join("sessions");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(format!("rollout-2026-01-01T00-00-00-{}.jsonl", self.session_id));
        std::fs::write(&path, lines.join("\n") + "\n").unwrap();
        path
    }

    pub fn write_simple(home: &Path, cwd: &str, user_text: &str, agent_text: &str) -> (Self, PathBuf) {
        let fixture = Self::new(cwd);
        let lines = vec![
            fixture.session_meta_line("2026-01-01T00:00:00Z"),
            fixture.user_message_line(user_text, "2026-01-01T00:00:01Z"),
            fixture.agent_message_line(agent_text, "2026-01-01T00:00:02Z"),
        ];
        let path = fixture.write(home, &lines);
        (fixture, path)
    }
}
