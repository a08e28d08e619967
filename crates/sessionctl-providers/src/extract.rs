//! Dialect-agnostic view over a single JSONL line: its conversational kind,
//! the textual fields a derivation pass might replace, and the tool name a
//! tool-result line correlates to (via the matching tool-use call id, which
//! both dialects put on a separate, earlier line).
//!
//! This is the only place in the crate family that understands *both*
//! dialects' shapes at once; `sessionctl-engine`'s trim/smart-trim/export
//! code only ever sees [`Classified`].

use crate::claude::schema::{AssistantContent, ClaudeRecord, UserContent};
use crate::codex::schema::{CodexRecord, EventMsgPayload, MessageContent, ResponseItemPayload};
use crate::{Error, Result};
use sessionctl_types::Agent;
use serde_json::Value;
use std::collections::HashMap;

/// The event kinds the core distinguishes; see spec §3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    User,
    Assistant,
    ToolUse,
    ToolResult,
    Reasoning,
    SessionMeta,
    Snapshot,
    QueueOp,
    Unknown,
}

impl EventKind {
    /// Events that a smart-trim pass must never select, regardless of
    /// length (spec §4.3.2 step 1).
    pub fn is_protected(&self) -> bool {
        matches!(
            self,
            EventKind::User
                | EventKind::Reasoning
                | EventKind::SessionMeta
                | EventKind::Snapshot
                | EventKind::QueueOp
                | EventKind::Unknown
        )
    }

    /// Event kinds that make a session "valid/resumable" under I3.
    pub fn is_conversational(&self) -> bool {
        matches!(self, EventKind::User | EventKind::Assistant | EventKind::ToolResult)
    }
}

/// A textual field inside a line, addressed by a JSON Pointer (RFC 6901) so
/// callers can both read and, for trim, overwrite it in place.
#[derive(Debug, Clone)]
pub struct TextField {
    pub pointer: String,
    pub text: String,
}

/// One parsed JSONL line, classified and with its replaceable text fields
/// enumerated. `value` is the full parsed line, kept so an unmodified line
/// can be re-serialized byte-for-byte equivalent (key order aside).
pub struct Classified {
    pub kind: EventKind,
    pub value: Value,
    pub is_sidechain: bool,
    /// Tool name, when `kind` is `ToolUse` or `ToolResult`.
    pub tool_name: Option<String>,
    /// Every `(name, arguments)` pair embedded in this line's content
    /// blocks, regardless of `kind` — an assistant record commonly carries
    /// text and one or more tool-use blocks together. Used by the exporter's
    /// compact-args rendering; empty for lines with no tool call.
    pub tool_calls: Vec<(String, Value)>,
    pub texts: Vec<TextField>,
}

impl Classified {
    /// Total extractable character count across all text fields.
    pub fn text_len(&self) -> usize {
        self.texts.iter().map(|t| t.text.chars().count()).sum()
    }
}

/// Correlates tool-result lines back to the tool name their matching
/// tool-use line carried, since neither dialect repeats the name on the
/// result. Feed lines through in file order.
#[derive(Default)]
pub struct ToolNameTracker {
    by_call_id: HashMap<String, String>,
}

impl ToolNameTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&mut self, call_id: String, name: String) {
        self.by_call_id.insert(call_id, name);
    }

    fn lookup(&self, call_id: &str) -> Option<String> {
        self.by_call_id.get(call_id).cloned()
    }
}

/// Parse one raw JSONL line for the given agent's dialect.
pub fn classify_line(agent: Agent, raw: &str, tracker: &mut ToolNameTracker) -> Result<Classified> {
    let value: Value = serde_json::from_str(raw)?;
    match agent {
        Agent::ClaudeCode => classify_claude(value, tracker),
        Agent::Codex => classify_codex(value, tracker),
    }
}

/// Public helper for callers (e.g. smart-trim candidate extraction) that
/// just want the text fields at or above a minimum length, without the
/// pointer bookkeeping needed to rewrite them.
pub fn extract_texts(agent: Agent, raw: &str, min_len: usize) -> Result<Vec<String>> {
    let mut tracker = ToolNameTracker::new();
    let classified = classify_line(agent, raw, &mut tracker)?;
    Ok(classified
        .texts
        .into_iter()
        .map(|t| t.text)
        .filter(|t| t.chars().count() >= min_len)
        .collect())
}

/// A field this dialect uses to embed the owning session's id in every
/// event, per invariant I2. Claude stamps every user/assistant record;
/// Codex only stamps its single `session_meta` record.
pub fn session_id_pointers(agent: Agent) -> &'static [&'static str] {
    match agent {
        Agent::ClaudeCode => &["/sessionId"],
        Agent::Codex => &["/payload/id"],
    }
}

/// Rewrite every session-id field this line carries to `new_id`. No-op if
/// the line carries none (most Codex lines).
pub fn rewrite_session_id(agent: Agent, value: &mut Value, new_id: &str) {
    for pointer in session_id_pointers(agent) {
        if let Some(slot) = value.pointer_mut(pointer)
            && slot.is_string()
        {
            *slot = Value::String(new_id.to_string());
        }
    }
}

fn classify_claude(value: Value, tracker: &mut ToolNameTracker) -> Result<Classified> {
    let record: ClaudeRecord = serde_json::from_value(value.clone())
        .map_err(|e| Error::Parse(format!("claude record: {e}")))?;

    let mut texts = Vec::new();
    let mut tool_name = None;
    let mut tool_calls = Vec::new();
    let mut kind = EventKind::Unknown;
    let mut is_sidechain = false;

    match record {
        ClaudeRecord::FileHistorySnapshot(_) => {
            kind = EventKind::Snapshot;
        }
        ClaudeRecord::User(user) => {
            is_sidechain = user.is_sidechain;
            // A "user" record can carry a tool_result block instead of (or
            // alongside) typed text; classify by content rather than the
            // outer record tag, matching spec §3's event-kind list.
            let mut saw_tool_result = false;
            for (i, block) in user.message.content.iter().enumerate() {
                match block {
                    UserContent::Text { text } => {
                        texts.push(TextField {
                            pointer: format!("/message/content/{i}/text"),
                            text: text.clone(),
                        });
                    }
                    UserContent::ToolResult {
                        tool_use_id, content, ..
                    } => {
                        saw_tool_result = true;
                        tool_name = tracker.lookup(tool_use_id);
                        if let Some(content) = content {
                            push_value_text(&mut texts, content, &format!("/message/content/{i}/content"));
                        }
                    }
                    UserContent::Image { .. } | UserContent::Unknown => {}
                }
            }
            kind = if saw_tool_result { EventKind::ToolResult } else { EventKind::User };
        }
        ClaudeRecord::Assistant(asst) => {
            is_sidechain = asst.is_sidechain;
            kind = EventKind::Assistant;
            for (i, block) in asst.message.content.iter().enumerate() {
                match block {
                    AssistantContent::Text { text, .. } => {
                        texts.push(TextField {
                            pointer: format!("/message/content/{i}/text"),
                            text: text.clone(),
                        });
                    }
                    AssistantContent::Thinking { .. } => {
                        // Reasoning content is protected; surfaced via a
                        // distinct kind only when it is the sole block.
                    }
                    AssistantContent::ToolUse { id, name, input, .. } => {
                        tracker.record(id.clone(), name.clone());
                        tool_calls.push((name.clone(), input.clone()));
                    }
                    AssistantContent::ToolResult { .. } | AssistantContent::Unknown => {}
                }
            }
            let all_thinking = asst
                .message
                .content
                .iter()
                .all(|b| matches!(b, AssistantContent::Thinking { .. }));
            if all_thinking && !asst.message.content.is_empty() {
                kind = EventKind::Reasoning;
            }
        }
        ClaudeRecord::Unknown => {}
    }

    Ok(Classified { kind, value, is_sidechain, tool_name, tool_calls, texts })
}

fn classify_codex(value: Value, tracker: &mut ToolNameTracker) -> Result<Classified> {
    let record: CodexRecord = serde_json::from_value(value.clone())
        .map_err(|e| Error::Parse(format!("codex record: {e}")))?;

    let mut texts = Vec::new();
    let mut tool_name = None;
    let mut tool_calls = Vec::new();
    let mut kind = EventKind::Unknown;

    match record {
        CodexRecord::SessionMeta(_) => kind = EventKind::SessionMeta,
        CodexRecord::TurnContext(_) => kind = EventKind::QueueOp,
        CodexRecord::ResponseItem(item) => {
            let (k, t, tn, tc) = classify_response_payload(&item.payload, "/payload", tracker);
            kind = k;
            texts = t;
            tool_name = tn;
            tool_calls = tc;
        }
        CodexRecord::EventMsg(msg) => match msg.payload {
            EventMsgPayload::UserMessage(m) => {
                kind = EventKind::User;
                texts.push(TextField { pointer: "/payload/message".into(), text: m.message });
            }
            EventMsgPayload::AgentMessage(m) => {
                kind = EventKind::Assistant;
                texts.push(TextField { pointer: "/payload/message".into(), text: m.message });
            }
            EventMsgPayload::AgentReasoning(r) => {
                kind = EventKind::Reasoning;
                texts.push(TextField { pointer: "/payload/text".into(), text: r.text });
            }
            EventMsgPayload::TokenCount(_) | EventMsgPayload::Unknown => {
                kind = EventKind::QueueOp;
            }
        },
        // Pre-wrapping dialect: same payload shapes, top-level pointers.
        CodexRecord::Message(m) => {
            kind = if m.role == "user" { EventKind::User } else { EventKind::Assistant };
            for (i, block) in m.content.iter().enumerate() {
                if let MessageContent::InputText { text } | MessageContent::OutputText { text } = block {
                    texts.push(TextField { pointer: format!("/content/{i}/text"), text: text.clone() });
                }
            }
        }
        CodexRecord::Reasoning(r) => {
            kind = EventKind::Reasoning;
            for (i, s) in r.summary.iter().enumerate() {
                if let crate::codex::schema::SummaryText::SummaryText { text } = s {
                    texts.push(TextField { pointer: format!("/summary/{i}/text"), text: text.clone() });
                }
            }
        }
        CodexRecord::FunctionCall(fc) => {
            kind = EventKind::ToolUse;
            tracker.record(fc.call_id.clone(), fc.name.clone());
            tool_calls.push((fc.name.clone(), parse_args(&fc.arguments)));
        }
        CodexRecord::FunctionCallOutput(out) => {
            kind = EventKind::ToolResult;
            tool_name = tracker.lookup(&out.call_id);
            texts.push(TextField { pointer: "/output".into(), text: out.output });
        }
        CodexRecord::Unknown => {}
    }

    Ok(Classified { kind, value, is_sidechain: false, tool_name, tool_calls, texts })
}

fn classify_response_payload(
    payload: &ResponseItemPayload,
    prefix: &str,
    tracker: &mut ToolNameTracker,
) -> (EventKind, Vec<TextField>, Option<String>, Vec<(String, Value)>) {
    let mut texts = Vec::new();
    match payload {
        ResponseItemPayload::Message(m) => {
            let kind = if m.role == "user" { EventKind::User } else { EventKind::Assistant };
            for (i, block) in m.content.iter().enumerate() {
                if let MessageContent::InputText { text } | MessageContent::OutputText { text } = block {
                    texts.push(TextField { pointer: format!("{prefix}/content/{i}/text"), text: text.clone() });
                }
            }
            (kind, texts, None, Vec::new())
        }
        ResponseItemPayload::Reasoning(r) => {
            for (i, s) in r.summary.iter().enumerate() {
                if let crate::codex::schema::SummaryText::SummaryText { text } = s {
                    texts.push(TextField { pointer: format!("{prefix}/summary/{i}/text"), text: text.clone() });
                }
            }
            (EventKind::Reasoning, texts, None, Vec::new())
        }
        ResponseItemPayload::FunctionCall(fc) => {
            tracker.record(fc.call_id.clone(), fc.name.clone());
            let calls = vec![(fc.name.clone(), parse_args(&fc.arguments))];
            (EventKind::ToolUse, texts, None, calls)
        }
        ResponseItemPayload::FunctionCallOutput(out) => {
            let name = tracker.lookup(&out.call_id);
            texts.push(TextField { pointer: format!("{prefix}/output"), text: out.output.clone() });
            (EventKind::ToolResult, texts, name, Vec::new())
        }
        ResponseItemPayload::CustomToolCall(c) => {
            tracker.record(c.call_id.clone(), c.name.clone());
            let calls = vec![(c.name.clone(), parse_args(&c.input))];
            (EventKind::ToolUse, texts, None, calls)
        }
        ResponseItemPayload::CustomToolCallOutput(out) => {
            let name = tracker.lookup(&out.call_id);
            texts.push(TextField { pointer: format!("{prefix}/output"), text: out.output.clone() });
            (EventKind::ToolResult, texts, name, Vec::new())
        }
        ResponseItemPayload::GhostSnapshot(_) => (EventKind::Snapshot, texts, None, Vec::new()),
        ResponseItemPayload::Unknown => (EventKind::Unknown, texts, None, Vec::new()),
    }
}

/// Codex encodes tool-call arguments as a JSON-in-a-string; fall back to
/// the raw string as a JSON value if it doesn't parse as one itself.
fn parse_args(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Codex `function_call_output`/`custom_tool_call_output` payloads store
/// `output` as a bare string in the modern schema, but some historical
/// writes wrap it as `{"content": "...", ...}`; tolerate both.
fn push_value_text(texts: &mut Vec<TextField>, value: &Value, pointer: &str) {
    match value {
        Value::String(s) => texts.push(TextField { pointer: pointer.to_string(), text: s.clone() }),
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                if let Some(text) = item.get("text").and_then(Value::as_str) {
                    texts.push(TextField { pointer: format!("{pointer}/{i}/text"), text: text.to_string() });
                }
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claude_user_text_classified_and_extracted() {
        let raw = r#"{"type":"user","uuid":"u1","parentUuid":null,"sessionId":"s1","timestamp":"t","isSidechain":false,"isMeta":false,"message":{"role":"user","content":"hello"}}"#;
        let mut tracker = ToolNameTracker::new();
        let c = classify_line(Agent::ClaudeCode, raw, &mut tracker).unwrap();
        assert_eq!(c.kind, EventKind::User);
        assert_eq!(c.texts.len(), 1);
        assert_eq!(c.texts[0].text, "hello");
    }

    #[test]
    fn claude_tool_result_correlates_name() {
        let mut tracker = ToolNameTracker::new();
        let asst = r#"{"type":"assistant","uuid":"a1","parentUuid":"u1","sessionId":"s1","timestamp":"t","isSidechain":false,"message":{"type":"message","id":"m1","role":"assistant","model":"x","content":[{"type":"tool_use","id":"call1","name":"Bash","input":{}}]}}"#;
        classify_line(Agent::ClaudeCode, asst, &mut tracker).unwrap();

        let result = r#"{"type":"user","uuid":"u2","parentUuid":"a1","sessionId":"s1","timestamp":"t","isSidechain":false,"isMeta":false,"message":{"role":"user","content":[{"type":"tool_result","tool_use_id":"call1","content":"output text"}]}}"#;
        let c = classify_line(Agent::ClaudeCode, result, &mut tracker).unwrap();
        assert_eq!(c.kind, EventKind::ToolResult);
        assert_eq!(c.tool_name.as_deref(), Some("Bash"));
    }

    #[test]
    fn session_id_pointer_rewrites_claude() {
        let mut value: Value = serde_json::from_str(
            r#"{"type":"user","sessionId":"old","message":{"role":"user","content":"hi"}}"#,
        )
        .unwrap();
        rewrite_session_id(Agent::ClaudeCode, &mut value, "new");
        assert_eq!(value["sessionId"], "new");
    }

    #[test]
    fn codex_function_call_output_correlates_name() {
        let mut tracker = ToolNameTracker::new();
        let call = r#"{"type":"response_item","timestamp":"t","payload":{"type":"function_call","name":"shell","arguments":"{}","call_id":"c1"}}"#;
        classify_line(Agent::Codex, call, &mut tracker).unwrap();

        let output = r#"{"type":"response_item","timestamp":"t","payload":{"type":"function_call_output","call_id":"c1","output":"done"}}"#;
        let c = classify_line(Agent::Codex, output, &mut tracker).unwrap();
        assert_eq!(c.kind, EventKind::ToolResult);
        assert_eq!(c.tool_name.as_deref(), Some("shell"));
        assert_eq!(c.texts[0].text, "done");
    }
}
