//! Assertions shared across integration tests: structural checks on a
//! session file that don't belong to any one crate's own unit tests.

use sessionctl_providers::{classify_line, rewrite_session_id, session_id_pointers, ToolNameTracker};
use sessionctl_types::Agent;
use std::path::Path;

/// Every line parses as JSON and, where a session-id pointer exists,
/// carries the same id (identity invariant I2).
pub fn assert_session_identity_consistent(path: &Path, agent: Agent, expected_session_id: &str) {
    let raw = std::fs::read_to_string(path).expect("session file readable");
    let pointers = session_id_pointers(agent);

    for (line_number, line) in raw.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut value: serde_json::Value = serde_json::from_str(line).unwrap_or_else(|err| panic!("line {line_number} is not valid JSON: {err}"));
        for pointer in &pointers {
            if let Some(found) = value.pointer(pointer) {
                assert_eq!(
                    found.as_str(),
                    Some(expected_session_id),
                    "line {line_number} session id at {pointer} does not match filename stem"
                );
            }
        }
        // rewriting to the same id must be a no-op; this doubles as a
        // sanity check that the pointer paths actually resolve.
        rewrite_session_id(agent, &mut value, expected_session_id);
    }
}

/// Counts conversational events (user/assistant turns), mirroring the
/// same classification the store adapter and helper-session check use.
pub fn count_conversational_events(path: &Path, agent: Agent) -> usize {
    let raw = std::fs::read_to_string(path).unwrap_or_default();
    let mut tracker = ToolNameTracker::new();
    raw.lines()
        .filter(|l| !l.trim().is_empty())
        .filter_map(|l| classify_line(agent, l.trim(), &mut tracker).ok())
        .filter(|c| c.kind.is_conversational())
        .count()
}
