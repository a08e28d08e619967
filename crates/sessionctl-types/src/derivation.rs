use serde::{Deserialize, Serialize};

/// Policy for which assistant messages a deterministic trim pass replaces.
/// Every variant also carries `tool_names`: the set of tool-result events
/// eligible for trimming, by tool name; an empty set means "all tools".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum TrimParams {
    /// Only shrink oversized tool results; leave assistant text untouched.
    ToolResultsOnly {
        char_threshold: usize,
        #[serde(default)]
        tool_names: Vec<String>,
    },
    /// Also replace the first `count` assistant messages.
    TrimFirstAssistant {
        char_threshold: usize,
        count: usize,
        #[serde(default)]
        tool_names: Vec<String>,
    },
    /// Also replace every assistant message except the last `keep` ones.
    TrimAllExceptLast {
        char_threshold: usize,
        keep: usize,
        #[serde(default)]
        tool_names: Vec<String>,
    },
}

impl TrimParams {
    pub fn char_threshold(&self) -> usize {
        match self {
            TrimParams::ToolResultsOnly { char_threshold, .. }
            | TrimParams::TrimFirstAssistant { char_threshold, .. }
            | TrimParams::TrimAllExceptLast { char_threshold, .. } => *char_threshold,
        }
    }

    /// Tool names eligible for trimming; empty means "all tools" (spec §4.3.1).
    pub fn tool_names(&self) -> &[String] {
        match self {
            TrimParams::ToolResultsOnly { tool_names, .. }
            | TrimParams::TrimFirstAssistant { tool_names, .. }
            | TrimParams::TrimAllExceptLast { tool_names, .. } => tool_names,
        }
    }
}

/// Recorded in the first line of a derived session file when it was produced
/// by the deterministic trim operation (or, with `trim_params: None` and
/// every count at zero, by clone — spec §4.3.4 is "trim with no trims
/// applied").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrimMetadata {
    pub parent_file: String,
    pub trimmed_at: String,
    pub trim_params: Option<TrimParams>,
    pub tools_trimmed: usize,
    pub assistant_messages_trimmed: usize,
    pub bytes_removed: i64,
    pub estimated_tokens_saved: i64,
}

/// Recorded in the first line of a fresh session file spawned by the
/// continuation orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContinueMetadata {
    pub parent_session_id: String,
    pub parent_session_file: String,
    pub continued_at: String,
}

/// How a session file relates to an ancestor, if at all.
///
/// `continue_metadata` is checked before `trim_metadata` when both could in
/// principle appear; in practice the two are mutually exclusive because a
/// continuation starts a brand-new log owned by the agent CLI, not a copy of
/// the parent's lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Derivation {
    Original,
    Trimmed(TrimMetadata),
    Continued(ContinueMetadata),
}

impl Derivation {
    pub fn is_derived(&self) -> bool {
        !matches!(self, Derivation::Original)
    }

    pub fn parent_session_id(&self) -> Option<&str> {
        match self {
            Derivation::Original => None,
            Derivation::Trimmed(_) => None,
            Derivation::Continued(meta) => Some(&meta.parent_session_id),
        }
    }

    pub fn parent_file(&self) -> Option<&str> {
        match self {
            Derivation::Original => None,
            Derivation::Trimmed(meta) => Some(&meta.parent_file),
            Derivation::Continued(meta) => Some(&meta.parent_session_file),
        }
    }
}
