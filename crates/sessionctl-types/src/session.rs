use crate::{Agent, Derivation};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A single session's identity and lineage, as tracked by the index.
///
/// This mirrors what a cheap header read (first/last few lines of the log
/// file) can recover without reconstructing the full conversation: enough to
/// list, sort, and disambiguate sessions, and to walk derivation chains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: String,
    pub agent: Agent,
    pub file_path: PathBuf,
    pub cwd: Option<String>,
    pub git_branch: Option<String>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    pub line_count: usize,
    /// spec §3 `first_user_message_preview`.
    pub first_user_message_preview: Option<String>,
    /// spec §3 `last_user_message_preview`.
    pub last_user_message_preview: Option<String>,
    pub derivation: Derivation,
    pub is_sidechain: bool,
    /// Count of user/assistant/tool-result events, used to drive I3: a
    /// session with none of these (only snapshot/metadata kinds) is
    /// malformed regardless of its raw line count.
    pub conversational_event_count: usize,
}

impl SessionRecord {
    pub fn parent_file(&self) -> Option<&str> {
        self.derivation.parent_file()
    }

    pub fn parent_session_id(&self) -> Option<&str> {
        self.derivation.parent_session_id()
    }

    pub fn is_derived(&self) -> bool {
        self.derivation.is_derived()
    }

    /// One-line summary for listings: the first user message, falling back
    /// to the last if the conversation never got a distinct opener.
    pub fn headline(&self) -> Option<&str> {
        self.first_user_message_preview
            .as_deref()
            .or(self.last_user_message_preview.as_deref())
    }

    /// A session is valid/resumable iff it has conversational content (I3):
    /// a file containing only snapshot/metadata-kind events is malformed
    /// even if it has lines.
    pub fn is_malformed(&self) -> bool {
        self.conversational_event_count == 0
    }
}

/// Sort order for session listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionOrder {
    RecentlyModified,
    RecentlyCreated,
}

/// Query parameters shared by `find` and its `find-<agent>` variants (spec
/// §4.1 `discover(filter)`).
#[derive(Debug, Clone)]
pub struct SessionFilter {
    pub agent: Option<Agent>,
    /// Restrict to sessions created under this cwd ("project-scope"); `None`
    /// means global scope.
    pub cwd: Option<PathBuf>,
    /// Strict "original only" shortcut (spec §4.1): equivalent to
    /// `include_trimmed = include_continued = false`.
    pub only_original: bool,
    pub only_derived: bool,
    pub include_trimmed: bool,
    pub include_continued: bool,
    /// Sidechains are excluded from user-facing listings by default (I4).
    pub include_sidechain: bool,
    /// Case-folded substrings ANDed over the raw file text.
    pub keywords: Vec<String>,
    pub modified_after: Option<DateTime<Utc>>,
    pub modified_before: Option<DateTime<Utc>>,
    pub min_line_count: Option<usize>,
    pub limit: Option<usize>,
    pub order: Option<SessionOrder>,
}

impl Default for SessionFilter {
    fn default() -> Self {
        Self {
            agent: None,
            cwd: None,
            only_original: false,
            only_derived: false,
            include_trimmed: true,
            include_continued: true,
            include_sidechain: false,
            keywords: Vec::new(),
            modified_after: None,
            modified_before: None,
            min_line_count: None,
            limit: None,
            order: None,
        }
    }
}
