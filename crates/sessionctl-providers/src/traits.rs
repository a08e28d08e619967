use crate::Result;
use sessionctl_types::Agent;
use std::path::{Path, PathBuf};

/// Cheap-to-extract identity fields for a session file, recovered from its
/// first ~200 lines without reconstructing the full conversation.
#[derive(Debug, Clone)]
pub struct SessionHeader {
    pub session_id: String,
    pub file_path: PathBuf,
    pub cwd: Option<String>,
    pub git_branch: Option<String>,
    pub timestamp: Option<String>,
    pub snippet: Option<String>,
    pub is_sidechain: bool,
}

/// Per-agent discovery: finding session files on disk and reading just
/// enough of them to register with the index.
pub trait LogDiscovery: Send + Sync {
    fn agent(&self) -> Agent;

    /// Cheap structural check: does this path look like one of this
    /// agent's session files?
    fn probe(&self, path: &Path) -> bool;

    /// Walk a store root and return one `SessionHeader` per session found.
    fn scan(&self, root: &Path) -> Result<Vec<SessionHeader>>;

    /// Lightweight session-id read, for matching a path to an id without a
    /// full scan.
    fn extract_session_id(&self, path: &Path) -> Result<Option<String>>;

    /// All files that make up a session (main file plus any sidechains).
    fn find_session_files(&self, root: &Path, session_id: &str) -> Result<Vec<PathBuf>>;
}

pub fn discovery_for(agent: Agent) -> Box<dyn LogDiscovery> {
    match agent {
        Agent::ClaudeCode => Box::new(crate::claude::ClaudeDiscovery),
        Agent::Codex => Box::new(crate::codex::CodexDiscovery),
    }
}
