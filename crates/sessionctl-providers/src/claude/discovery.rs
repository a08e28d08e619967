use crate::traits::{LogDiscovery, SessionHeader};
use crate::Result;
use sessionctl_types::Agent;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::io::extract_claude_header;

pub struct ClaudeDiscovery;

impl LogDiscovery for ClaudeDiscovery {
    fn agent(&self) -> Agent {
        Agent::ClaudeCode
    }

    fn probe(&self, path: &Path) -> bool {
        if !path.is_file() || path.extension().is_none_or(|e| e != "jsonl") {
            return false;
        }
        std::fs::metadata(path).map(|m| m.len() > 0).unwrap_or(false)
    }

    /// Walks `<store>/projects/<encoded-cwd>/*.jsonl`. Depth 2 covers the
    /// project-directory layer plus its session files; sidechain files (the
    /// subagent transcripts Claude Code writes alongside a main session)
    /// live next to the main file and are folded into one `SessionHeader`
    /// per `session_id`, keeping the main (non-sidechain) file as the
    /// canonical path.
    fn scan(&self, root: &Path) -> Result<Vec<SessionHeader>> {
        let mut sessions: HashMap<String, SessionHeader> = HashMap::new();

        if !root.exists() {
            return Ok(Vec::new());
        }

        for entry in WalkDir::new(root).max_depth(2).into_iter().filter_map(|e| e.ok()) {
            let path = entry.path();
            if !self.probe(path) {
                continue;
            }
            let Ok(header) = extract_claude_header(path) else {
                continue;
            };
            let Some(session_id) = header.session_id.clone() else {
                continue;
            };

            let entry = sessions.entry(session_id.clone()).or_insert_with(|| SessionHeader {
                session_id: session_id.clone(),
                file_path: path.to_path_buf(),
                cwd: header.cwd.clone(),
                git_branch: header.git_branch.clone(),
                timestamp: header.timestamp.clone(),
                snippet: header.snippet.clone(),
                is_sidechain: header.is_sidechain,
            });

            if !header.is_sidechain {
                entry.file_path = path.to_path_buf();
                entry.is_sidechain = false;
                entry.cwd = header.cwd.clone().or(entry.cwd.take());
                entry.git_branch = header.git_branch.clone().or(entry.git_branch.take());
                entry.snippet = header.snippet.clone().or(entry.snippet.take());
            }
        }

        Ok(sessions.into_values().collect())
    }

    fn extract_session_id(&self, path: &Path) -> Result<Option<String>> {
        Ok(extract_claude_header(path)?.session_id)
    }

    fn find_session_files(&self, root: &Path, session_id: &str) -> Result<Vec<PathBuf>> {
        let mut matches = Vec::new();
        for entry in WalkDir::new(root).max_depth(3).into_iter().filter_map(|e| e.ok()) {
            let path = entry.path();
            if !self.probe(path) {
                continue;
            }
            if let Ok(header) = extract_claude_header(path)
                && header.session_id.as_deref() == Some(session_id)
            {
                matches.push(path.to_path_buf());
            }
        }
        Ok(matches)
    }
}
