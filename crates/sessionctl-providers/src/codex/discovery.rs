use crate::traits::{LogDiscovery, SessionHeader};
use crate::Result;
use sessionctl_types::Agent;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::io::{extract_codex_header, is_empty_codex_session};

pub struct CodexDiscovery;

impl LogDiscovery for CodexDiscovery {
    fn agent(&self) -> Agent {
        Agent::Codex
    }

    fn probe(&self, path: &Path) -> bool {
        if !path.is_file() {
            return false;
        }
        let is_jsonl = path.extension().is_some_and(|e| e == "jsonl");
        let filename = path.file_name().and_then(|f| f.to_str()).unwrap_or("");
        is_jsonl && filename.starts_with("rollout-") && !is_empty_codex_session(path)
    }

    /// Codex nests sessions under `<store>/sessions/<yyyy>/<mm>/<dd>/`, so
    /// there is no depth bound on the walk (unlike Claude's flatter
    /// project-dir layout).
    fn scan(&self, root: &Path) -> Result<Vec<SessionHeader>> {
        let mut sessions: HashMap<String, SessionHeader> = HashMap::new();

        if !root.exists() {
            return Ok(Vec::new());
        }

        for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
            let path = entry.path();
            if !self.probe(path) {
                continue;
            }
            let Ok(header) = extract_codex_header(path) else {
                continue;
            };
            let Some(session_id) = header.session_id.clone() else {
                continue;
            };

            sessions.entry(session_id.clone()).or_insert_with(|| SessionHeader {
                session_id,
                file_path: path.to_path_buf(),
                cwd: header.cwd.clone(),
                git_branch: header.git_branch.clone(),
                timestamp: header.timestamp.clone(),
                snippet: header.snippet.clone(),
                is_sidechain: false,
            });
        }

        Ok(sessions.into_values().collect())
    }

    fn extract_session_id(&self, path: &Path) -> Result<Option<String>> {
        Ok(extract_codex_header(path)?.session_id)
    }

    fn find_session_files(&self, root: &Path, session_id: &str) -> Result<Vec<PathBuf>> {
        let mut matches = Vec::new();
        for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
            let path = entry.path();
            if !self.probe(path) {
                continue;
            }
            if let Ok(header) = extract_codex_header(path)
                && header.session_id.as_deref() == Some(session_id)
            {
                matches.push(path.to_path_buf());
            }
        }
        Ok(matches)
    }
}
