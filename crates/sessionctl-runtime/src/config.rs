//! Persistent per-user configuration. Recognized options per the ambient
//! configuration section: model overrides for the analysis pipeline and
//! the continuation orchestrator, provider toggles, and an index location
//! override. Loading is tolerant, matching the store adapter's stance that
//! a single bad file should never block the whole process from starting.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderToggles {
    pub claude_code: bool,
    pub codex: bool,
}

impl Default for ProviderToggles {
    fn default() -> Self {
        Self { claude_code: true, codex: true }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub schema_version: u32,
    /// Model used by SDK-mode analysis workers.
    pub subagent_model: Option<String>,
    /// Small/cheap model for the continuation orchestrator's summarization
    /// step; distinct from the model that ends up attached interactively.
    pub rollover_analysis_model: Option<String>,
    /// Model requested for the freshly spawned session; `None` defers to
    /// the agent CLI's own default.
    pub rollover_default_model: Option<String>,
    pub providers: ProviderToggles,
    /// Overrides the default `<state_dir>/index` location.
    pub index_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_version: CONFIG_SCHEMA_VERSION,
            subagent_model: None,
            rollover_analysis_model: None,
            rollover_default_model: None,
            providers: ProviderToggles::default(),
            index_dir: None,
        }
    }
}

impl Config {
    /// A missing file yields defaults. A malformed file also yields
    /// defaults — the parse error is logged, not surfaced — so a corrupt
    /// config never blocks process start.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                tracing::warn!(path = %path.display(), error = %err, "ignoring malformed config, using defaults");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let rendered = serde_json::to_string_pretty(self).expect("Config always serializes");
        std::fs::write(path, rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load(&dir.path().join("config.json"));
        assert_eq!(cfg.schema_version, CONFIG_SCHEMA_VERSION);
        assert!(cfg.providers.claude_code);
    }

    #[test]
    fn malformed_file_yields_defaults_not_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();
        let cfg = Config::load(&path);
        assert_eq!(cfg.schema_version, CONFIG_SCHEMA_VERSION);
    }

    #[test]
    fn round_trips_through_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut cfg = Config::default();
        cfg.subagent_model = Some("claude-haiku".to_string());
        cfg.save(&path).unwrap();

        let reloaded = Config::load(&path);
        assert_eq!(reloaded.subagent_model.as_deref(), Some("claude-haiku"));
    }
}
