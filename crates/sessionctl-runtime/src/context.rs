//! Process-wide context, constructed once at the CLI entry point and
//! threaded explicitly into every operation below — no process-wide
//! globals, mirroring `StoreContext`'s own stance in `sessionctl-engine`.

use crate::config::Config;
use sessionctl_engine::StoreContext;
use sessionctl_types::Agent;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct RuntimeContext {
    pub store: StoreContext,
    pub config: Config,
    pub state_dir: PathBuf,
}

impl RuntimeContext {
    pub fn new(cwd: PathBuf, state_dir: PathBuf) -> Self {
        let config = Config::load(&state_dir.join("config.json"));
        Self { store: StoreContext::new(cwd), config, state_dir }
    }

    /// `~/.sessionctl`, the default persistent state root, holding the
    /// config file, the search index, and its incrementality sidecar.
    pub fn default_state_dir() -> PathBuf {
        dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".sessionctl")
    }

    pub fn config_path(&self) -> PathBuf {
        self.state_dir.join("config.json")
    }

    pub fn index_dir(&self) -> PathBuf {
        self.config.index_dir.clone().unwrap_or_else(|| self.state_dir.join("index"))
    }

    pub fn index_db_path(&self) -> PathBuf {
        self.index_dir().join("sessions.sqlite3")
    }

    pub fn index_state_path(&self) -> PathBuf {
        self.index_dir().join("state.json")
    }

    /// Destination root for a given cwd's exports of one agent's sessions:
    /// `<cwd>/exported-sessions/<agent>/`.
    pub fn export_dir_for(cwd: &Path, agent: Agent) -> PathBuf {
        cwd.join("exported-sessions").join(agent.short_name())
    }
}
