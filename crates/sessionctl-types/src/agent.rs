use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which coding agent produced a session log.
///
/// The two dialects diverge in home directory, file naming, and JSONL event
/// shape; see `sessionctl-providers` for the per-agent adapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Agent {
    ClaudeCode,
    Codex,
}

impl Agent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Agent::ClaudeCode => "claude-code",
            Agent::Codex => "codex",
        }
    }

    /// Short form used in CLI subcommand names (`find-claude`, `find-codex`).
    pub fn short_name(&self) -> &'static str {
        match self {
            Agent::ClaudeCode => "claude",
            Agent::Codex => "codex",
        }
    }

    pub fn all() -> [Agent; 2] {
        [Agent::ClaudeCode, Agent::Codex]
    }
}

impl fmt::Display for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Agent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "claude-code" | "claude" => Ok(Agent::ClaudeCode),
            "codex" => Ok(Agent::Codex),
            other => Err(format!("unknown agent: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_str() {
        for agent in Agent::all() {
            assert_eq!(agent.as_str().parse::<Agent>().unwrap(), agent);
        }
    }

    #[test]
    fn short_aliases_resolve() {
        assert_eq!("claude".parse::<Agent>().unwrap(), Agent::ClaudeCode);
        assert_eq!("codex".parse::<Agent>().unwrap(), Agent::Codex);
    }
}
