use crate::path::expand_tilde;
use sessionctl_types::Agent;
use std::path::{Path, PathBuf};

/// Resolves the on-disk root an agent stores its session logs under.
///
/// The two agents disagree on whether an environment variable can override
/// the default: Claude Code honors `CLAUDE_CONFIG_DIR`, Codex does not honor
/// any equivalent and always uses `~/.codex`. That asymmetry is observed
/// behavior of the two CLIs, not an oversight, so it is preserved here rather
/// than unified.
pub fn home_dir(agent: Agent, explicit: Option<&Path>) -> PathBuf {
    if let Some(dir) = explicit {
        return expand_tilde(&dir.to_string_lossy());
    }

    match agent {
        Agent::ClaudeCode => {
            if let Ok(env_dir) = std::env::var("CLAUDE_CONFIG_DIR") {
                return expand_tilde(&env_dir);
            }
            default_home().join(".claude")
        }
        Agent::Codex => default_home().join(".codex"),
    }
}

/// Directory directly containing (or, for Codex, rooting a year/month/day
/// tree of) JSONL session logs.
pub fn sessions_root(agent: Agent, explicit_home: Option<&Path>) -> PathBuf {
    let home = home_dir(agent, explicit_home);
    match agent {
        Agent::ClaudeCode => home.join("projects"),
        Agent::Codex => home.join("sessions"),
    }
}

fn default_home() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Claude Code encodes a project's working directory into its project
/// directory name by replacing path separators and dots with `-`.
pub fn encode_claude_project_dir(cwd: &Path) -> String {
    cwd.to_string_lossy()
        .replace(['/', '.'], "-")
        .trim_start_matches('-')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claude_config_dir_env_overrides_default() {
        // SAFETY: test-local env mutation, not shared across threads in this crate's test binary.
        unsafe {
            std::env::set_var("CLAUDE_CONFIG_DIR", "/tmp/claude-test-home");
        }
        let dir = home_dir(Agent::ClaudeCode, None);
        unsafe {
            std::env::remove_var("CLAUDE_CONFIG_DIR");
        }
        assert_eq!(dir, PathBuf::from("/tmp/claude-test-home"));
    }

    #[test]
    fn codex_ignores_claude_env_var() {
        unsafe {
            std::env::set_var("CLAUDE_CONFIG_DIR", "/tmp/claude-test-home");
        }
        let dir = home_dir(Agent::Codex, None);
        unsafe {
            std::env::remove_var("CLAUDE_CONFIG_DIR");
        }
        assert!(dir.ends_with(".codex"));
    }

    #[test]
    fn encode_claude_project_dir_replaces_separators() {
        assert_eq!(
            encode_claude_project_dir(Path::new("/Users/foo/bar.baz")),
            "Users-foo-bar-baz"
        );
    }
}
