//! Helpers for `assert_cmd`-driven CLI integration tests: building a
//! `sessionctl` command wired to a fixture home directory instead of the
//! real one.

use assert_cmd::Command;
use std::path::Path;

/// A `sessionctl` invocation pointed at fixture homes via the CLI's
/// explicit `--claude-home`/`--codex-home`/`--state-dir` overrides, so
/// integration tests never touch the real user's session store. Codex
/// has no environment-variable override to hijack (by design, see
/// `sessionctl_core::store::home_dir`), so these must be flags rather
/// than env vars.
pub fn sessionctl_cmd(claude_home: &Path, codex_home: &Path, state_dir: &Path, cwd: &Path) -> Command {
    let mut cmd = Command::cargo_bin("sessionctl").expect("sessionctl binary builds");
    cmd.arg("--claude-home")
        .arg(claude_home)
        .arg("--codex-home")
        .arg(codex_home)
        .arg("--state-dir")
        .arg(state_dir)
        .current_dir(cwd);
    cmd
}
