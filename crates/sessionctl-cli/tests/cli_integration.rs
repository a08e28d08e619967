use predicates::prelude::*;
use sessionctl_testing::process::sessionctl_cmd;
use sessionctl_testing::ClaudeFixture;
use tempfile::TempDir;

struct Homes {
    claude: TempDir,
    codex: TempDir,
    state: TempDir,
    cwd: TempDir,
}

impl Homes {
    fn new() -> Self {
        Self { claude: TempDir::new().unwrap(), codex: TempDir::new().unwrap(), state: TempDir::new().unwrap(), cwd: TempDir::new().unwrap() }
    }
}

#[test]
fn cli_version_reports_name() {
    let mut cmd = assert_cmd::Command::cargo_bin("sessionctl").unwrap();
    cmd.arg("--version").assert().success().stdout(predicate::str::contains("sessionctl"));
}

#[test]
fn cli_help_lists_core_subcommands() {
    let mut cmd = assert_cmd::Command::cargo_bin("sessionctl").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("find"))
        .stdout(predicate::str::contains("trim"))
        .stdout(predicate::str::contains("export"))
        .stdout(predicate::str::contains("search"));
}

#[test]
fn find_lists_a_fixture_session() {
    let homes = Homes::new();
    let (fixture, _path) = ClaudeFixture::write_simple(homes.claude.path(), homes.cwd.path().to_str().unwrap(), "what's broken in auth.rs", "looking into it");

    sessionctl_cmd(homes.claude.path(), homes.codex.path(), homes.state.path(), homes.cwd.path())
        .arg("find")
        .assert()
        .success()
        .stdout(predicate::str::contains(&fixture.session_id[..8]));
}

#[test]
fn find_with_no_sessions_reports_none_found() {
    let homes = Homes::new();
    sessionctl_cmd(homes.claude.path(), homes.codex.path(), homes.state.path(), homes.cwd.path())
        .arg("find")
        .assert()
        .success()
        .stdout(predicate::str::contains("no sessions found"));
}

#[test]
fn export_writes_a_file_under_exported_sessions() {
    let homes = Homes::new();
    ClaudeFixture::write_simple(homes.claude.path(), homes.cwd.path().to_str().unwrap(), "explain the retry logic", "it backs off exponentially");

    sessionctl_cmd(homes.claude.path(), homes.codex.path(), homes.state.path(), homes.cwd.path()).arg("export").assert().success();

    let export_dir = homes.cwd.path().join("exported-sessions").join("claude");
    let entries: Vec<_> = std::fs::read_dir(&export_dir).unwrap().collect();
    assert_eq!(entries.len(), 1);
}

#[test]
fn index_then_search_finds_the_indexed_session() {
    let homes = Homes::new();
    ClaudeFixture::write_simple(homes.claude.path(), homes.cwd.path().to_str().unwrap(), "let's discuss the rollout plan for Q3", "sounds good");

    sessionctl_cmd(homes.claude.path(), homes.codex.path(), homes.state.path(), homes.cwd.path()).arg("index").assert().success();

    sessionctl_cmd(homes.claude.path(), homes.codex.path(), homes.state.path(), homes.cwd.path())
        .arg("search")
        .arg("rollout")
        .assert()
        .success()
        .stdout(predicate::str::contains("rollout"));
}

#[test]
fn delete_without_yes_is_refused() {
    let homes = Homes::new();
    let (fixture, _path) = ClaudeFixture::write_simple(homes.claude.path(), homes.cwd.path().to_str().unwrap(), "hi", "hello");

    sessionctl_cmd(homes.claude.path(), homes.codex.path(), homes.state.path(), homes.cwd.path())
        .arg("delete")
        .arg(&fixture.session_id)
        .assert()
        .failure();
}
