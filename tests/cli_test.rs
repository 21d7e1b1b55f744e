/// CLI integration tests using assert_cmd
mod common;

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

use common::realistic_projects_dir;

fn ccsearch() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_ccsearch"));
    cmd.env_remove("CCSEARCH_PROJECTS_DIR").env_remove("RUST_LOG");
    cmd
}

fn ccsearch_in(root: &Path) -> Command {
    let mut cmd = ccsearch();
    cmd.arg("--projects-dir").arg(root);
    cmd
}

#[test]
fn test_cli_no_command_prints_hint() {
    ccsearch().assert().success().stdout(predicate::str::contains("Use --help for usage information"));
}

#[test]
fn test_cli_help() {
    ccsearch()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Browse, search, tag and export"))
        .stdout(predicate::str::contains("search"))
        .stdout(predicate::str::contains("export"));
}

#[test]
fn test_cli_version() {
    ccsearch().arg("--version").assert().success().stdout(predicate::str::contains("ccsearch"));
}

#[test]
fn test_cli_invalid_command() {
    ccsearch().arg("invalid-command").assert().failure().stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn test_cli_projects() {
    let root = realistic_projects_dir();
    ccsearch_in(root.path())
        .arg("projects")
        .assert()
        .success()
        .stdout(predicate::str::contains("api"))
        .stdout(predicate::str::contains("/Users/alice/github.com/acme/api"))
        .stdout(predicate::str::contains("notes"));
}

#[test]
fn test_cli_projects_empty_root() {
    let root = TempDir::new().unwrap();
    ccsearch_in(root.path()).arg("projects").assert().success().stdout(predicate::str::contains("No projects found"));
}

#[test]
fn test_cli_env_var_sets_root() {
    let root = realistic_projects_dir();
    ccsearch()
        .env("CCSEARCH_PROJECTS_DIR", root.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Bread recipes"));
}

#[test]
fn test_cli_list_sorted_and_limited() {
    let root = realistic_projects_dir();
    let output = ccsearch_in(root.path()).args(["list", "-n", "2"]).output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Bread recipes"));
    assert!(stdout.contains("Help me deploy the service to staging"));
    assert!(!stdout.contains("Why does the login page fail?"), "Oldest session is cut by the limit");
    assert!(stdout.find("Bread recipes") < stdout.find("Help me deploy"));
}

#[test]
fn test_cli_list_with_filter() {
    let root = realistic_projects_dir();
    ccsearch_in(root.path())
        .args(["list", "--filter", "tag:work"])
        .assert()
        .success()
        .stdout(predicate::str::contains("login-bug"))
        .stdout(predicate::str::contains("deploy").not());
}

#[test]
fn test_cli_list_invalid_filter() {
    let root = realistic_projects_dir();
    ccsearch_in(root.path())
        .args(["list", "--filter", "color:blue"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown field"));
}

#[test]
fn test_cli_list_json() {
    let root = realistic_projects_dir();
    let output = ccsearch_in(root.path()).args(["list", "--json", "--project", "notes"]).output().unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let sessions = value.as_array().unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0]["id"], "recipes");
}

#[test]
fn test_cli_search() {
    let root = realistic_projects_dir();
    let output = ccsearch_in(root.path()).args(["search", "login"]).output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("[7] Why does the login page fail?"));
    assert!(stdout.contains("[1] Help me deploy"));
    assert!(stdout.find("[7]") < stdout.find("[1]"));
}

#[test]
fn test_cli_search_no_results() {
    let root = realistic_projects_dir();
    ccsearch_in(root.path())
        .args(["search", "kubernetes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No sessions match 'kubernetes'"));
}

#[test]
fn test_cli_search_requires_query() {
    ccsearch().arg("search").assert().failure();
}

#[test]
fn test_cli_show_by_prefix() {
    let root = realistic_projects_dir();
    ccsearch_in(root.path())
        .args(["show", "rec"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ID:       recipes"))
        .stdout(predicate::str::contains("How long should dough rise?"))
        .stdout(predicate::str::contains("About two hours."));
}

#[test]
fn test_cli_show_unknown_id() {
    let root = realistic_projects_dir();
    ccsearch_in(root.path())
        .args(["show", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No session matches id 'nope'"));
}

#[test]
fn test_cli_summary() {
    let root = realistic_projects_dir();
    ccsearch_in(root.path())
        .args(["summary", "login-bug"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Messages: 2 (User: 1, Assistant: 1)"))
        .stdout(predicate::str::contains("questions: 1"));
}

#[test]
fn test_cli_export_json_to_stdout() {
    let root = realistic_projects_dir();
    let output = ccsearch_in(root.path()).args(["export", "--ids", "deploy,recipes"]).output().unwrap();
    assert!(output.status.success());

    let bundle: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(bundle["version"], "1.0");
    assert_eq!(bundle["sessionCount"], 2);
}

#[test]
fn test_cli_export_csv_and_markdown() {
    let root = realistic_projects_dir();
    ccsearch_in(root.path())
        .args(["export", "--format", "csv", "--project", "notes"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("id,title,project,created_at,updated_at,message_count,tags"))
        .stdout(predicate::str::contains("recipes,Bread recipes"));

    ccsearch_in(root.path())
        .args(["export", "--format", "markdown", "--last", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("# Claude Sessions Export"))
        .stdout(predicate::str::contains("## Bread recipes"));
}

#[test]
fn test_cli_export_then_import() {
    let root = realistic_projects_dir();
    let out_dir = TempDir::new().unwrap();
    let bundle = out_dir.path().join("bundle.json");

    ccsearch_in(root.path())
        .args(["export", "--output"])
        .arg(&bundle)
        .assert()
        .success()
        .stderr(predicate::str::contains("Exported 3 sessions"));

    ccsearch()
        .arg("import")
        .arg(&bundle)
        .args(["--query", "dough"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Successfully imported 3 of 3 sessions"))
        .stdout(predicate::str::contains("recipes"));
}

#[test]
fn test_cli_import_invalid_file() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("broken.json");
    fs::write(&file, "not json").unwrap();

    ccsearch().arg("import").arg(&file).assert().failure().stderr(predicate::str::contains("Invalid JSON format"));
}

#[test]
fn test_cli_tag_and_title_roundtrip() {
    let root = realistic_projects_dir();

    ccsearch_in(root.path())
        .args(["tag", "deploy", "ops,release"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Tagged deploy: ops, release"));

    ccsearch_in(root.path())
        .args(["title", "deploy", "Staging", "rollout"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated title of deploy"));

    ccsearch_in(root.path())
        .args(["list", "--filter", "tag:release"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Staging rollout"));

    ccsearch_in(root.path())
        .args(["tag", "deploy"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleared tags on deploy"));
}

#[test]
fn test_cli_delete_requires_confirmation() {
    let root = realistic_projects_dir();
    let file = root.path().join("-Users-alice-notes").join("recipes.jsonl");

    ccsearch_in(root.path())
        .args(["delete", "recipes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("without --yes"));
    assert!(file.exists());

    ccsearch_in(root.path())
        .args(["delete", "recipes", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted recipes (Bread recipes)"));
    assert!(!file.exists());
}

#[test]
fn test_cli_stats() {
    let root = realistic_projects_dir();
    ccsearch_in(root.path())
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Session Statistics"))
        .stdout(predicate::str::contains("Projects: 2"))
        .stdout(predicate::str::contains("Sessions: 3"))
        .stdout(predicate::str::contains("Messages: 6"))
        .stdout(predicate::str::contains("Oldest session: 2024-01-10 09:00:00"));
}

#[test]
fn test_cli_verbose_logs_to_stderr_only() {
    let root = realistic_projects_dir();
    let output = ccsearch_in(root.path()).args(["--verbose", "list", "--json"]).output().unwrap();
    assert!(output.status.success());
    assert!(serde_json::from_slice::<serde_json::Value>(&output.stdout).is_ok(), "stdout stays valid JSON");
}
