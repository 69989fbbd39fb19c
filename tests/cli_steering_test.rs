//! Integration tests for `tlr steering merge` and `tlr steering validate`.

mod common;

use common::TestEnv;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;

/// Parse JSON output from a command.
fn parse_json(output: &[u8]) -> Value {
    serde_json::from_slice(output).expect("Failed to parse JSON output")
}

fn steering_dir(env: &TestEnv) -> std::path::PathBuf {
    let dir = env.work().join("steering");
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn test_merge_highest_rank_wins() {
    let env = TestEnv::new();
    let dir = steering_dir(&env);
    fs::write(dir.join("base.md"), "## Code Style\n\n4 spaces\n").unwrap();
    fs::write(dir.join("tech.md"), "## Code Style\n\n2 spaces\n").unwrap();
    fs::write(dir.join("project.md"), "## Code Style\n\ntabs\n").unwrap();

    let output = env
        .tlr()
        .args(["steering", "merge", "--agent", "dev"])
        .arg("--dir")
        .arg(&dir)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json = parse_json(&output);
    assert_eq!(json["state"], "resolved");
    assert_eq!(json["effective"]["code-style"]["value"], "tabs");
    assert_eq!(json["effective"]["code-style"]["winning_source"], "project.md");
    assert_eq!(json["conflicts"].as_array().unwrap().len(), 0);
}

#[test]
fn test_merge_same_rank_conflict_is_reported() {
    let env = TestEnv::new();
    let dir = steering_dir(&env);
    fs::write(dir.join("aaa.md"), "## Code Style\n\ntabs\n").unwrap();
    fs::write(dir.join("bbb.md"), "## Code Style\n\n2 spaces\n").unwrap();

    let output = env
        .tlr()
        .args(["steering", "merge", "--agent", "dev"])
        .arg("--dir")
        .arg(&dir)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json = parse_json(&output);
    assert_eq!(json["state"], "conflict-detected");
    let conflicts = json["conflicts"].as_array().unwrap();
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0]["section_key"], "code-style");
    assert_eq!(conflicts[0]["severity"], "high");
    assert!(json["guidance"].as_str().unwrap().contains("Action required"));
}

#[test]
fn test_merge_agent_specific_document_outranks_project() {
    let env = TestEnv::new();
    let dir = steering_dir(&env);
    fs::write(dir.join("project.md"), "## Naming\n\nsnake\n").unwrap();
    fs::write(dir.join("agent-dev.md"), "## Naming\n\nkebab\n").unwrap();

    let output = env
        .tlr()
        .args(["steering", "merge", "--agent", "dev"])
        .arg("--dir")
        .arg(&dir)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json = parse_json(&output);
    assert_eq!(json["effective"]["naming"]["winning_source"], "agent-dev.md");
}

#[test]
fn test_merge_excludes_invalid_document() {
    let env = TestEnv::new();
    let dir = steering_dir(&env);
    fs::write(dir.join("base.md"), "## Code Style\n\n4 spaces\n").unwrap();
    fs::write(
        dir.join("odd.md"),
        "---\ninclusion: sometimes\n---\n## Code Style\n\ntabs\n",
    )
    .unwrap();

    let output = env
        .tlr()
        .args(["steering", "merge", "--agent", "dev"])
        .arg("--dir")
        .arg(&dir)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json = parse_json(&output);
    assert_eq!(json["invalid_documents"][0], "odd.md");
    assert_eq!(json["effective"]["code-style"]["value"], "4 spaces");
}

#[test]
fn test_merge_conditional_document_via_context_file() {
    let env = TestEnv::new();
    let dir = steering_dir(&env);
    fs::write(
        dir.join("rust.md"),
        "---\ninclusion: conditional\nfileMatchPattern: \"**/*.rs\"\n---\n## Lints\n\nclippy\n",
    )
    .unwrap();
    let context = env.write_work_file(
        "context.yaml",
        "file_paths:\n  - src/main.rs\n",
    );

    let output = env
        .tlr()
        .args(["steering", "merge", "--agent", "dev"])
        .arg("--dir")
        .arg(&dir)
        .arg("--context-file")
        .arg(&context)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json = parse_json(&output);
    assert_eq!(json["effective"]["lints"]["value"], "clippy");
}

#[test]
fn test_merge_manual_document_needs_include_flag() {
    let env = TestEnv::new();
    let dir = steering_dir(&env);
    fs::write(
        dir.join("extra.md"),
        "---\ninclusion: manual\n---\n## Extras\n\nyes\n",
    )
    .unwrap();

    let without = env
        .tlr()
        .args(["steering", "merge", "--agent", "dev"])
        .arg("--dir")
        .arg(&dir)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert_eq!(parse_json(&without)["state"], "unprocessed");

    let with = env
        .tlr()
        .args(["steering", "merge", "--agent", "dev", "--include", "extra.md"])
        .arg("--dir")
        .arg(&dir)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert_eq!(parse_json(&with)["effective"]["extras"]["value"], "yes");
}

#[test]
fn test_merge_human_output() {
    let env = TestEnv::new();
    let dir = steering_dir(&env);
    fs::write(dir.join("base.md"), "## Code Style\n\n4 spaces\n").unwrap();

    env.tlr()
        .args(["-H", "steering", "merge", "--agent", "dev"])
        .arg("--dir")
        .arg(&dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("code-style <- base.md (rank 1)"));
}

#[test]
fn test_validate_reports_per_file_verdicts() {
    let env = TestEnv::new();
    let dir = steering_dir(&env);
    fs::write(dir.join("good.md"), "## A\n\nx\n").unwrap();
    fs::write(dir.join("bad.md"), "---\ninclusion: nope\n---\n## A\n\nx\n").unwrap();
    fs::write(
        dir.join("hollow.md"),
        "---\ninclusion: conditional\n---\n## A\n\nx\n",
    )
    .unwrap();

    let output = env
        .tlr()
        .args(["steering", "validate"])
        .arg("--dir")
        .arg(&dir)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json = parse_json(&output);
    assert_eq!(json["error_count"], 2);
    let files = json["files"].as_array().unwrap();
    // Directory listing is sorted by file name.
    assert_eq!(files[0]["source"], "bad.md");
    assert_eq!(files[0]["valid"], false);
    assert_eq!(files[1]["source"], "good.md");
    assert_eq!(files[1]["valid"], true);
    assert_eq!(files[2]["source"], "hollow.md");
    assert_eq!(files[2]["valid"], false);
}

#[test]
fn test_validate_missing_directory_fails_with_json_error() {
    let env = TestEnv::new();
    env.tlr()
        .args(["steering", "validate"])
        .arg("--dir")
        .arg(env.work().join("nope"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}
