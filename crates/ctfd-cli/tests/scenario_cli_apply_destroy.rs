//! Scenario: `apply` and `destroy` against a local mock CTFd.
//!
//! # Invariants under test
//!
//! 1. `apply` without a state file creates and writes a format-1 state file.
//! 2. `apply` with a state file updates instead of creating.
//! 3. A failed root create exits non-zero and writes no state.
//! 4. `destroy` deletes the root and removes the state file.
//! 5. A missing token env var fails before any request, naming the var.

use assert_cmd::prelude::*;
use httpmock::prelude::*;
use httpmock::Method::PATCH;
use predicates::prelude::*;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

const TOKEN_ENV: &str = "CTFD_SYNC_CLI_TEST_TOKEN";

const DESIRED: &str = r#"
name: warmup
category: web
description: first steps
value: 100
"#;

fn challenge_json(id: i64) -> serde_json::Value {
    json!({
        "id": id,
        "name": "warmup",
        "category": "web",
        "description": "first steps",
        "connection_info": "",
        "max_attempts": 0,
        "value": 100,
        "logic": "any",
        "state": "hidden",
        "type": "standard"
    })
}

struct Workspace {
    _dir: tempfile::TempDir,
    config: PathBuf,
    desired: PathBuf,
    state: PathBuf,
}

fn workspace(server: &MockServer) -> anyhow::Result<Workspace> {
    let dir = tempfile::tempdir()?;
    let config = dir.path().join("ctfd.yaml");
    fs::write(
        &config,
        format!(
            "ctfd:\n  url: \"{}\"\n  token_env: \"{TOKEN_ENV}\"\n  timeout_secs: 5\n",
            server.base_url()
        ),
    )?;
    let desired = dir.path().join("challenge.yaml");
    fs::write(&desired, DESIRED)?;
    let state = dir.path().join("state.json");
    Ok(Workspace {
        _dir: dir,
        config,
        desired,
        state,
    })
}

fn sync(args: &[&str], ws: &Workspace) -> anyhow::Result<Command> {
    let mut cmd = Command::cargo_bin("ctfd-sync")?;
    cmd.args(args)
        .arg("--config")
        .arg(&ws.config)
        .arg("--state")
        .arg(&ws.state)
        .env(TOKEN_ENV, "test-token")
        .env("RUST_LOG", "warn");
    Ok(cmd)
}

fn recorded_id(state: &Path) -> anyhow::Result<i64> {
    let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(state)?)?;
    assert_eq!(raw["format_version"], 1);
    Ok(raw["challenge"]["id"].as_i64().unwrap_or_default())
}

#[test]
fn apply_creates_then_updates() -> anyhow::Result<()> {
    let server = MockServer::start();
    let ws = workspace(&server)?;

    let create = server.mock(|when, then| {
        when.method(POST)
            .path("/api/v1/challenges")
            .header("Authorization", "Token test-token");
        then.status(200)
            .json_body(json!({ "success": true, "data": challenge_json(7) }));
    });

    sync(&["apply"], &ws)?
        .arg("--desired")
        .arg(&ws.desired)
        .assert()
        .success()
        .stdout(predicate::str::contains("op=apply challenge_id=7 errors=0"));
    create.assert();
    assert_eq!(recorded_id(&ws.state)?, 7);

    let patch = server.mock(|when, then| {
        when.method(PATCH).path("/api/v1/challenges/7");
        then.status(200)
            .json_body(json!({ "success": true, "data": challenge_json(7) }));
    });
    let tags = server.mock(|when, then| {
        when.method(GET).path("/api/v1/challenges/7/tags");
        then.status(200).json_body(json!({ "success": true, "data": [] }));
    });
    let topics = server.mock(|when, then| {
        when.method(GET).path("/api/v1/challenges/7/topics");
        then.status(200).json_body(json!({ "success": true, "data": [] }));
    });

    sync(&["apply"], &ws)?
        .arg("--desired")
        .arg(&ws.desired)
        .assert()
        .success();
    patch.assert();
    tags.assert();
    topics.assert();
    create.assert_hits(1);
    Ok(())
}

#[test]
fn failed_create_exits_non_zero_without_state() -> anyhow::Result<()> {
    let server = MockServer::start();
    let ws = workspace(&server)?;

    server.mock(|when, then| {
        when.method(POST).path("/api/v1/challenges");
        then.status(500)
            .json_body(json!({ "success": false, "message": "boom" }));
    });

    sync(&["apply"], &ws)?
        .arg("--desired")
        .arg(&ws.desired)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Client Error"))
        .stderr(predicate::str::contains("boom"));
    assert!(!ws.state.exists());
    Ok(())
}

#[test]
fn destroy_deletes_and_removes_state() -> anyhow::Result<()> {
    let server = MockServer::start();
    let ws = workspace(&server)?;
    fs::write(
        &ws.state,
        json!({
            "format_version": 1,
            "written_at": "2026-01-01T00:00:00Z",
            "challenge": {
                "id": 7,
                "name": "warmup",
                "category": "web",
                "description": "first steps",
                "value": 100
            }
        })
        .to_string(),
    )?;

    let delete = server.mock(|when, then| {
        when.method(DELETE).path("/api/v1/challenges/7");
        then.status(200).json_body(json!({ "success": true }));
    });

    sync(&["destroy"], &ws)?
        .assert()
        .success()
        .stdout(predicate::str::contains("op=destroy challenge_id=none errors=0"));
    delete.assert();
    assert!(!ws.state.exists());
    Ok(())
}

#[test]
fn missing_token_fails_before_any_request() -> anyhow::Result<()> {
    let server = MockServer::start();
    let ws = workspace(&server)?;
    let any = server.mock(|when, then| {
        when.path_contains("/api/v1");
        then.status(200);
    });

    Command::cargo_bin("ctfd-sync")?
        .arg("apply")
        .arg("--config")
        .arg(&ws.config)
        .arg("--desired")
        .arg(&ws.desired)
        .arg("--state")
        .arg(&ws.state)
        .env_remove(TOKEN_ENV)
        .assert()
        .failure()
        .stderr(predicate::str::contains("SECRETS_MISSING"))
        .stderr(predicate::str::contains(TOKEN_ENV));
    any.assert_hits(0);
    Ok(())
}
