//! Scenario: `ctfd-sync config-hash`.
//!
//! # Invariants under test
//!
//! 1. Prints a 64-hex `config_hash=` line and the canonical JSON.
//! 2. Layer order matters: the later layer wins.
//! 3. A literal token in config fails without echoing it.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;

#[test]
fn config_hash_prints_hash_and_canonical_json() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let base = dir.path().join("base.yaml");
    let local = dir.path().join("local.yaml");
    fs::write(&base, "ctfd:\n  url: \"https://ctf.example.org\"\n  timeout_secs: 30\n")?;
    fs::write(&local, "ctfd:\n  timeout_secs: 5\n")?;

    Command::cargo_bin("ctfd-sync")?
        .arg("config-hash")
        .arg(&base)
        .arg(&local)
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"config_hash=[0-9a-f]{64}\n")?)
        .stdout(predicate::str::contains(
            r#"{"ctfd":{"timeout_secs":5,"url":"https://ctf.example.org"}}"#,
        ));
    Ok(())
}

#[test]
fn config_hash_refuses_literal_token() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let base = dir.path().join("base.yaml");
    fs::write(&base, "ctfd:\n  token_env: \"ctfd_9a8b7c6d5e4f3a2b\"\n")?;

    Command::cargo_bin("ctfd-sync")?
        .arg("config-hash")
        .arg(&base)
        .assert()
        .failure()
        .stderr(predicate::str::contains("CONFIG_SECRET_DETECTED"))
        .stderr(predicate::str::contains("9a8b7c6d").not());
    Ok(())
}
