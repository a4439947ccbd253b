//! Scenario: unused-key guard.
//!
//! # Invariants under test
//!
//! 1. Warn reports unused leaves without failing.
//! 2. Fail errors with CONFIG_UNUSED_KEYS.
//! 3. Consumed keys are never reported.
//! 4. Unused pointers come back sorted.

use ctfd_config::{load_layered_yaml_from_strings, report_unused_keys, UnusedKeyPolicy};

const YAML: &str = r#"
ctfd:
  url: "https://ctf.example.org"
  retries: 3
files:
  base_dir: "."
legacy:
  b: 2
  a: 1
"#;

#[test]
fn warn_policy_reports_without_error() {
    let loaded = load_layered_yaml_from_strings(&[YAML]).unwrap();
    let report = report_unused_keys(&loaded.config_json, UnusedKeyPolicy::Warn).unwrap();
    assert_eq!(
        report.unused_leaf_pointers,
        vec!["/ctfd/retries", "/legacy/a", "/legacy/b"]
    );
}

#[test]
fn fail_policy_errors() {
    let loaded = load_layered_yaml_from_strings(&[YAML]).unwrap();
    let err = report_unused_keys(&loaded.config_json, UnusedKeyPolicy::Fail).unwrap_err();
    assert!(err.to_string().contains("CONFIG_UNUSED_KEYS"));
}

#[test]
fn fully_consumed_config_is_clean() {
    let yaml = r#"
ctfd:
  url: "https://ctf.example.org"
  token_env: "CTFD_API_TOKEN"
  timeout_secs: 10
files:
  base_dir: "."
"#;
    let loaded = load_layered_yaml_from_strings(&[yaml]).unwrap();
    let report = report_unused_keys(&loaded.config_json, UnusedKeyPolicy::Fail).unwrap();
    assert!(report.is_clean());
}
