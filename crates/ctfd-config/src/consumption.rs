//! Unused-key guard.
//!
//! Every leaf of the merged config is addressed by its JSON Pointer. A leaf
//! equal to or nested under a [`CONSUMED_POINTERS`] entry is read by the
//! tool; anything else is reported. Callers pick whether that is a warning
//! or an error.

use anyhow::{bail, Result};
use serde_json::Value;

/// Every pointer the sync tool actually reads.
pub const CONSUMED_POINTERS: &[&str] = &[
    "/ctfd/url",
    "/ctfd/token_env",
    "/ctfd/timeout_secs",
    "/files/base_dir",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnusedKeyPolicy {
    Warn,
    Fail,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnusedKeyReport {
    /// Sorted.
    pub unused_leaf_pointers: Vec<String>,
}

impl UnusedKeyReport {
    pub fn is_clean(&self) -> bool {
        self.unused_leaf_pointers.is_empty()
    }
}

/// With `Fail`, unused keys are an error; with `Warn` the report is always
/// returned.
pub fn report_unused_keys(config_json: &Value, policy: UnusedKeyPolicy) -> Result<UnusedKeyReport> {
    let mut unused: Vec<String> = leaves(config_json)
        .into_iter()
        .map(|(ptr, _)| ptr)
        .filter(|ptr| !CONSUMED_POINTERS.iter().any(|c| is_under(c, ptr)))
        .collect();
    unused.sort();

    if policy == UnusedKeyPolicy::Fail && !unused.is_empty() {
        let shown: Vec<&str> = unused.iter().take(12).map(String::as_str).collect();
        bail!(
            "CONFIG_UNUSED_KEYS: {} unused config key(s): {}",
            unused.len(),
            shown.join(", ")
        );
    }

    Ok(UnusedKeyReport {
        unused_leaf_pointers: unused,
    })
}

/// "/a/b" covers "/a/b" and "/a/b/c" but not "/a/bc".
fn is_under(consumed: &str, leaf: &str) -> bool {
    match leaf.strip_prefix(consumed) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Every scalar leaf with its JSON Pointer, in document order.
pub(crate) fn leaves(v: &Value) -> Vec<(String, &Value)> {
    let mut out = Vec::new();
    walk(v, String::new(), &mut out);
    out
}

fn walk<'v>(v: &'v Value, ptr: String, out: &mut Vec<(String, &'v Value)>) {
    match v {
        Value::Object(map) => {
            for (k, child) in map {
                let token = k.replace('~', "~0").replace('/', "~1");
                walk(child, format!("{ptr}/{token}"), out);
            }
        }
        Value::Array(items) => {
            for (i, child) in items.iter().enumerate() {
                walk(child, format!("{ptr}/{i}"), out);
            }
        }
        _ if ptr.is_empty() => out.push(("/".to_string(), v)),
        _ => out.push((ptr, v)),
    }
}
