//! Diagnostics aggregated across one reconciliation pass.
//!
//! Recording never short-circuits: strategies keep going and the caller
//! decides what an `Error` entry means. Every entry is also emitted as a
//! tracing event at the matching level.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{error, warn};

/// Summary lines used by the core.
pub mod summary {
    /// A remote call failed.
    pub const CLIENT: &str = "Client Error";
    /// Local input unusable for one entry.
    pub const CONFIG: &str = "Configuration Error";
    /// The remote answered with a shape that cannot be used.
    pub const UNEXPECTED: &str = "Unexpected Response";
    pub const CANCELLED: &str = "Cancelled";
    pub const GONE: &str = "Resource Gone";
    pub const IMPRECISE: &str = "Imprecise Read";
    pub const UNAPPLIED: &str = "Change Not Applied";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Short category, e.g. `"Client Error"`.
    pub summary: String,
    pub detail: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.severity, self.summary, self.detail)
    }
}

/// Ordered list of diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, summary: impl Into<String>, detail: impl Into<String>) {
        let d = Diagnostic {
            severity: Severity::Warning,
            summary: summary.into(),
            detail: detail.into(),
        };
        warn!(summary = %d.summary, detail = %d.detail, "diagnostic");
        self.entries.push(d);
    }

    pub fn error(&mut self, summary: impl Into<String>, detail: impl Into<String>) {
        let d = Diagnostic {
            severity: Severity::Error,
            summary: summary.into(),
            detail: detail.into(),
        };
        error!(summary = %d.summary, detail = %d.detail, "diagnostic");
        self.entries.push(d);
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    /// `true` when the operation must be considered failed.
    pub fn has_error(&self) -> bool {
        self.entries.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries
            .iter()
            .filter(|d| d.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warnings_alone_do_not_fail() {
        let mut d = Diagnostics::new();
        d.warn("Client Error", "flag delete failed");
        assert!(!d.has_error());
        assert_eq!(d.warnings().count(), 1);
    }

    #[test]
    fn order_is_preserved_across_extend() {
        let mut a = Diagnostics::new();
        a.warn("w", "first");
        let mut b = Diagnostics::new();
        b.error("e", "second");
        a.extend(b);

        let details: Vec<_> = a.iter().map(|d| d.detail.as_str()).collect();
        assert_eq!(details, vec!["first", "second"]);
        assert!(a.has_error());
        assert_eq!(a.errors().count(), 1);
    }

    #[test]
    fn display_includes_severity() {
        let mut d = Diagnostics::new();
        d.error("Client Error", "boom");
        let line = d.iter().next().unwrap().to_string();
        assert_eq!(line, "error: Client Error: boom");
    }

    #[test]
    fn serializes_as_a_flat_list() {
        let mut d = Diagnostics::new();
        d.warn("Resource Gone", "challenge 3");
        let v = serde_json::to_value(&d).unwrap();
        assert_eq!(
            v,
            serde_json::json!([
                {"severity": "warning", "summary": "Resource Gone", "detail": "challenge 3"}
            ])
        );
    }
}
