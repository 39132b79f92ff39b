//! Severity tiers for findings
//!
//! The four review tiers are fixed and totally ordered: Critical is the
//! most severe, Low the least. `ToolingError` is a diagnostic tier for
//! findings produced when a rule itself faults; it sorts after Low and
//! never gates the exit status.

use serde::{Deserialize, Serialize};

/// Severity tier assigned to a finding.
///
/// Declaration order doubles as sort order: sorting findings by
/// severity puts the most severe first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Severity {
    /// Must be fixed before merging (e.g. leaked credentials)
    Critical,
    /// Should be fixed before merging
    High,
    /// Worth fixing, not blocking
    Medium,
    /// Stylistic or informational
    Low,
    /// The rule itself failed; the finding describes the fault
    ToolingError,
}

impl Severity {
    /// All tiers in rendering order, most severe first.
    pub const ALL: [Severity; 5] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
        Severity::ToolingError,
    ];

    /// The four tiers a rule may declare.
    pub const DECLARABLE: [Severity; 4] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
    ];

    /// Whether findings of this tier cause a non-zero exit status.
    pub fn is_blocking(self) -> bool {
        matches!(self, Severity::Critical | Severity::High)
    }

    /// Lowercase label used in rendered reports.
    pub fn label(self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
            Severity::ToolingError => "tooling-error",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
