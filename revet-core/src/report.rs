//! Findings and reports
//!
//! A finding is an immutable value record tying one rule to one
//! location in the changeset. A report groups findings by severity and
//! carries summary counts; the counts must always equal the grouped
//! findings, which the renderer verifies before emitting anything.

use std::path::PathBuf;

use serde::Serialize;

use crate::severity::Severity;

/// One reported issue: one rule matched at one changeset location
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    /// Path of the changed file, relative to the repository root
    pub path: PathBuf,
    /// Line number in the new file
    pub line: u32,
    /// Severity tier inherited from the rule
    pub severity: Severity,
    /// Identifier of the rule that produced the finding
    pub rule_id: String,
    /// Rendered message
    pub message: String,
}

impl Finding {
    /// Create a finding for a rule match
    pub fn new(
        path: PathBuf,
        line: u32,
        severity: Severity,
        rule_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            path,
            line,
            severity,
            rule_id: rule_id.into(),
            message: message.into(),
        }
    }

    /// Create a diagnostic finding for a rule that faulted during
    /// evaluation. Anchored at the start of the hunk being evaluated.
    pub fn tooling_error(path: PathBuf, line: u32, rule_id: impl Into<String>, detail: &str) -> Self {
        Self {
            path,
            line,
            severity: Severity::ToolingError,
            rule_id: rule_id.into(),
            message: format!("rule evaluation failed: {}", detail),
        }
    }
}

/// Per-tier finding counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Critical-tier findings
    pub critical: usize,
    /// High-tier findings
    pub high: usize,
    /// Medium-tier findings
    pub medium: usize,
    /// Low-tier findings
    pub low: usize,
    /// Diagnostic findings from faulted rules
    pub tooling_errors: usize,
    /// All findings
    pub total: usize,
}

impl Summary {
    /// Count for one tier
    pub fn count(&self, severity: Severity) -> usize {
        match severity {
            Severity::Critical => self.critical,
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
            Severity::ToolingError => self.tooling_errors,
        }
    }

    fn record(&mut self, severity: Severity) {
        match severity {
            Severity::Critical => self.critical += 1,
            Severity::High => self.high += 1,
            Severity::Medium => self.medium += 1,
            Severity::Low => self.low += 1,
            Severity::ToolingError => self.tooling_errors += 1,
        }
        self.total += 1;
    }
}

/// Severity-ordered findings plus summary counts for one invocation
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub(crate) findings: Vec<Finding>,
    pub(crate) summary: Summary,
}

impl Report {
    /// Build a report, ordering findings by severity, then path, line,
    /// and rule id, and computing the per-tier counts.
    pub fn new(mut findings: Vec<Finding>) -> Self {
        findings.sort_by(|a, b| {
            a.severity
                .cmp(&b.severity)
                .then_with(|| a.path.cmp(&b.path))
                .then_with(|| a.line.cmp(&b.line))
                .then_with(|| a.rule_id.cmp(&b.rule_id))
        });

        let mut summary = Summary::default();
        for finding in &findings {
            summary.record(finding.severity);
        }

        Self { findings, summary }
    }

    /// The ordered findings
    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    /// The summary counts
    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    /// Total number of findings
    pub fn total(&self) -> usize {
        self.summary.total
    }

    /// Whether the report has no findings
    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    /// Whether any finding gates the exit status (Critical or High)
    pub fn has_blocking(&self) -> bool {
        self.findings.iter().any(|f| f.severity.is_blocking())
    }

    /// Findings of one tier, in path/line order
    pub fn findings_for(&self, severity: Severity) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(move |f| f.severity == severity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finding(path: &str, line: u32, severity: Severity, rule_id: &str) -> Finding {
        Finding::new(PathBuf::from(path), line, severity, rule_id, "msg")
    }

    #[test]
    fn test_empty_report() {
        let report = Report::new(vec![]);
        assert!(report.is_empty());
        assert!(!report.has_blocking());
        assert_eq!(report.total(), 0);
        for severity in Severity::ALL {
            assert_eq!(report.summary().count(severity), 0);
        }
    }

    #[test]
    fn test_counts_match_findings() {
        let report = Report::new(vec![
            finding("a.rs", 1, Severity::Low, "r1"),
            finding("a.rs", 2, Severity::Critical, "r2"),
            finding("b.rs", 3, Severity::Critical, "r3"),
            finding("c.rs", 4, Severity::ToolingError, "r4"),
        ]);
        assert_eq!(report.summary().critical, 2);
        assert_eq!(report.summary().low, 1);
        assert_eq!(report.summary().tooling_errors, 1);
        assert_eq!(report.summary().total, report.findings().len());

        let tier_sum: usize = Severity::ALL
            .iter()
            .map(|s| report.summary().count(*s))
            .sum();
        assert_eq!(tier_sum, report.total());
    }

    #[test]
    fn test_ordering_severity_then_path_then_line() {
        let report = Report::new(vec![
            finding("b.rs", 9, Severity::Low, "r"),
            finding("b.rs", 1, Severity::Critical, "r"),
            finding("a.rs", 5, Severity::Critical, "r"),
            finding("a.rs", 2, Severity::High, "r"),
        ]);

        let order: Vec<(Severity, &str, u32)> = report
            .findings()
            .iter()
            .map(|f| (f.severity, f.path.to_str().unwrap(), f.line))
            .collect();
        assert_eq!(
            order,
            vec![
                (Severity::Critical, "a.rs", 5),
                (Severity::Critical, "b.rs", 1),
                (Severity::High, "a.rs", 2),
                (Severity::Low, "b.rs", 9),
            ]
        );
    }

    #[test]
    fn test_blocking_detection() {
        let clean = Report::new(vec![finding("a.rs", 1, Severity::Low, "r")]);
        assert!(!clean.has_blocking());

        let blocking = Report::new(vec![finding("a.rs", 1, Severity::High, "r")]);
        assert!(blocking.has_blocking());
    }
}
