//! Report rendering
//!
//! Produces the deterministic textual form of a report: one section per
//! populated tier, Critical first, tooling-error diagnostics last, and
//! an explicit "no findings" branch for clean runs. The JSON form keeps
//! a stable shape for downstream tooling.
//!
//! Before emitting anything the renderer re-counts the findings and
//! compares against the report's summary; a mismatch means the report
//! was corrupted after construction and is a fatal error. A formatting
//! failure on an individual finding is not fatal: that finding is
//! omitted, the rest of the report is still emitted, and the output
//! notes how many findings were skipped.

use std::fmt::Write as _;
use std::str::FromStr;

use owo_colors::OwoColorize;
use thiserror::Error;

use crate::report::{Finding, Report};
use crate::severity::Severity;

/// Error raised when a report cannot be rendered
#[derive(Error, Debug)]
pub enum RenderError {
    /// Summary counts disagree with the grouped findings
    #[error("report summary counts {summary} findings but {actual} were grouped")]
    CountMismatch {
        /// Total according to the summary
        summary: usize,
        /// Number of findings actually grouped
        actual: usize,
    },

    /// JSON serialization failed
    #[error("failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

/// Output format for rendered reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable, optionally colored text
    Human,
    /// Stable JSON for downstream tooling
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "human" | "text" => Ok(OutputFormat::Human),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!(
                "unknown output format '{}'; expected 'human' or 'json'",
                other
            )),
        }
    }
}

/// Whether color is appropriate for the format and environment.
///
/// JSON output is never colored; human output respects `NO_COLOR`.
pub fn color_enabled(format: OutputFormat) -> bool {
    format == OutputFormat::Human && std::env::var_os("NO_COLOR").is_none()
}

/// Render a report in the requested format
pub fn render(report: &Report, format: OutputFormat, color: bool) -> Result<String, RenderError> {
    verify_counts(report)?;

    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Human => Ok(render_human(report, color)),
    }
}

fn verify_counts(report: &Report) -> Result<(), RenderError> {
    let actual = report.findings().len();
    let summary = report.summary();

    let tier_sum: usize = Severity::ALL.iter().map(|s| summary.count(*s)).sum();
    if summary.total != actual || tier_sum != actual {
        return Err(RenderError::CountMismatch {
            summary: summary.total.max(tier_sum),
            actual,
        });
    }
    Ok(())
}

fn render_human(report: &Report, color: bool) -> String {
    let mut out = String::new();
    let mut omitted = 0usize;

    if report.is_empty() {
        out.push_str("No findings.\n");
    } else {
        for severity in Severity::ALL {
            let count = report.summary().count(severity);
            if count == 0 {
                continue;
            }

            let header = format!("{} ({})", severity.label(), count);
            if color {
                let _ = writeln!(out, "{}", paint_header(&header, severity));
            } else {
                let _ = writeln!(out, "{}", header);
            }

            for finding in report.findings_for(severity) {
                match render_finding(finding, color) {
                    Ok(line) => {
                        out.push_str(&line);
                        out.push('\n');
                    }
                    Err(_) => omitted += 1,
                }
            }
            out.push('\n');
        }
    }

    if omitted > 0 {
        let _ = writeln!(out, "note: {} finding(s) could not be rendered", omitted);
    }

    let summary = report.summary();
    let line = format!(
        "summary: critical={} high={} medium={} low={} tooling-error={} total={}",
        summary.critical,
        summary.high,
        summary.medium,
        summary.low,
        summary.tooling_errors,
        summary.total
    );
    if color {
        let _ = writeln!(out, "{}", line.bold());
    } else {
        let _ = writeln!(out, "{}", line);
    }

    out
}

fn paint_header(header: &str, severity: Severity) -> String {
    match severity {
        Severity::Critical => header.red().bold().to_string(),
        Severity::High => header.red().to_string(),
        Severity::Medium => header.yellow().to_string(),
        Severity::Low => header.blue().to_string(),
        Severity::ToolingError => header.magenta().to_string(),
    }
}

fn render_finding(finding: &Finding, color: bool) -> Result<String, std::fmt::Error> {
    let mut line = String::new();
    let location = format!("{}:{}", finding.path.display(), finding.line);

    if color {
        write!(
            line,
            "  {} [{}] {}",
            location.bold(),
            finding.rule_id,
            finding.message
        )?;
    } else {
        write!(line, "  {} [{}] {}", location, finding.rule_id, finding.message)?;
    }
    Ok(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn finding(path: &str, line: u32, severity: Severity, rule_id: &str) -> Finding {
        Finding::new(PathBuf::from(path), line, severity, rule_id, "msg")
    }

    fn sample_report() -> Report {
        Report::new(vec![
            finding("src/b.rs", 3, Severity::High, "rust.unwrap"),
            finding("src/a.rs", 5, Severity::Critical, "base.hardcoded-secret"),
            finding("src/a.rs", 9, Severity::Low, "base.todo-marker"),
        ])
    }

    #[test]
    fn test_no_findings_branch_is_explicit() {
        let report = Report::new(vec![]);
        let text = render(&report, OutputFormat::Human, false).unwrap();
        assert!(text.contains("No findings."));
        assert!(text.contains("total=0"));
    }

    #[test]
    fn test_critical_section_precedes_high() {
        let text = render(&sample_report(), OutputFormat::Human, false).unwrap();
        let critical_pos = text.find("critical (1)").unwrap();
        let high_pos = text.find("high (1)").unwrap();
        assert!(critical_pos < high_pos);
        // The finding lines follow their section order too
        assert!(text.find("src/a.rs:5").unwrap() < text.find("src/b.rs:3").unwrap());
    }

    #[test]
    fn test_empty_tiers_are_skipped() {
        let text = render(&sample_report(), OutputFormat::Human, false).unwrap();
        assert!(!text.contains("medium ("));
        assert!(!text.contains("tooling-error ("));
    }

    #[test]
    fn test_json_shape() {
        let text = render(&sample_report(), OutputFormat::Json, false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["summary"]["critical"], 1);
        assert_eq!(value["summary"]["total"], 3);
        assert_eq!(value["findings"][0]["severity"], "critical");
        assert_eq!(value["findings"][0]["line"], 5);
    }

    #[test]
    fn test_count_mismatch_is_fatal() {
        let mut report = sample_report();
        report.summary.total = 99;
        let err = render(&report, OutputFormat::Human, false).unwrap_err();
        assert!(matches!(err, RenderError::CountMismatch { .. }));
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let a = render(&sample_report(), OutputFormat::Human, false).unwrap();
        let b = render(&sample_report(), OutputFormat::Human, false).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_parse_output_format() {
        assert_eq!("human".parse::<OutputFormat>().unwrap(), OutputFormat::Human);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("yaml".parse::<OutputFormat>().is_err());
    }
}
