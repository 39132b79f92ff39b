//! Rule evaluation
//!
//! Applies the applicable rules to every hunk's added lines. Each
//! (rule, hunk) application is pure and independent, so the fan-out
//! runs on the rayon pool with no ordering guarantee; `Report::new`
//! imposes the final deterministic order. A rule that panics is
//! downgraded to a single `tooling-error` finding so one bad rule
//! cannot suppress the others.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use rayon::prelude::*;
use tracing::warn;

use crate::diff::{ChangeSet, FileChange, Hunk};
use crate::report::Finding;
use crate::rules::{Rule, RuleRegistry};

/// Evaluates a registry's rules against a changeset
#[derive(Debug)]
pub struct Evaluator {
    registry: RuleRegistry,
}

impl Evaluator {
    /// Create an evaluator over a registry snapshot
    pub fn new(registry: RuleRegistry) -> Self {
        Self { registry }
    }

    /// The registry snapshot in use
    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// Evaluate every applicable rule against every hunk.
    ///
    /// The returned findings are unordered; callers pass them to
    /// [`crate::Report::new`] for grouping and deterministic ordering.
    pub fn evaluate(&self, changeset: &ChangeSet) -> Vec<Finding> {
        let units: Vec<(&FileChange, &Hunk)> = changeset
            .files
            .iter()
            .flat_map(|file| file.hunks.iter().map(move |hunk| (file, hunk)))
            .collect();

        units
            .par_iter()
            .flat_map(|(file, hunk)| {
                self.registry
                    .rules_for(&file.path)
                    .iter()
                    .flat_map(|rule| apply_rule(rule, file, hunk))
                    .collect::<Vec<_>>()
            })
            .collect()
    }
}

/// Apply one rule to one hunk, isolating panics.
fn apply_rule(rule: &Arc<Rule>, file: &FileChange, hunk: &Hunk) -> Vec<Finding> {
    if !rule.applies_to(&file.path) {
        return Vec::new();
    }

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        let mut findings = Vec::new();
        for (line, content) in hunk.added_lines() {
            if let Some(m) = rule.scan(content) {
                findings.push(Finding::new(
                    file.path.clone(),
                    line,
                    rule.severity(),
                    rule.id(),
                    rule.render_message(&m),
                ));
            }
        }
        findings
    }));

    match outcome {
        Ok(findings) => findings,
        Err(payload) => {
            let detail = panic_message(payload.as_ref());
            warn!(
                rule = rule.id(),
                path = %file.path.display(),
                detail,
                "Rule evaluation faulted; continuing with remaining rules"
            );
            vec![Finding::tooling_error(
                file.path.clone(),
                hunk.new_start,
                rule.id(),
                &detail,
            )]
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::{ChangeKind, HunkLine, LineOrigin};
    use crate::rules::{Check, LineMatch};
    use crate::severity::Severity;
    use std::path::PathBuf;

    struct FaultyCheck;

    impl Check for FaultyCheck {
        fn scan(&self, _line: &str) -> Option<LineMatch> {
            panic!("engineered fault");
        }
    }

    fn added_line(number: u32, content: &str) -> HunkLine {
        HunkLine {
            origin: LineOrigin::Added,
            number: Some(number),
            content: content.to_string(),
        }
    }

    fn single_file_changeset(path: &str, lines: Vec<HunkLine>) -> ChangeSet {
        let count = lines.len() as u32;
        ChangeSet::new(vec![FileChange {
            path: PathBuf::from(path),
            kind: ChangeKind::Added,
            hunks: vec![Hunk {
                old_start: 0,
                old_lines: 0,
                new_start: 1,
                new_lines: count,
                lines,
            }],
        }])
    }

    fn secret_changeset() -> ChangeSet {
        single_file_changeset(
            "config/settings.txt",
            vec![
                added_line(1, "[service]"),
                added_line(2, "name = \"billing\""),
                added_line(3, "retries = 3"),
                added_line(4, ""),
                added_line(5, "password = \"hunter2hunter2\""),
            ],
        )
    }

    #[test]
    fn test_empty_changeset_yields_no_findings() {
        let evaluator = Evaluator::new(RuleRegistry::builtin().unwrap());
        let findings = evaluator.evaluate(&ChangeSet::default());
        assert!(findings.is_empty());
    }

    #[test]
    fn test_zero_hunk_files_yield_no_findings() {
        let evaluator = Evaluator::new(RuleRegistry::builtin().unwrap());
        let changeset = ChangeSet::new(vec![FileChange {
            path: PathBuf::from("image.png"),
            kind: ChangeKind::Modified,
            hunks: vec![],
        }]);
        assert!(evaluator.evaluate(&changeset).is_empty());
    }

    #[test]
    fn test_secret_on_line_five_is_one_critical_finding() {
        let evaluator = Evaluator::new(RuleRegistry::builtin().unwrap());
        let findings = evaluator.evaluate(&secret_changeset());

        let critical: Vec<&Finding> = findings
            .iter()
            .filter(|f| f.severity == Severity::Critical)
            .collect();
        assert_eq!(critical.len(), 1);
        assert_eq!(critical[0].path, PathBuf::from("config/settings.txt"));
        assert_eq!(critical[0].line, 5);
        assert_eq!(critical[0].rule_id, "base.hardcoded-secret");
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let evaluator = Evaluator::new(RuleRegistry::builtin().unwrap());
        let changeset = single_file_changeset(
            "src/main.rs",
            vec![
                added_line(1, "let v = list.pop().unwrap();"),
                added_line(2, "dbg!(v);"),
                added_line(3, "// TODO tighten this bound"),
            ],
        );

        let first = evaluator.evaluate(&changeset);
        let second = evaluator.evaluate(&changeset);
        assert_eq!(first, second);
        assert!(!first.is_empty());
    }

    #[test]
    fn test_faulting_rule_does_not_suppress_others() {
        let mut registry = RuleRegistry::builtin().unwrap();
        let evaluator_without_fault = Evaluator::new(RuleRegistry::builtin().unwrap());
        let baseline_count = evaluator_without_fault.evaluate(&secret_changeset()).len();

        registry.push_base(Rule::from_parts(
            "test.always-faults",
            Severity::Low,
            Box::new(FaultyCheck),
            "never rendered",
        ));
        let evaluator = Evaluator::new(registry);
        let findings = evaluator.evaluate(&secret_changeset());

        let tooling: Vec<&Finding> = findings
            .iter()
            .filter(|f| f.severity == Severity::ToolingError)
            .collect();
        assert_eq!(tooling.len(), 1);
        assert_eq!(tooling[0].rule_id, "test.always-faults");
        assert!(tooling[0].message.contains("engineered fault"));

        // Every finding the healthy rules produced is still there.
        let healthy = findings.len() - tooling.len();
        assert_eq!(healthy, baseline_count);
    }

    #[test]
    fn test_removed_lines_are_not_evaluated() {
        let evaluator = Evaluator::new(RuleRegistry::builtin().unwrap());
        let changeset = single_file_changeset(
            "src/lib.rs",
            vec![HunkLine {
                origin: LineOrigin::Removed,
                number: None,
                content: "let v = x.unwrap();".to_string(),
            }],
        );
        assert!(evaluator.evaluate(&changeset).is_empty());
    }
}
