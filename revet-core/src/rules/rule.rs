//! Rule definition and compilation
//!
//! A rule pairs a detection predicate with a severity tier and a message
//! template. Rules are compiled once from a [`RuleSpec`] and immutable
//! afterwards; the evaluator shares them across threads via `Arc`.

use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::severity::Severity;

/// Error raised when a rule specification cannot be compiled
#[derive(Error, Debug)]
pub enum RuleCompileError {
    /// The detection pattern is not a valid regex
    #[error("rule '{id}': invalid pattern: {source}")]
    InvalidPattern {
        /// Identifier of the offending rule
        id: String,
        /// The underlying regex error
        #[source]
        source: regex::Error,
    },

    /// A file glob does not parse
    #[error("rule '{id}': invalid file glob '{glob}': {source}")]
    InvalidGlob {
        /// Identifier of the offending rule
        id: String,
        /// The glob as written
        glob: String,
        /// The underlying glob error
        #[source]
        source: glob::PatternError,
    },

    /// Rules may only declare the four review tiers
    #[error("rule '{id}': severity 'tooling-error' is reserved for diagnostics")]
    ReservedSeverity {
        /// Identifier of the offending rule
        id: String,
    },
}

/// A match produced by a [`Check`] against one line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineMatch {
    /// The matched fragment, used to fill the `{excerpt}` placeholder
    pub excerpt: String,
}

/// Detection predicate applied to one added line.
///
/// Implementations must be pure: no shared mutable state, no dependence
/// on prior evaluations. The evaluator relies on this to run checks in
/// any order and in parallel.
pub trait Check: Send + Sync {
    /// Scan a single line, returning a match if the check fires.
    fn scan(&self, line: &str) -> Option<LineMatch>;
}

/// Regex-backed check, the standard detection predicate
#[derive(Debug)]
pub struct RegexCheck {
    pattern: Regex,
}

impl RegexCheck {
    /// Compile a regex check from a pattern string
    pub fn new(id: &str, pattern: &str) -> Result<Self, RuleCompileError> {
        let pattern = Regex::new(pattern).map_err(|source| RuleCompileError::InvalidPattern {
            id: id.to_string(),
            source,
        })?;
        Ok(Self { pattern })
    }
}

impl Check for RegexCheck {
    fn scan(&self, line: &str) -> Option<LineMatch> {
        self.pattern.find(line).map(|m| LineMatch {
            excerpt: m.as_str().to_string(),
        })
    }
}

/// Serializable rule specification, as written in configuration files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSpec {
    /// Stable dotted identifier (e.g. `base.hardcoded-secret`)
    pub id: String,
    /// Declared severity tier
    pub severity: Severity,
    /// File globs this rule applies to; empty means all files
    #[serde(default)]
    pub files: Vec<String>,
    /// Detection regex applied to each added line
    pub pattern: String,
    /// Message template; `{excerpt}` expands to the matched fragment
    pub message: String,
}

impl RuleSpec {
    /// Compile the specification into an immutable [`Rule`]
    pub fn compile(&self) -> Result<Rule, RuleCompileError> {
        if !Severity::DECLARABLE.contains(&self.severity) {
            return Err(RuleCompileError::ReservedSeverity {
                id: self.id.clone(),
            });
        }

        let mut files = Vec::with_capacity(self.files.len());
        for g in &self.files {
            let pattern = glob::Pattern::new(g).map_err(|source| RuleCompileError::InvalidGlob {
                id: self.id.clone(),
                glob: g.clone(),
                source,
            })?;
            files.push(pattern);
        }

        let check = RegexCheck::new(&self.id, &self.pattern)?;

        Ok(Rule {
            id: self.id.clone(),
            severity: self.severity,
            files,
            check: Box::new(check),
            message: self.message.clone(),
        })
    }
}

/// A compiled, immutable review rule
pub struct Rule {
    id: String,
    severity: Severity,
    files: Vec<glob::Pattern>,
    check: Box<dyn Check>,
    message: String,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("id", &self.id)
            .field("severity", &self.severity)
            .finish_non_exhaustive()
    }
}

impl Rule {
    /// Build a rule from parts, bypassing the spec layer.
    ///
    /// Used by the builtin catalogue and by tests that need a custom
    /// [`Check`] implementation.
    pub fn from_parts(
        id: impl Into<String>,
        severity: Severity,
        check: Box<dyn Check>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            severity,
            files: Vec::new(),
            check,
            message: message.into(),
        }
    }

    /// The rule identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The declared severity tier
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// The message template
    pub fn message_template(&self) -> &str {
        &self.message
    }

    /// Whether the rule's file predicate accepts the given path
    pub fn applies_to(&self, path: &Path) -> bool {
        self.files.is_empty() || self.files.iter().any(|p| p.matches_path(path))
    }

    /// Run the detection predicate against one line
    pub fn scan(&self, line: &str) -> Option<LineMatch> {
        self.check.scan(line)
    }

    /// Expand the message template for a match
    pub fn render_message(&self, m: &LineMatch) -> String {
        self.message.replace("{excerpt}", &m.excerpt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn spec(pattern: &str) -> RuleSpec {
        RuleSpec {
            id: "test.rule".to_string(),
            severity: Severity::Medium,
            files: vec![],
            pattern: pattern.to_string(),
            message: "matched: {excerpt}".to_string(),
        }
    }

    #[test]
    fn test_compile_and_scan() {
        let rule = spec(r"\bdbg!\s*\(").compile().unwrap();
        let m = rule.scan("    dbg!(value);").unwrap();
        assert_eq!(m.excerpt, "dbg!(");
        assert_eq!(rule.render_message(&m), "matched: dbg!(");
        assert!(rule.scan("let x = 1;").is_none());
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let err = spec(r"[unclosed").compile().unwrap_err();
        assert!(matches!(err, RuleCompileError::InvalidPattern { .. }));
        assert!(err.to_string().contains("test.rule"));
    }

    #[test]
    fn test_invalid_glob_rejected() {
        let mut s = spec(r"x");
        s.files = vec!["src/[".to_string()];
        let err = s.compile().unwrap_err();
        assert!(matches!(err, RuleCompileError::InvalidGlob { .. }));
    }

    #[test]
    fn test_tooling_error_severity_reserved() {
        let mut s = spec(r"x");
        s.severity = Severity::ToolingError;
        let err = s.compile().unwrap_err();
        assert!(matches!(err, RuleCompileError::ReservedSeverity { .. }));
    }

    #[test]
    fn test_empty_files_applies_everywhere() {
        let rule = spec(r"x").compile().unwrap();
        assert!(rule.applies_to(Path::new("src/main.rs")));
        assert!(rule.applies_to(Path::new("README.md")));
    }

    #[test]
    fn test_file_globs_gate_application() {
        let mut s = spec(r"x");
        s.files = vec!["*.rs".to_string()];
        let rule = s.compile().unwrap();
        assert!(rule.applies_to(Path::new("src/main.rs")));
        assert!(!rule.applies_to(Path::new("setup.py")));
    }
}
