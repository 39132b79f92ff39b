//! Built-in rule catalogue
//!
//! The base set applies to every changed file; extension sets are keyed
//! by file extension and appended after the base set. Identifiers follow
//! a stable `<set>.<code>` scheme so findings stay addressable across
//! releases.

use crate::severity::Severity;

use super::rule::{Rule, RuleCompileError, RuleSpec};

fn spec(id: &str, severity: Severity, pattern: &str, message: &str) -> RuleSpec {
    RuleSpec {
        id: id.to_string(),
        severity,
        files: Vec::new(),
        pattern: pattern.to_string(),
        message: message.to_string(),
    }
}

/// Rules applied to every changed file
pub fn base_rules() -> Result<Vec<Rule>, RuleCompileError> {
    let specs = [
        spec(
            "base.hardcoded-secret",
            Severity::Critical,
            r#"(?i)\b(api[_-]?key|secret|token|passwd|password)\b\s*[:=]\s*["'][^"']{8,}["']"#,
            "possible hardcoded secret: {excerpt}",
        ),
        spec(
            "base.private-key",
            Severity::Critical,
            r"-----BEGIN (RSA |EC |DSA |OPENSSH |PGP )?PRIVATE KEY-----",
            "private key material committed to the repository",
        ),
        spec(
            "base.merge-conflict",
            Severity::High,
            r"^(<<<<<<<|>>>>>>>)( |$)",
            "leftover merge conflict marker",
        ),
        spec(
            "base.todo-marker",
            Severity::Low,
            r"\b(TODO|FIXME)\b",
            "unresolved {excerpt} marker in changed code",
        ),
    ];
    specs.iter().map(RuleSpec::compile).collect()
}

/// Extension-specific rule sets, as (extension, rules) pairs.
///
/// Extensions sharing a set (e.g. the JavaScript family) each get their
/// own entry so registry lookup stays a plain map access.
pub fn extension_rules() -> Result<Vec<(&'static str, Vec<Rule>)>, RuleCompileError> {
    let mut sets = Vec::new();

    sets.push(("rs", compile_all(&rust_specs())?));
    sets.push(("py", compile_all(&python_specs())?));
    for ext in ["js", "jsx", "ts", "tsx"] {
        sets.push((ext, compile_all(&javascript_specs())?));
    }
    for ext in ["sh", "bash"] {
        sets.push((ext, compile_all(&shell_specs())?));
    }

    Ok(sets)
}

fn compile_all(specs: &[RuleSpec]) -> Result<Vec<Rule>, RuleCompileError> {
    specs.iter().map(RuleSpec::compile).collect()
}

fn rust_specs() -> Vec<RuleSpec> {
    vec![
        spec(
            "rust.unwrap",
            Severity::Medium,
            r"\.unwrap\(\)",
            "unwrap() in changed code; prefer propagating the error",
        ),
        spec(
            "rust.dbg-macro",
            Severity::Medium,
            r"\bdbg!\s*\(",
            "dbg! left in changed code",
        ),
    ]
}

fn python_specs() -> Vec<RuleSpec> {
    vec![
        spec(
            "python.breakpoint",
            Severity::High,
            r"\b(breakpoint\(\)|pdb\.set_trace\(\))",
            "debugger entry point left in changed code",
        ),
        spec(
            "python.bare-except",
            Severity::Medium,
            r"^\s*except\s*:",
            "bare except swallows all exceptions including KeyboardInterrupt",
        ),
        spec(
            "python.print",
            Severity::Low,
            r"^\s*print\(",
            "print() in changed code; use logging instead",
        ),
    ]
}

fn javascript_specs() -> Vec<RuleSpec> {
    vec![
        spec(
            "js.debugger",
            Severity::High,
            r"^\s*debugger\b",
            "debugger statement left in changed code",
        ),
        spec(
            "js.eval",
            Severity::High,
            r"\beval\s*\(",
            "eval() on changed lines: {excerpt}",
        ),
        spec(
            "js.console-log",
            Severity::Low,
            r"\bconsole\.(log|debug)\s*\(",
            "console logging left in changed code",
        ),
    ]
}

fn shell_specs() -> Vec<RuleSpec> {
    vec![spec(
        "shell.curl-pipe",
        Severity::High,
        r"curl\b[^|]*\|\s*(ba|z)?sh\b",
        "piping curl output straight into a shell: {excerpt}",
    )]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_rules_compile() {
        let rules = base_rules().unwrap();
        assert!(rules.iter().any(|r| r.id() == "base.hardcoded-secret"));
    }

    #[test]
    fn test_extension_rules_compile() {
        let sets = extension_rules().unwrap();
        assert!(sets.iter().any(|(ext, _)| *ext == "rs"));
        assert!(sets.iter().any(|(ext, _)| *ext == "tsx"));
    }

    #[test]
    fn test_secret_rule_matches_assignment() {
        let rules = base_rules().unwrap();
        let secret = rules
            .iter()
            .find(|r| r.id() == "base.hardcoded-secret")
            .unwrap();
        assert!(secret.scan(r#"password = "hunter2hunter2""#).is_some());
        assert!(secret.scan(r#"API_KEY: 'zq83k1bx9f2m7d41'"#).is_some());
        assert!(secret.scan(r#"password = os.environ["PASSWORD"]"#).is_none());
        assert!(secret.scan("let x = 1;").is_none());
    }

    #[test]
    fn test_merge_conflict_rule_matches_markers_only() {
        let rules = base_rules().unwrap();
        let conflict = rules
            .iter()
            .find(|r| r.id() == "base.merge-conflict")
            .unwrap();
        assert!(conflict.scan("<<<<<<< HEAD").is_some());
        assert!(conflict.scan(">>>>>>> feature/login").is_some());
        assert!(conflict.scan("let shifted = a >>> 7;").is_none());
    }

    #[test]
    fn test_curl_pipe_rule() {
        let sets = extension_rules().unwrap();
        let (_, shell) = sets.iter().find(|(ext, _)| *ext == "sh").unwrap();
        let rule = shell.iter().find(|r| r.id() == "shell.curl-pipe").unwrap();
        assert!(rule.scan("curl -fsSL https://example.com/install | sh").is_some());
        assert!(rule.scan("curl -o out.tar.gz https://example.com/a.tar.gz").is_none());
    }
}
