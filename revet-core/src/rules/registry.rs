//! Rule registry: which rules apply to which file
//!
//! Lookup is pure and deterministic. The base set always applies;
//! extension-specific sets are appended after it, so for a given
//! registry snapshot the same path always yields the same ordered rule
//! list.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use super::builtin;
use super::rule::{Rule, RuleCompileError, RuleSpec};

/// Registry mapping file paths to the ordered rules that apply to them
#[derive(Debug, Default)]
pub struct RuleRegistry {
    base: Vec<Arc<Rule>>,
    by_extension: BTreeMap<String, Vec<Arc<Rule>>>,
}

impl RuleRegistry {
    /// An empty registry with no rules at all
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry loaded with the built-in catalogue
    pub fn builtin() -> Result<Self, RuleCompileError> {
        let mut registry = Self::empty();

        for rule in builtin::base_rules()? {
            registry.base.push(Arc::new(rule));
        }
        for (ext, rules) in builtin::extension_rules()? {
            let entry = registry.by_extension.entry(ext.to_string()).or_default();
            entry.extend(rules.into_iter().map(Arc::new));
        }

        Ok(registry)
    }

    /// Append a compiled rule to the base set.
    ///
    /// The rule's own file globs still gate where it fires.
    pub fn push_base(&mut self, rule: Rule) {
        self.base.push(Arc::new(rule));
    }

    /// Compile and append custom rule specifications to the base set
    pub fn with_custom_rules(mut self, specs: &[RuleSpec]) -> Result<Self, RuleCompileError> {
        for spec in specs {
            self.base.push(Arc::new(spec.compile()?));
        }
        Ok(self)
    }

    /// Remove rules whose ids appear in the disabled list
    pub fn without_rules(mut self, disabled: &[String]) -> Self {
        if disabled.is_empty() {
            return self;
        }
        self.base.retain(|r| !disabled.iter().any(|d| d == r.id()));
        for rules in self.by_extension.values_mut() {
            rules.retain(|r| !disabled.iter().any(|d| d == r.id()));
        }
        self
    }

    /// The ordered rules applicable to a path: base set first, then the
    /// extension set if one is registered.
    pub fn rules_for(&self, path: &Path) -> Vec<Arc<Rule>> {
        let mut rules = self.base.clone();

        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            if let Some(extra) = self.by_extension.get(ext) {
                rules.extend(extra.iter().cloned());
            }
        }

        rules
    }

    /// The always-applied base set
    pub fn base(&self) -> &[Arc<Rule>] {
        &self.base
    }

    /// Extension sets in deterministic (sorted) order
    pub fn extensions(&self) -> impl Iterator<Item = (&str, &[Arc<Rule>])> {
        self.by_extension
            .iter()
            .map(|(ext, rules)| (ext.as_str(), rules.as_slice()))
    }

    /// Total number of registered rules
    pub fn len(&self) -> usize {
        self.base.len() + self.by_extension.values().map(Vec::len).sum::<usize>()
    }

    /// Whether the registry holds no rules
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::severity::Severity;
    use std::path::Path;

    fn custom_spec(id: &str) -> RuleSpec {
        RuleSpec {
            id: id.to_string(),
            severity: Severity::Medium,
            files: vec![],
            pattern: "x".to_string(),
            message: "m".to_string(),
        }
    }

    #[test]
    fn test_base_set_always_included() {
        let registry = RuleRegistry::builtin().unwrap();
        let rules = registry.rules_for(Path::new("docs/notes.txt"));
        assert!(rules.iter().any(|r| r.id() == "base.hardcoded-secret"));
        assert!(!rules.iter().any(|r| r.id() == "rust.unwrap"));
    }

    #[test]
    fn test_extension_set_appended_after_base() {
        let registry = RuleRegistry::builtin().unwrap();
        let rules = registry.rules_for(Path::new("src/main.rs"));

        let base_pos = rules
            .iter()
            .position(|r| r.id() == "base.hardcoded-secret")
            .unwrap();
        let ext_pos = rules.iter().position(|r| r.id() == "rust.unwrap").unwrap();
        assert!(base_pos < ext_pos);
    }

    #[test]
    fn test_lookup_is_deterministic() {
        let registry = RuleRegistry::builtin().unwrap();
        let first: Vec<String> = registry
            .rules_for(Path::new("a.py"))
            .iter()
            .map(|r| r.id().to_string())
            .collect();
        let second: Vec<String> = registry
            .rules_for(Path::new("a.py"))
            .iter()
            .map(|r| r.id().to_string())
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_custom_rules_appended_to_base() {
        let registry = RuleRegistry::builtin()
            .unwrap()
            .with_custom_rules(&[custom_spec("team.no-x")])
            .unwrap();
        let rules = registry.rules_for(Path::new("any.file"));
        assert!(rules.iter().any(|r| r.id() == "team.no-x"));
    }

    #[test]
    fn test_disabled_rules_filtered() {
        let registry = RuleRegistry::builtin()
            .unwrap()
            .without_rules(&["base.todo-marker".to_string(), "rust.unwrap".to_string()]);
        let rules = registry.rules_for(Path::new("src/lib.rs"));
        assert!(!rules.iter().any(|r| r.id() == "base.todo-marker"));
        assert!(!rules.iter().any(|r| r.id() == "rust.unwrap"));
        assert!(rules.iter().any(|r| r.id() == "rust.dbg-macro"));
    }

    #[test]
    fn test_empty_registry() {
        let registry = RuleRegistry::empty();
        assert!(registry.is_empty());
        assert!(registry.rules_for(Path::new("a.rs")).is_empty());
    }
}
