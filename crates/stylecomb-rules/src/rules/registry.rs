//! Rule registry for managing available rules
//!
//! The registry collects the built-in rules, looks them up by name, validates
//! configuration against what each rule accepts, and orders rules so every
//! `run_before` constraint is honored.

use std::collections::HashMap;
use std::sync::Arc;

use stylecomb_core::Syntax;

use super::alignment::{AlignColonsRule, VendorPrefixAlignRule};
use super::whitespace::InlineSingleDeclarationsRule;
use super::{Rule, RuleError};
use crate::config::{ConfigValue, RuleSettings};

/// Information about a registered rule
#[derive(Debug, Clone)]
pub struct RuleInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub run_before: Option<&'static str>,
    pub syntax: &'static [Syntax],
}

/// Registry of all available rules, in registration order
pub struct RuleRegistry {
    rules: Vec<Arc<dyn Rule>>,
    by_name: HashMap<&'static str, usize>,
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleRegistry {
    /// Create a registry with all built-in rules
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(AlignColonsRule));
        registry.register(Arc::new(InlineSingleDeclarationsRule));
        registry.register(Arc::new(VendorPrefixAlignRule));
        registry
    }

    /// Create a registry without any rules
    pub fn empty() -> Self {
        Self {
            rules: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    /// Register a rule; a rule with the same name replaces the earlier one
    pub fn register(&mut self, rule: Arc<dyn Rule>) {
        match self.by_name.get(rule.name()) {
            Some(&idx) => self.rules[idx] = rule,
            None => {
                self.by_name.insert(rule.name(), self.rules.len());
                self.rules.push(rule);
            }
        }
    }

    /// Get a rule by name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Rule>> {
        self.by_name.get(name).map(|&idx| &self.rules[idx])
    }

    /// All rules in registration order
    pub fn all(&self) -> &[Arc<dyn Rule>] {
        &self.rules
    }

    pub fn all_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Get information about all rules
    pub fn list_rules(&self) -> Vec<RuleInfo> {
        self.rules
            .iter()
            .map(|r| RuleInfo {
                name: r.name(),
                description: r.description(),
                run_before: r.run_before(),
                syntax: r.syntax(),
            })
            .collect()
    }

    /// Resolve `names` to rules in an order that honors every `run_before`
    ///
    /// Among rules whose constraints are satisfied, the one registered first
    /// goes next. Constraints naming a rule outside `names` are ignored.
    pub fn ordered(&self, names: &[&str]) -> Result<Vec<Arc<dyn Rule>>, RuleError> {
        let mut selected: Vec<usize> = Vec::new();
        for name in names {
            let idx = *self
                .by_name
                .get(name)
                .ok_or_else(|| RuleError::UnknownRule(name.to_string()))?;
            if !selected.contains(&idx) {
                selected.push(idx);
            }
        }
        selected.sort_unstable();

        // Number of selected rules that must run before each one
        let mut blockers: HashMap<usize, usize> = selected.iter().map(|&idx| (idx, 0)).collect();
        for &idx in &selected {
            if let Some(after) = self.successor(idx, &selected) {
                if let Some(count) = blockers.get_mut(&after) {
                    *count += 1;
                }
            }
        }

        let mut ordered = Vec::with_capacity(selected.len());
        let mut remaining = selected;
        while !remaining.is_empty() {
            let Some(pos) = remaining.iter().position(|idx| blockers.get(idx) == Some(&0)) else {
                let names: Vec<&str> = remaining.iter().map(|&idx| self.rules[idx].name()).collect();
                return Err(RuleError::Cycle(names.join(", ")));
            };
            let idx = remaining.remove(pos);
            if let Some(after) = self.successor(idx, &remaining) {
                if let Some(count) = blockers.get_mut(&after) {
                    *count -= 1;
                }
            }
            ordered.push(Arc::clone(&self.rules[idx]));
        }
        Ok(ordered)
    }

    /// Validate `settings` and return the enabled rules in run order
    ///
    /// A rule set to `false` is disabled; any other value must be one the
    /// rule accepts.
    pub fn configure(&self, settings: &RuleSettings) -> Result<Vec<Arc<dyn Rule>>, RuleError> {
        let mut names = Vec::new();
        for (name, value) in settings.iter() {
            let rule = self
                .get(name)
                .ok_or_else(|| RuleError::UnknownRule(name.to_string()))?;
            if *value == ConfigValue::Bool(false) {
                continue;
            }
            if !rule.accepts().allows(value) {
                return Err(RuleError::InvalidValue {
                    rule: name.to_string(),
                    value: value.to_string(),
                });
            }
            names.push(name);
        }
        self.ordered(&names)
    }

    /// Index of the selected rule that `idx` must run before
    fn successor(&self, idx: usize, selected: &[usize]) -> Option<usize> {
        let name = self.rules[idx].run_before()?;
        self.by_name.get(name).copied().filter(|after| selected.contains(after))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stylecomb_core::Node;

    struct Stub {
        name: &'static str,
        before: Option<&'static str>,
    }

    impl Rule for Stub {
        fn name(&self) -> &'static str {
            self.name
        }

        fn description(&self) -> &'static str {
            "stub"
        }

        fn run_before(&self) -> Option<&'static str> {
            self.before
        }

        fn syntax(&self) -> &'static [Syntax] {
            Syntax::ALL
        }

        fn process(&self, _tree: &mut Node) -> Result<(), RuleError> {
            Ok(())
        }

        fn detect(&self, _tree: &Node) -> Result<Vec<bool>, RuleError> {
            Ok(Vec::new())
        }
    }

    fn names(rules: &[Arc<dyn Rule>]) -> Vec<&'static str> {
        rules.iter().map(|r| r.name()).collect()
    }

    #[test]
    fn test_builtin_rules() {
        let registry = RuleRegistry::new();
        assert_eq!(
            registry.all_names(),
            vec!["align-colons", "inline-single-declarations", "vendor-prefix-align"]
        );
        assert!(registry.get("align-colons").is_some());
        assert!(registry.get("sort-order").is_none());

        let info = registry.list_rules();
        let vendor = info.iter().find(|i| i.name == "vendor-prefix-align").unwrap();
        assert_eq!(vendor.run_before, Some("align-colons"));
    }

    #[test]
    fn test_vendor_prefix_runs_before_colons() {
        let registry = RuleRegistry::new();
        let rules = registry.ordered(&["align-colons", "vendor-prefix-align"]).unwrap();
        assert_eq!(names(&rules), vec!["vendor-prefix-align", "align-colons"]);

        let all = registry.ordered(&registry.all_names()).unwrap();
        assert_eq!(
            names(&all),
            vec!["inline-single-declarations", "vendor-prefix-align", "align-colons"]
        );
    }

    #[test]
    fn test_ordered_ignores_duplicates() {
        let registry = RuleRegistry::new();
        let rules = registry.ordered(&["align-colons", "align-colons"]).unwrap();
        assert_eq!(names(&rules), vec!["align-colons"]);
    }

    #[test]
    fn test_ordered_unknown_rule() {
        let registry = RuleRegistry::new();
        let err = registry.ordered(&["nope"]).err().unwrap();
        assert!(matches!(err, RuleError::UnknownRule(name) if name == "nope"));
    }

    #[test]
    fn test_ordered_detects_cycle() {
        let mut registry = RuleRegistry::empty();
        registry.register(Arc::new(Stub { name: "a", before: Some("b") }));
        registry.register(Arc::new(Stub { name: "b", before: Some("a") }));
        registry.register(Arc::new(Stub { name: "c", before: None }));

        let err = registry.ordered(&["a", "b", "c"]).err().unwrap();
        assert!(matches!(err, RuleError::Cycle(ref names) if names == "a, b"));

        // Breaking the cycle by leaving one side out
        let rules = registry.ordered(&["b", "c"]).unwrap();
        assert_eq!(names(&rules), vec!["b", "c"]);
    }

    #[test]
    fn test_register_replaces_same_name() {
        let mut registry = RuleRegistry::empty();
        registry.register(Arc::new(Stub { name: "a", before: None }));
        registry.register(Arc::new(Stub { name: "a", before: Some("x") }));
        assert_eq!(registry.all().len(), 1);
        assert_eq!(registry.get("a").unwrap().run_before(), Some("x"));
    }

    #[test]
    fn test_configure() {
        let registry = RuleRegistry::new();
        let mut settings = RuleSettings::new();
        settings.set("align-colons", true);
        settings.set("inline-single-declarations", false);
        settings.set("vendor-prefix-align", true);

        let rules = registry.configure(&settings).unwrap();
        assert_eq!(names(&rules), vec!["vendor-prefix-align", "align-colons"]);
    }

    #[test]
    fn test_configure_rejects_bad_input() {
        let registry = RuleRegistry::new();

        let mut settings = RuleSettings::new();
        settings.set("unknown-rule", true);
        assert!(matches!(
            registry.configure(&settings).err().unwrap(),
            RuleError::UnknownRule(_)
        ));

        let mut settings = RuleSettings::new();
        settings.set("align-colons", ConfigValue::Number(4));
        let err = registry.configure(&settings).err().unwrap();
        assert_eq!(err.to_string(), "Invalid value 4 for rule 'align-colons'");
    }
}
