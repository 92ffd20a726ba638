//! Orchestrates configured rules over a stylesheet
//!
//! A `Comb` holds the enabled rules in run order. Processing parses the
//! source once, lets each rule rewrite the tree in turn, and serializes the
//! result. Detection runs every registered rule's detector and can turn the
//! votes into settings that describe the source's existing style.

use std::collections::BTreeMap;
use std::sync::Arc;

use stylecomb_core::{parse, Node, Syntax};
use tracing::debug;

use crate::config::RuleSettings;
use crate::rules::{Rule, RuleError, RuleRegistry};

/// Outcome of processing one source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessReport {
    pub output: String,
    /// Rules whose pass changed the text, in run order
    pub changed_by: Vec<&'static str>,
}

impl ProcessReport {
    pub fn has_changes(&self) -> bool {
        !self.changed_by.is_empty()
    }
}

pub struct Comb {
    registry: RuleRegistry,
    rules: Vec<Arc<dyn Rule>>,
}

impl Comb {
    /// Create a comb running the rules enabled in `settings`
    pub fn new(settings: &RuleSettings) -> Result<Self, RuleError> {
        let registry = RuleRegistry::new();
        let rules = registry.configure(settings)?;
        Ok(Self { registry, rules })
    }

    /// Create a comb running every built-in rule
    pub fn with_all_rules() -> Result<Self, RuleError> {
        let registry = RuleRegistry::new();
        let rules = registry.ordered(&registry.all_names())?;
        Ok(Self { registry, rules })
    }

    /// Create a comb running `rules` in the given order
    pub fn from_rules(rules: Vec<Arc<dyn Rule>>) -> Self {
        Self {
            registry: RuleRegistry::new(),
            rules,
        }
    }

    pub fn rules(&self) -> &[Arc<dyn Rule>] {
        &self.rules
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Apply the configured rules to `tree` in place
    ///
    /// Rules that do not support the tree's dialect are skipped. Returns the
    /// names of the rules that changed the tree's text.
    pub fn process_tree(&self, tree: &mut Node) -> Result<Vec<&'static str>, RuleError> {
        let syntax = tree.syntax;
        let mut changed_by = Vec::new();
        let mut current = tree.to_string();

        for rule in &self.rules {
            if !rule.supports(syntax) {
                debug!(rule = rule.name(), %syntax, "skipping rule, dialect not supported");
                continue;
            }
            debug!(rule = rule.name(), %syntax, "applying rule");
            rule.process(tree)?;

            let next = tree.to_string();
            if next != current {
                changed_by.push(rule.name());
                current = next;
            }
        }
        Ok(changed_by)
    }

    /// Parse, process and serialize `source`
    pub fn process_report(&self, source: &str, syntax: Syntax) -> Result<ProcessReport, RuleError> {
        let mut tree = parse(source, syntax)?;
        let changed_by = self.process_tree(&mut tree)?;
        Ok(ProcessReport {
            output: tree.to_string(),
            changed_by,
        })
    }

    pub fn process_str(&self, source: &str, syntax: Syntax) -> Result<String, RuleError> {
        Ok(self.process_report(source, syntax)?.output)
    }

    /// Run the detector of every registered rule supporting the tree's dialect
    pub fn detect_tree(&self, tree: &Node) -> Result<BTreeMap<&'static str, Vec<bool>>, RuleError> {
        let mut votes = BTreeMap::new();
        for rule in self.registry.all() {
            if !rule.supports(tree.syntax) {
                debug!(rule = rule.name(), syntax = %tree.syntax, "skipping detection, dialect not supported");
                continue;
            }
            let detected = rule.detect(tree)?;
            debug!(rule = rule.name(), votes = detected.len(), "detected");
            votes.insert(rule.name(), detected);
        }
        Ok(votes)
    }

    pub fn detect_str(&self, source: &str, syntax: Syntax) -> Result<BTreeMap<&'static str, Vec<bool>>, RuleError> {
        let tree = parse(source, syntax)?;
        self.detect_tree(&tree)
    }

    /// Settings matching the style `source` is already written in
    pub fn detect_settings(&self, source: &str, syntax: Syntax) -> Result<RuleSettings, RuleError> {
        Ok(Self::infer_settings(&self.detect_str(source, syntax)?))
    }

    /// Turn detector votes into settings
    ///
    /// A rule with more `true` than `false` votes is enabled, one with votes
    /// but no majority is disabled, and a rule without votes is left out.
    pub fn infer_settings(votes: &BTreeMap<&str, Vec<bool>>) -> RuleSettings {
        let mut settings = RuleSettings::new();
        for (name, detected) in votes {
            if detected.is_empty() {
                continue;
            }
            let aligned = detected.iter().filter(|&&v| v).count();
            settings.set(*name, aligned > detected.len() - aligned);
        }
        settings
    }
}
