//! Rule implementations for stylesheet code style
//!
//! Each rule rewrites a parsed tree in place to enforce one convention and
//! can detect whether a tree already follows it.

mod registry;
pub mod alignment;
pub mod whitespace;

pub use registry::{RuleInfo, RuleRegistry};

use stylecomb_core::{parse, Node, ParseError, Syntax};
use thiserror::Error;

use crate::config::ConfigValue;

/// Errors raised while configuring or running rules
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("Rule '{rule}' does not support {syntax} syntax")]
    UnsupportedDialect { rule: &'static str, syntax: Syntax },

    #[error("Rule '{rule}' could not re-parse the tree: {source}")]
    Reparse {
        rule: &'static str,
        #[source]
        source: ParseError,
    },

    #[error("Rule '{rule}' re-parsed a tree that no longer serializes to its input")]
    ReparseMismatch { rule: &'static str },

    #[error("Unknown rule '{0}'")]
    UnknownRule(String),

    #[error("Invalid value {value} for rule '{rule}'")]
    InvalidValue { rule: String, value: String },

    #[error("Rules cannot be ordered, run-before cycle through: {0}")]
    Cycle(String),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Configuration values a rule accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accepts {
    pub boolean: &'static [bool],
}

impl Accepts {
    /// Only `true` turns the rule on
    pub const TRUE_ONLY: Accepts = Accepts { boolean: &[true] };

    pub fn allows(&self, value: &ConfigValue) -> bool {
        match value {
            ConfigValue::Bool(b) => self.boolean.contains(b),
            _ => false,
        }
    }
}

/// A code-style rule applied to a stylesheet tree
pub trait Rule: Send + Sync {
    /// Name used in configuration
    fn name(&self) -> &'static str;

    /// Human-readable description
    fn description(&self) -> &'static str;

    /// Name of a rule that must run after this one
    fn run_before(&self) -> Option<&'static str> {
        None
    }

    /// Dialects this rule can be applied to
    fn syntax(&self) -> &'static [Syntax];

    /// Configuration values this rule accepts
    fn accepts(&self) -> Accepts {
        Accepts::TRUE_ONLY
    }

    /// Rewrite the tree in place
    fn process(&self, tree: &mut Node) -> Result<(), RuleError>;

    /// Inspect the tree, one vote per examined block in document order
    fn detect(&self, tree: &Node) -> Result<Vec<bool>, RuleError>;

    fn supports(&self, syntax: Syntax) -> bool {
        self.syntax().contains(&syntax)
    }

    /// Fail when the tree's dialect is outside `syntax()`
    fn check_syntax(&self, tree: &Node) -> Result<(), RuleError> {
        if self.supports(tree.syntax) {
            Ok(())
        } else {
            Err(RuleError::UnsupportedDialect {
                rule: self.name(),
                syntax: tree.syntax,
            })
        }
    }
}

/// Serialize `tree` and parse it again so every span is accurate
///
/// The tree keeps its kind; its content and span are replaced.
pub(crate) fn reparse(rule: &'static str, tree: &mut Node) -> Result<(), RuleError> {
    let text = tree.to_string();
    let fresh = parse(&text, tree.syntax).map_err(|source| RuleError::Reparse { rule, source })?;
    if fresh.to_string() != text {
        return Err(RuleError::ReparseMismatch { rule });
    }
    tree.content = fresh.content;
    tree.start = fresh.start;
    tree.end = fresh.end;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use stylecomb_core::NodeKind;

    #[test]
    fn test_accepts_true_only() {
        let accepts = Accepts::TRUE_ONLY;
        assert!(accepts.allows(&ConfigValue::Bool(true)));
        assert!(!accepts.allows(&ConfigValue::Bool(false)));
        assert!(!accepts.allows(&ConfigValue::Number(1)));
        assert!(!accepts.allows(&ConfigValue::String("true".into())));
    }

    #[test]
    fn test_reparse_refreshes_positions() {
        let mut tree = parse("a {\n  b: c;\n}", Syntax::Css).unwrap();
        tree.traverse_by_kind_mut(NodeKind::Block, |block, _| {
            block.insert(1, Node::space("    ", Syntax::Css));
        });

        reparse("test", &mut tree).unwrap();

        let mut columns = Vec::new();
        tree.traverse_by_kind(NodeKind::PropertyDelimiter, |node, _, _| columns.push(node.start.column));
        assert_eq!(columns, vec![8]);
        assert_eq!(tree.kind, NodeKind::Stylesheet);
    }

    #[test]
    fn test_reparse_reports_parse_failure() {
        let mut tree = parse("a { b: c; }", Syntax::Css).unwrap();
        tree.insert(0, Node::leaf(NodeKind::Raw, "}", Syntax::Css));

        let err = reparse("test", &mut tree).unwrap_err();
        assert!(matches!(err, RuleError::Reparse { rule: "test", .. }));
    }

    #[test]
    fn test_error_messages() {
        let err = RuleError::UnsupportedDialect {
            rule: "inline-single-declarations",
            syntax: Syntax::Sass,
        };
        assert_eq!(
            err.to_string(),
            "Rule 'inline-single-declarations' does not support sass syntax"
        );
        assert_eq!(RuleError::UnknownRule("x".into()).to_string(), "Unknown rule 'x'");
    }
}
