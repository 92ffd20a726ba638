//! Collapse blocks holding a single declaration onto one line

use stylecomb_core::{Node, NodeKind, Syntax};

use crate::rules::{Rule, RuleError};

/// Removes the whitespace of blocks with at most one declaration or nested ruleset
///
/// Sass is not supported: its blocks are delimited by indentation alone.
/// Blocks holding a `//` comment are left alone since the comment runs to the
/// end of its line.
pub struct InlineSingleDeclarationsRule;

impl Rule for InlineSingleDeclarationsRule {
    fn name(&self) -> &'static str {
        "inline-single-declarations"
    }

    fn description(&self) -> &'static str {
        "Put blocks with a single declaration on one line"
    }

    fn syntax(&self) -> &'static [Syntax] {
        &[Syntax::Css, Syntax::Less, Syntax::Scss]
    }

    fn process(&self, tree: &mut Node) -> Result<(), RuleError> {
        self.check_syntax(tree)?;
        tree.traverse_by_kind_mut(NodeKind::Block, |block, _| {
            if is_inlinable(block) {
                block.retain_children(|child| !child.is(NodeKind::Space));
            }
        });
        Ok(())
    }

    fn detect(&self, tree: &Node) -> Result<Vec<bool>, RuleError> {
        self.check_syntax(tree)?;
        let mut detected = Vec::new();
        tree.traverse_by_kind(NodeKind::Block, |block, _, _| {
            if is_inlinable(block) {
                detected.push(block.first(NodeKind::Space).is_none());
            }
        });
        Ok(detected)
    }
}

fn is_inlinable(block: &Node) -> bool {
    let statements = block
        .children()
        .iter()
        .filter(|child| child.is(NodeKind::Declaration) || child.is(NodeKind::Ruleset))
        .count();
    statements <= 1 && block.first(NodeKind::SinglelineComment).is_none()
}
