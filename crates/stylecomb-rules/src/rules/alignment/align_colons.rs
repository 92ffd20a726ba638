//! Align the colons of the declarations in a block

use stylecomb_core::{Node, NodeKind, Syntax};
use tracing::trace;

use crate::rules::{reparse, Rule, RuleError};

/// Pads the space before each colon so all colons of a block share one column
///
/// Only the first declaration on each line takes part: padding it would shift
/// any later declaration on the same line, which could then never line up.
pub struct AlignColonsRule;

impl Rule for AlignColonsRule {
    fn name(&self) -> &'static str {
        "align-colons"
    }

    fn description(&self) -> &'static str {
        "Align the colons of declarations within a block"
    }

    fn syntax(&self) -> &'static [Syntax] {
        Syntax::ALL
    }

    fn process(&self, tree: &mut Node) -> Result<(), RuleError> {
        self.check_syntax(tree)?;
        reparse(self.name(), tree)?;

        tree.traverse_by_kind_mut(NodeKind::Block, |block, _| {
            let colons = colon_columns(block);
            let Some(max) = colons.iter().map(|&(_, column)| column).max() else {
                return;
            };
            trace!(declarations = colons.len(), column = max, "aligning colons");

            for (index, column) in colons {
                if let Some(declaration) = block.get_mut(index) {
                    pad_before_colon(declaration, max - column);
                }
            }
        });
        Ok(())
    }

    fn detect(&self, tree: &Node) -> Result<Vec<bool>, RuleError> {
        self.check_syntax(tree)?;
        let mut tree = tree.clone();
        reparse(self.name(), &mut tree)?;

        let mut detected = Vec::new();
        tree.traverse_by_kind(NodeKind::Block, |block, _, _| {
            let colons = colon_columns(block);
            let aligned = colons
                .first()
                .map_or(true, |&(_, first)| colons.iter().all(|&(_, column)| column == first));
            detected.push(aligned);
        });
        Ok(detected)
    }
}

/// `(child index, colon column)` of each declaration that starts a new line of declarations
///
/// Declarations without a colon are skipped.
fn colon_columns(block: &Node) -> Vec<(usize, usize)> {
    let mut columns = Vec::new();
    let mut previous_line = None;
    for (index, declaration) in block.children_of_kind(NodeKind::Declaration) {
        let Some(colon) = declaration.first(NodeKind::PropertyDelimiter) else {
            continue;
        };
        if previous_line != Some(colon.start.line) {
            columns.push((index, colon.start.column));
        }
        previous_line = Some(colon.start.line);
    }
    columns
}

/// Append `width` spaces to the whitespace before the colon, creating it if needed
fn pad_before_colon(declaration: &mut Node, width: usize) {
    if width == 0 {
        return;
    }
    let Some(colon) = declaration.first_index(NodeKind::PropertyDelimiter) else {
        return;
    };
    let padding = " ".repeat(width);
    let space = colon
        .checked_sub(1)
        .and_then(|i| declaration.get_mut(i))
        .filter(|node| node.is(NodeKind::Space));
    match space.and_then(Node::text_mut) {
        Some(text) => text.push_str(&padding),
        None => {
            let syntax = declaration.syntax;
            declaration.insert(colon, Node::space(padding, syntax));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stylecomb_core::parse;

    fn process(source: &str, syntax: Syntax) -> String {
        let mut tree = parse(source, syntax).unwrap();
        AlignColonsRule.process(&mut tree).unwrap();
        tree.to_string()
    }

    fn detect(source: &str, syntax: Syntax) -> Vec<bool> {
        let tree = parse(source, syntax).unwrap();
        AlignColonsRule.detect(&tree).unwrap()
    }

    #[test]
    fn test_aligns_to_longest_property() {
        let output = process("a {\n  color: #fff;\n  background-color: #000000;\n}", Syntax::Css);
        assert_eq!(
            output,
            "a {\n  color           : #fff;\n  background-color: #000000;\n}"
        );
    }

    #[test]
    fn test_keeps_existing_space_before_colon() {
        let output = process("a {\n  top : 0;\n  bottom: 0;\n}", Syntax::Css);
        assert_eq!(output, "a {\n  top   : 0;\n  bottom: 0;\n}");
    }

    #[test]
    fn test_blocks_are_aligned_independently() {
        let output = process(
            "a {\n  width: 1px;\n  b {\n    z-index: 1;\n    top: 0;\n  }\n}",
            Syntax::Scss,
        );
        assert_eq!(
            output,
            "a {\n  width: 1px;\n  b {\n    z-index: 1;\n    top    : 0;\n  }\n}"
        );
    }

    #[test]
    fn test_declarations_sharing_a_line_are_left_alone() {
        let source = "a { color: red; background: blue; }";
        assert_eq!(process(source, Syntax::Css), source);
    }

    #[test]
    fn test_declaration_without_value() {
        let output = process("a {\n  color:;\n  margin-top: 0;\n}", Syntax::Css);
        assert_eq!(output, "a {\n  color     :;\n  margin-top: 0;\n}");
    }

    #[test]
    fn test_sass() {
        let output = process("a\n  color: red\n  z-index: 2\n", Syntax::Sass);
        assert_eq!(output, "a\n  color  : red\n  z-index: 2\n");
    }

    #[test]
    fn test_idempotent() {
        let once = process("a {\n  color: red;\n  padding-left: 0;\n}", Syntax::Less);
        assert_eq!(process(&once, Syntax::Less), once);
    }

    #[test]
    fn test_detect() {
        assert_eq!(detect("a {\n  top   : 0;\n  bottom: 0;\n}", Syntax::Css), vec![true]);
        assert_eq!(detect("a {\n  top: 0;\n  bottom: 0;\n}", Syntax::Css), vec![false]);
        // empty and single-declaration blocks are trivially aligned
        assert_eq!(detect("a { } b { c: d }", Syntax::Css), vec![true, true]);
    }

    #[test]
    fn test_detect_does_not_mutate() {
        let mut tree = parse("a {\n  top: 0;\n  bottom: 0;\n}", Syntax::Css).unwrap();
        tree.traverse_by_kind_mut(NodeKind::Block, |block, _| {
            block.insert(1, Node::space("  ", Syntax::Css));
        });
        let before = tree.clone();
        AlignColonsRule.detect(&tree).unwrap();
        assert_eq!(tree, before);
    }
}
