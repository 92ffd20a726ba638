//! Extra-indent measurement
//!
//! Measures how far whitespace and multiline comments sitting in front of a
//! node push it to the right on its final line. A line break or a tab ends
//! the measurement: only what follows the last one counts.

use stylecomb_core::{Node, NodeKind};

/// Width of the `/*` and `*/` markers around a comment's text
pub const COMMENT_MARKERS: usize = 4;

/// Result of measuring the nodes in front of a target
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtraIndent {
    /// Columns contributed on the target's final line
    pub width: usize,
    /// Whether a line break or tab was seen while measuring
    pub line_break: bool,
}

/// Measure `nodes`, given in document order, scanning from the last one back
///
/// Spaces contribute what follows their last break. A comment contributes its
/// full width with markers when it has no break, otherwise the part after its
/// last break plus the closing marker. Other kinds contribute nothing but may
/// still report a break.
pub fn extra_indent<'a, I>(nodes: I) -> ExtraIndent
where
    I: DoubleEndedIterator<Item = &'a Node>,
{
    let mut result = ExtraIndent::default();
    for node in nodes.rev() {
        let Some(text) = node.text() else {
            continue;
        };
        let (head, tail) = split_final_line(text);
        let has_break = !head.is_empty();
        if has_break {
            result.line_break = true;
        }

        match node.kind {
            NodeKind::Space => {
                result.width += tail.chars().count();
                if has_break {
                    break;
                }
            }
            NodeKind::MultilineComment => {
                if has_break {
                    // the break itself does not count, the closing marker does
                    result.width += tail.chars().count() + COMMENT_MARKERS / 2;
                    break;
                }
                result.width += text.chars().count() + COMMENT_MARKERS;
            }
            _ => {}
        }
    }
    result
}

/// Split `text` after its last line break or tab
///
/// The first part ends with the break, or is empty when there is none.
pub fn split_final_line(text: &str) -> (&str, &str) {
    match text.rfind(['\n', '\t']) {
        Some(pos) => text.split_at(pos + 1),
        None => ("", text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stylecomb_core::Syntax;

    fn space(text: &str) -> Node {
        Node::space(text, Syntax::Css)
    }

    fn comment(text: &str) -> Node {
        Node::leaf(NodeKind::MultilineComment, text, Syntax::Css)
    }

    fn measure(nodes: &[Node]) -> ExtraIndent {
        extra_indent(nodes.iter())
    }

    #[test]
    fn test_split_final_line() {
        assert_eq!(split_final_line("\n  "), ("\n", "  "));
        assert_eq!(split_final_line("  \n\n    "), ("  \n\n", "    "));
        assert_eq!(split_final_line("\t  "), ("\t", "  "));
        assert_eq!(split_final_line("   "), ("", "   "));
        assert_eq!(split_final_line(""), ("", ""));
    }

    #[test]
    fn test_space_after_break() {
        let result = measure(&[space("\n    ")]);
        assert_eq!(result, ExtraIndent { width: 4, line_break: true });
    }

    #[test]
    fn test_space_without_break() {
        let result = measure(&[space("   ")]);
        assert_eq!(result, ExtraIndent { width: 3, line_break: false });
    }

    #[test]
    fn test_stops_at_first_break_from_the_end() {
        // the leading space is never reached
        let result = measure(&[space("\n      "), space("\n  "), space(" ")]);
        assert_eq!(result, ExtraIndent { width: 3, line_break: true });
    }

    #[test]
    fn test_comment_on_same_line() {
        // "/* x */" is 7 columns, plus the space after it
        let result = measure(&[space("\n  "), comment(" x "), space(" ")]);
        assert_eq!(result, ExtraIndent { width: 2 + 7 + 1, line_break: true });
    }

    #[test]
    fn test_comment_spanning_lines() {
        // only "ab" and the closing "*/" sit on the final line
        let result = measure(&[space("    "), comment(" first\nab"), space(" ")]);
        assert_eq!(result, ExtraIndent { width: 2 + 2 + 1, line_break: true });
    }

    #[test]
    fn test_tab_counts_as_break() {
        let result = measure(&[space("\t ")]);
        assert_eq!(result, ExtraIndent { width: 1, line_break: true });
    }

    #[test]
    fn test_other_kinds_contribute_nothing() {
        let colon = Node::leaf(NodeKind::PropertyDelimiter, ":", Syntax::Css);
        let value = Node::branch(NodeKind::Value, vec![], Syntax::Css);
        let result = measure(&[colon, value, space("  ")]);
        assert_eq!(result, ExtraIndent { width: 2, line_break: false });
        assert_eq!(measure(&[]), ExtraIndent::default());
    }
}
