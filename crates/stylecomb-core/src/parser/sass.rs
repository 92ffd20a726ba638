//! Indentation-based parsing for the sass dialect
//!
//! Each newline becomes a `DeclarationDelimiter` and each line's indentation a
//! `Space`, both owned by the container the line belongs to. A line followed
//! by more deeply indented lines opens a block that runs from the newline
//! after it through the last deeper line.

use super::lexer::{Token, TokenKind};
use super::{atrule, declaration, leaf, ruleset, ParseError};
use crate::node::{Node, NodeKind};
use crate::syntax::Syntax;

struct Line<'t> {
    /// The newline that ends the previous line
    newline: Option<&'t Token>,
    indent: Option<&'t Token>,
    body: &'t [Token],
}

impl Line<'_> {
    fn is_blank(&self) -> bool {
        self.body.is_empty()
    }

    fn width(&self) -> usize {
        self.indent.map_or(0, |t| t.text.chars().count())
    }

    fn starts_with_comment(&self) -> bool {
        self.body
            .first()
            .is_some_and(|t| matches!(t.kind, TokenKind::Comment | TokenKind::LineComment))
    }
}

pub(super) fn parse_lines(tokens: &[Token]) -> Result<Vec<Node>, ParseError> {
    let lines = split_lines(tokens);
    container(&lines)
}

fn split_lines(tokens: &[Token]) -> Vec<Line<'_>> {
    let mut lines = Vec::new();
    let mut newline = None;
    let mut start = 0;
    for (i, token) in tokens.iter().enumerate() {
        if token.is(TokenKind::Newline) {
            lines.push(line(newline, &tokens[start..i]));
            newline = Some(token);
            start = i + 1;
        }
    }
    lines.push(line(newline, &tokens[start..]));
    lines
}

fn line<'t>(newline: Option<&'t Token>, tokens: &'t [Token]) -> Line<'t> {
    match tokens.split_first() {
        Some((first, rest)) if first.is(TokenKind::Whitespace) => Line {
            newline,
            indent: Some(first),
            body: rest,
        },
        _ => Line {
            newline,
            indent: None,
            body: tokens,
        },
    }
}

fn container(lines: &[Line<'_>]) -> Result<Vec<Node>, ParseError> {
    let syntax = Syntax::Sass;
    let mut nodes = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        let current = &lines[i];
        if let Some(newline) = current.newline {
            nodes.push(leaf(NodeKind::DeclarationDelimiter, "\n", newline, syntax));
        }
        if let Some(indent) = current.indent {
            nodes.push(leaf(NodeKind::Space, &indent.text, indent, syntax));
        }
        if current.is_blank() {
            i += 1;
            continue;
        }

        let nested = last_nested(lines, i).filter(|_| !current.starts_with_comment());
        match nested {
            Some(last) => {
                let block = Node::branch(NodeKind::Block, container(&lines[i + 1..=last])?, syntax);
                if current.body[0].is(TokenKind::AtKeyword) {
                    nodes.extend(atrule(current.body, Some(block), syntax)?);
                } else {
                    nodes.push(ruleset(current.body, block, syntax));
                }
                i = last + 1;
            }
            None => {
                if current.body[0].is(TokenKind::AtKeyword) {
                    nodes.extend(atrule(current.body, None, syntax)?);
                } else {
                    nodes.extend(declaration(current.body, syntax)?);
                }
                i += 1;
            }
        }
    }
    Ok(nodes)
}

/// Index of the last line nested under `lines[index]`, if any line is
fn last_nested(lines: &[Line<'_>], index: usize) -> Option<usize> {
    let width = lines[index].width();
    let mut last = None;
    for (offset, line) in lines[index + 1..].iter().enumerate() {
        if line.is_blank() {
            continue;
        }
        if line.width() <= width {
            break;
        }
        last = Some(index + 1 + offset);
    }
    last
}
