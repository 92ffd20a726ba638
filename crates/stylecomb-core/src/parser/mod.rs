//! Stylesheet parser
//!
//! Builds a lossless tree: serializing the result of [`parse`] reproduces the
//! input exactly. Brace dialects (css, less, scss) go through a recursive
//! block parser; sass is parsed line by line from its indentation.

mod lexer;
mod sass;

use thiserror::Error;

use crate::node::{Node, NodeKind};
use crate::syntax::Syntax;
use lexer::{Lexer, Token, TokenKind};

/// Error produced when a source text cannot be turned into a tree
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unterminated comment starting at line {line}, column {column}")]
    UnterminatedComment { line: usize, column: usize },

    #[error("Unterminated string starting at line {line}, column {column}")]
    UnterminatedString { line: usize, column: usize },

    #[error("Unexpected '{found}' at line {line}, column {column}")]
    UnexpectedToken { found: String, line: usize, column: usize },

    #[error("Unclosed {what} opened at line {line}, column {column}")]
    Unclosed { what: &'static str, line: usize, column: usize },
}

impl ParseError {
    fn unexpected(token: &Token) -> Self {
        ParseError::UnexpectedToken {
            found: token.text.clone(),
            line: token.start.line,
            column: token.start.column,
        }
    }

    fn unclosed(what: &'static str, token: &Token) -> Self {
        ParseError::Unclosed {
            what,
            line: token.start.line,
            column: token.start.column,
        }
    }
}

/// Parse `source` written in `syntax` into a `Stylesheet` tree
pub fn parse(source: &str, syntax: Syntax) -> Result<Node, ParseError> {
    let tokens = Lexer::new(source, syntax).tokenize()?;
    let children = if syntax.uses_braces() {
        BraceParser::new(&tokens, syntax).stylesheet()?
    } else {
        sass::parse_lines(&tokens)?
    };
    Ok(Node::branch(NodeKind::Stylesheet, children, syntax))
}

/// What ended a forward scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stop {
    /// `{` opens a block
    Block,
    /// `;`, `}` or end of input
    Statement,
}

/// Find the first `{`, `;` or `}` outside parentheses, starting at `from`
fn scan(tokens: &[Token], from: usize) -> (usize, Stop) {
    let mut depth = 0usize;
    for (offset, token) in tokens[from..].iter().enumerate() {
        match token.kind {
            TokenKind::LeftParen => depth += 1,
            TokenKind::RightParen => depth = depth.saturating_sub(1),
            TokenKind::LeftBrace if depth == 0 => return (from + offset, Stop::Block),
            TokenKind::Semicolon | TokenKind::RightBrace if depth == 0 => {
                return (from + offset, Stop::Statement)
            }
            _ => {}
        }
    }
    (tokens.len(), Stop::Statement)
}

struct BraceParser<'t> {
    tokens: &'t [Token],
    pos: usize,
    syntax: Syntax,
}

impl<'t> BraceParser<'t> {
    fn new(tokens: &'t [Token], syntax: Syntax) -> Self {
        Self { tokens, pos: 0, syntax }
    }

    fn stylesheet(&mut self) -> Result<Vec<Node>, ParseError> {
        self.items(None)
    }

    /// Parse block items until the `}` matching `open`, or end of input at the top level
    fn items(&mut self, open: Option<&Token>) -> Result<Vec<Node>, ParseError> {
        let mut nodes = Vec::new();
        loop {
            let Some(token) = self.tokens.get(self.pos) else {
                return match open {
                    Some(open) => Err(ParseError::unclosed("block", open)),
                    None => Ok(nodes),
                };
            };
            match token.kind {
                TokenKind::RightBrace => {
                    return match open {
                        Some(_) => Ok(nodes),
                        None => Err(ParseError::unexpected(token)),
                    };
                }
                TokenKind::Semicolon => {
                    nodes.push(token_node(token, self.syntax));
                    self.pos += 1;
                }
                _ if token.is_trivia() => {
                    nodes.push(token_node(token, self.syntax));
                    self.pos += 1;
                }
                _ => self.statement(&mut nodes)?,
            }
        }
    }

    fn statement(&mut self, nodes: &mut Vec<Node>) -> Result<(), ParseError> {
        let tokens = self.tokens;
        let start = self.pos;
        let (end, stop) = scan(tokens, start);
        let head = &tokens[start..end];
        let at_rule = tokens[start].is(TokenKind::AtKeyword);
        self.pos = end;

        if stop == Stop::Block {
            let open = &tokens[end];
            self.pos += 1;
            let children = self.items(Some(open))?;
            let close_end = tokens.get(self.pos).map_or(open.end, |close| close.end);
            self.pos += 1;
            let block = Node::branch(NodeKind::Block, children, self.syntax).with_span(open.start, close_end);
            if at_rule {
                nodes.extend(atrule(head, Some(block), self.syntax)?);
            } else {
                nodes.push(ruleset(head, block, self.syntax));
            }
        } else if at_rule && !self.is_less_variable(head) {
            nodes.extend(atrule(head, None, self.syntax)?);
        } else {
            nodes.extend(declaration(head, self.syntax)?);
        }
        Ok(())
    }

    /// `@name: value` declares a variable in less
    fn is_less_variable(&self, head: &[Token]) -> bool {
        self.syntax == Syntax::Less
            && head
                .iter()
                .skip(1)
                .find(|t| !t.is(TokenKind::Whitespace))
                .is_some_and(|t| t.is(TokenKind::Colon))
    }
}

/// Split off trailing whitespace and comments
fn split_trailing_trivia(tokens: &[Token]) -> (&[Token], &[Token]) {
    let keep = tokens.iter().rposition(|t| !t.is_trivia()).map_or(0, |i| i + 1);
    tokens.split_at(keep)
}

/// Split off leading whitespace and comments
fn split_leading_trivia(tokens: &[Token]) -> (&[Token], &[Token]) {
    let skip = tokens.iter().position(|t| !t.is_trivia()).unwrap_or(tokens.len());
    tokens.split_at(skip)
}

fn leaf(kind: NodeKind, text: &str, token: &Token, syntax: Syntax) -> Node {
    Node::leaf(kind, text, syntax).with_span(token.start, token.end)
}

/// Map a single token to the leaf that represents it
fn token_node(token: &Token, syntax: Syntax) -> Node {
    let text = token.text.as_str();
    match token.kind {
        TokenKind::Whitespace | TokenKind::Newline => leaf(NodeKind::Space, text, token, syntax),
        TokenKind::Comment => {
            let inner = text
                .strip_prefix("/*")
                .and_then(|t| t.strip_suffix("*/"))
                .unwrap_or(text);
            leaf(NodeKind::MultilineComment, inner, token, syntax)
        }
        TokenKind::LineComment => {
            leaf(NodeKind::SinglelineComment, text.strip_prefix("//").unwrap_or(text), token, syntax)
        }
        TokenKind::Ident => leaf(NodeKind::Ident, text, token, syntax),
        TokenKind::AtKeyword => leaf(NodeKind::Atkeyword, text, token, syntax),
        TokenKind::Hash if is_hex_color(text) => leaf(NodeKind::Color, text, token, syntax),
        TokenKind::Variable => leaf(NodeKind::Variable, text, token, syntax),
        TokenKind::String => leaf(NodeKind::String, text, token, syntax),
        TokenKind::Number => leaf(NodeKind::Number, text, token, syntax),
        TokenKind::Uri => leaf(NodeKind::Uri, text, token, syntax),
        TokenKind::Semicolon => leaf(NodeKind::DeclarationDelimiter, text, token, syntax),
        TokenKind::Comma => leaf(NodeKind::Delimiter, text, token, syntax),
        TokenKind::Delim('/' | '+' | '*' | '=' | '>' | '<' | '~') => {
            leaf(NodeKind::Operator, text, token, syntax)
        }
        _ => leaf(NodeKind::Raw, text, token, syntax),
    }
}

fn trivia_nodes(tokens: &[Token], syntax: Syntax) -> impl Iterator<Item = Node> + '_ {
    tokens.iter().map(move |t| token_node(t, syntax))
}

fn is_hex_color(text: &str) -> bool {
    let digits = text.trim_start_matches('#');
    matches!(digits.len(), 3 | 4 | 6 | 8) && digits.chars().all(|c| c.is_ascii_hexdigit())
}

/// `selector [trivia] block`
fn ruleset(head: &[Token], block: Node, syntax: Syntax) -> Node {
    let (selector, trailing) = split_trailing_trivia(head);
    let selector = Node::branch(
        NodeKind::Selector,
        selector.iter().map(|t| token_node(t, syntax)).collect(),
        syntax,
    );
    let mut children = vec![selector];
    children.extend(trivia_nodes(trailing, syntax));
    children.push(block);
    Node::branch(NodeKind::Ruleset, children, syntax)
}

/// `@keyword prelude [block]`
///
/// Without a block the trailing trivia is returned after the at-rule so it
/// stays a sibling, the way it does for declarations.
fn atrule(head: &[Token], block: Option<Node>, syntax: Syntax) -> Result<Vec<Node>, ParseError> {
    let Some((keyword, prelude)) = head.split_first() else {
        return Ok(Vec::new());
    };
    let mut children = vec![token_node(keyword, syntax)];
    match block {
        Some(block) => {
            let (prelude, trailing) = split_trailing_trivia(prelude);
            children.extend(value_nodes(prelude, syntax)?);
            children.extend(trivia_nodes(trailing, syntax));
            children.push(block);
            Ok(vec![Node::branch(NodeKind::Atrule, children, syntax)])
        }
        None => {
            let (prelude, trailing) = split_trailing_trivia(prelude);
            children.extend(value_nodes(prelude, syntax)?);
            let mut nodes = vec![Node::branch(NodeKind::Atrule, children, syntax)];
            nodes.extend(trivia_nodes(trailing, syntax));
            Ok(nodes)
        }
    }
}

/// `property [trivia] : [trivia] value`, followed by the value's trailing trivia
///
/// A statement without a top-level colon (a mixin call, a stray token run)
/// becomes a single `Raw` node.
fn declaration(head: &[Token], syntax: Syntax) -> Result<Vec<Node>, ParseError> {
    let (leading, rest) = split_leading_trivia(head);
    let (rest, trailing) = split_trailing_trivia(rest);
    let mut nodes: Vec<Node> = trivia_nodes(leading, syntax).collect();

    if rest.is_empty() {
        nodes.extend(trivia_nodes(trailing, syntax));
        return Ok(nodes);
    }

    let Some(colon) = top_level_colon(rest) else {
        nodes.push(raw_statement(rest, syntax));
        nodes.extend(trivia_nodes(trailing, syntax));
        return Ok(nodes);
    };

    let (property, property_trivia) = split_trailing_trivia(&rest[..colon]);
    let (value_trivia, value) = split_leading_trivia(&rest[colon + 1..]);

    let property = Node::branch(
        NodeKind::Property,
        property.iter().map(|t| property_node(t, syntax)).collect(),
        syntax,
    );
    let mut children = vec![property];
    children.extend(trivia_nodes(property_trivia, syntax));
    children.push(leaf(NodeKind::PropertyDelimiter, ":", &rest[colon], syntax));
    children.extend(trivia_nodes(value_trivia, syntax));
    children.push(Node::branch(NodeKind::Value, value_nodes(value, syntax)?, syntax));

    nodes.push(Node::branch(NodeKind::Declaration, children, syntax));
    nodes.extend(trivia_nodes(trailing, syntax));
    Ok(nodes)
}

fn top_level_colon(tokens: &[Token]) -> Option<usize> {
    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate() {
        match token.kind {
            TokenKind::LeftParen => depth += 1,
            TokenKind::RightParen => depth = depth.saturating_sub(1),
            TokenKind::Colon if depth == 0 => return Some(i),
            _ => {}
        }
    }
    None
}

fn property_node(token: &Token, syntax: Syntax) -> Node {
    match token.kind {
        // less variables are declared as `@name: value`
        TokenKind::AtKeyword => leaf(NodeKind::Variable, &token.text, token, syntax),
        _ => token_node(token, syntax),
    }
}

fn raw_statement(tokens: &[Token], syntax: Syntax) -> Node {
    let text: String = tokens.iter().map(|t| t.text.as_str()).collect();
    let node = Node::leaf(NodeKind::Raw, text, syntax);
    match (tokens.first(), tokens.last()) {
        (Some(first), Some(last)) => node.with_span(first.start, last.end),
        _ => node,
    }
}

/// Parse value tokens into leaves, functions and parenthesized groups
fn value_nodes(tokens: &[Token], syntax: Syntax) -> Result<Vec<Node>, ParseError> {
    let mut pos = 0;
    value_sequence(tokens, &mut pos, syntax, None)
}

fn value_sequence(
    tokens: &[Token],
    pos: &mut usize,
    syntax: Syntax,
    open: Option<&Token>,
) -> Result<Vec<Node>, ParseError> {
    let mut nodes = Vec::new();
    while let Some(token) = tokens.get(*pos) {
        match token.kind {
            TokenKind::RightParen => {
                return match open {
                    Some(_) => Ok(nodes),
                    None => Err(ParseError::unexpected(token)),
                };
            }
            TokenKind::LeftParen => {
                *pos += 1;
                let inner = value_sequence(tokens, pos, syntax, Some(token))?;
                let close_end = tokens.get(*pos).map_or(token.end, |close| close.end);
                *pos += 1;
                nodes.push(Node::branch(NodeKind::Parentheses, inner, syntax).with_span(token.start, close_end));
            }
            TokenKind::Ident if tokens.get(*pos + 1).is_some_and(|t| t.is(TokenKind::LeftParen)) => {
                let name = token_node(token, syntax);
                let paren = &tokens[*pos + 1];
                *pos += 2;
                let inner = value_sequence(tokens, pos, syntax, Some(paren))?;
                let close_end = tokens.get(*pos).map_or(paren.end, |close| close.end);
                *pos += 1;
                let arguments = Node::branch(NodeKind::Arguments, inner, syntax).with_span(paren.start, close_end);
                nodes.push(Node::branch(NodeKind::Function, vec![name, arguments], syntax));
            }
            TokenKind::Delim('!') => match important_end(tokens, *pos) {
                Some(last) => {
                    let text: String = tokens[*pos..=last].iter().map(|t| t.text.as_str()).collect();
                    let end = tokens[last].end;
                    nodes.push(Node::leaf(NodeKind::Important, text, syntax).with_span(token.start, end));
                    *pos = last + 1;
                }
                None => {
                    nodes.push(token_node(token, syntax));
                    *pos += 1;
                }
            },
            _ => {
                nodes.push(token_node(token, syntax));
                *pos += 1;
            }
        }
    }
    match open {
        Some(open) => Err(ParseError::unclosed("parentheses", open)),
        None => Ok(nodes),
    }
}

/// Index of the `important` identifier completing `!important` at `bang`
fn important_end(tokens: &[Token], bang: usize) -> Option<usize> {
    let mut index = bang + 1;
    if tokens.get(index).is_some_and(|t| t.is(TokenKind::Whitespace)) {
        index += 1;
    }
    tokens
        .get(index)
        .filter(|t| t.is(TokenKind::Ident) && t.text.eq_ignore_ascii_case("important"))
        .map(|_| index)
}
