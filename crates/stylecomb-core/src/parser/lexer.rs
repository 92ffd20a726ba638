//! Stylesheet lexer - tokenizes css/less/sass/scss input
//!
//! Every token keeps its exact source text so the parser can rebuild the
//! input byte for byte.

use std::iter::Peekable;
use std::str::Chars;

use super::ParseError;
use crate::node::Position;
use crate::syntax::Syntax;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Run of spaces, tabs, carriage returns and form feeds (and newlines outside sass)
    Whitespace,
    /// A single `\n` (sass only)
    Newline,
    /// `/* ... */`
    Comment,
    /// `// ...` up to, not including, the newline
    LineComment,
    Ident,
    /// `@name`
    AtKeyword,
    /// `#name`
    Hash,
    /// `$name`
    Variable,
    String,
    Number,
    /// Unquoted `url(...)`
    Uri,
    Colon,
    Semicolon,
    Comma,
    LeftBrace,
    RightBrace,
    LeftParen,
    RightParen,
    Delim(char),
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub start: Position,
    pub end: Position,
}

impl Token {
    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    pub fn is_trivia(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Whitespace | TokenKind::Comment | TokenKind::LineComment
        )
    }
}

pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    syntax: Syntax,
    line: usize,
    column: usize,
    /// Position of the most recently consumed character
    last: Position,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str, syntax: Syntax) -> Self {
        Self {
            chars: input.chars().peekable(),
            syntax,
            line: 1,
            column: 1,
            last: Position::new(1, 1),
        }
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>, ParseError> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.chars.next()?;
        self.last = self.position();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.chars.clone().nth(n)
    }

    fn bump_into(&mut self, text: &mut String) {
        if let Some(ch) = self.advance() {
            text.push(ch);
        }
    }

    fn next_token(&mut self) -> Result<Option<Token>, ParseError> {
        let start = self.position();
        let Some(ch) = self.peek() else {
            return Ok(None);
        };

        let mut text = String::new();
        let kind = match ch {
            '\n' if self.syntax == Syntax::Sass => {
                self.bump_into(&mut text);
                TokenKind::Newline
            }
            c if is_whitespace(c) => {
                self.read_whitespace(&mut text);
                TokenKind::Whitespace
            }
            '/' if self.peek_nth(1) == Some('*') => {
                self.read_comment(&mut text, start)?;
                TokenKind::Comment
            }
            '/' if self.peek_nth(1) == Some('/') && self.syntax.has_line_comments() => {
                while let Some(c) = self.peek() {
                    if c == '\n' {
                        break;
                    }
                    self.bump_into(&mut text);
                }
                TokenKind::LineComment
            }
            '"' | '\'' => {
                self.read_string(&mut text, ch, start)?;
                TokenKind::String
            }
            c if c.is_ascii_digit() => {
                self.read_number(&mut text);
                TokenKind::Number
            }
            '.' if self.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) => {
                self.read_number(&mut text);
                TokenKind::Number
            }
            '+' | '-' if self.starts_signed_number() => {
                self.bump_into(&mut text);
                self.read_number(&mut text);
                TokenKind::Number
            }
            _ if self.starts_ident(0) => {
                self.read_ident(&mut text);
                if text.eq_ignore_ascii_case("url") && self.starts_unquoted_url() {
                    self.read_url(&mut text, start)?;
                    TokenKind::Uri
                } else {
                    TokenKind::Ident
                }
            }
            '@' if self.starts_ident(1) => {
                self.bump_into(&mut text);
                self.read_ident(&mut text);
                TokenKind::AtKeyword
            }
            '$' if self.starts_ident(1) => {
                self.bump_into(&mut text);
                self.read_ident(&mut text);
                TokenKind::Variable
            }
            '#' if self.peek_nth(1).is_some_and(is_name_char) => {
                self.bump_into(&mut text);
                self.read_ident(&mut text);
                TokenKind::Hash
            }
            _ => {
                self.bump_into(&mut text);
                match ch {
                    ':' => TokenKind::Colon,
                    ';' => TokenKind::Semicolon,
                    ',' => TokenKind::Comma,
                    '{' => TokenKind::LeftBrace,
                    '}' => TokenKind::RightBrace,
                    '(' => TokenKind::LeftParen,
                    ')' => TokenKind::RightParen,
                    other => TokenKind::Delim(other),
                }
            }
        };

        Ok(Some(Token {
            kind,
            text,
            start,
            end: self.last,
        }))
    }

    fn read_whitespace(&mut self, text: &mut String) {
        while let Some(c) = self.peek() {
            if !is_whitespace(c) || (c == '\n' && self.syntax == Syntax::Sass) {
                break;
            }
            self.bump_into(text);
        }
    }

    fn read_comment(&mut self, text: &mut String, start: Position) -> Result<(), ParseError> {
        // Opening `/*`
        self.bump_into(text);
        self.bump_into(text);
        loop {
            match self.peek() {
                None => {
                    return Err(ParseError::UnterminatedComment {
                        line: start.line,
                        column: start.column,
                    })
                }
                Some('*') if self.peek_nth(1) == Some('/') => {
                    self.bump_into(text);
                    self.bump_into(text);
                    return Ok(());
                }
                Some(_) => self.bump_into(text),
            }
        }
    }

    fn read_string(&mut self, text: &mut String, quote: char, start: Position) -> Result<(), ParseError> {
        self.bump_into(text);
        loop {
            match self.peek() {
                None => {
                    return Err(ParseError::UnterminatedString {
                        line: start.line,
                        column: start.column,
                    })
                }
                Some('\\') => {
                    self.bump_into(text);
                    self.bump_into(text);
                }
                Some(c) => {
                    self.bump_into(text);
                    if c == quote {
                        return Ok(());
                    }
                }
            }
        }
    }

    fn read_number(&mut self, text: &mut String) {
        let mut seen_dot = false;
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                self.bump_into(text);
            } else if c == '.' && !seen_dot && self.peek_nth(1).is_some_and(|n| n.is_ascii_digit()) {
                seen_dot = true;
                self.bump_into(text);
            } else {
                break;
            }
        }
        // Unit or percentage
        if self.peek() == Some('%') {
            self.bump_into(text);
        } else if self.starts_ident(0) {
            self.read_ident(text);
        }
    }

    fn read_ident(&mut self, text: &mut String) {
        while let Some(c) = self.peek() {
            match c {
                '\\' => {
                    self.bump_into(text);
                    self.bump_into(text);
                }
                '#' | '@' if self.peek_nth(1) == Some('{') => self.read_interpolation(text),
                c if is_name_char(c) => self.bump_into(text),
                _ => break,
            }
        }
    }

    /// `#{...}` (scss) or `@{...}` (less), kept inside the surrounding identifier
    fn read_interpolation(&mut self, text: &mut String) {
        self.bump_into(text);
        let mut depth = 0usize;
        while let Some(c) = self.peek() {
            self.bump_into(text);
            match c {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return;
                    }
                }
                _ => {}
            }
        }
    }

    fn read_url(&mut self, text: &mut String, start: Position) -> Result<(), ParseError> {
        loop {
            match self.peek() {
                None => {
                    return Err(ParseError::Unclosed {
                        what: "url",
                        line: start.line,
                        column: start.column,
                    })
                }
                Some(')') => {
                    self.bump_into(text);
                    return Ok(());
                }
                Some(_) => self.bump_into(text),
            }
        }
    }

    /// Whether an identifier starts `offset` characters ahead
    fn starts_ident(&self, offset: usize) -> bool {
        let mut ahead = self.chars.clone().skip(offset);
        let first = ahead.next();
        let second = ahead.next();
        match first {
            Some('-') => matches!(second, Some(c) if is_name_start(c) || c == '-' || c == '\\')
                || (second == Some('#') && ahead.next() == Some('{')),
            Some('\\') => second.is_some(),
            Some('#') | Some('@') => second == Some('{'),
            Some(c) => is_name_start(c),
            None => false,
        }
    }

    fn starts_signed_number(&self) -> bool {
        let mut ahead = self.chars.clone().skip(1);
        match ahead.next() {
            Some(c) if c.is_ascii_digit() => true,
            Some('.') => ahead.next().is_some_and(|c| c.is_ascii_digit()),
            _ => false,
        }
    }

    fn starts_unquoted_url(&self) -> bool {
        let mut ahead = self.chars.clone();
        if ahead.next() != Some('(') {
            return false;
        }
        let next = ahead.find(|c| !is_whitespace(*c));
        !matches!(next, Some('"') | Some('\''))
    }
}

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0c')
}

fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

fn is_name_char(c: char) -> bool {
    is_name_start(c) || c.is_ascii_digit() || c == '-'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str, syntax: Syntax) -> Vec<TokenKind> {
        Lexer::new(input, syntax)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_declaration_tokens() {
        assert_eq!(
            kinds("color: #fff;", Syntax::Css),
            vec![
                TokenKind::Ident,
                TokenKind::Colon,
                TokenKind::Whitespace,
                TokenKind::Hash,
                TokenKind::Semicolon,
            ]
        );
    }

    #[test]
    fn test_vendor_prefixed_ident() {
        let tokens = Lexer::new("-webkit-transform", Syntax::Css).tokenize().unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Ident);
        assert_eq!(tokens[0].text, "-webkit-transform");
    }

    #[test]
    fn test_numbers() {
        assert_eq!(kinds("10px", Syntax::Css), vec![TokenKind::Number]);
        assert_eq!(kinds("-1.5em", Syntax::Css), vec![TokenKind::Number]);
        assert_eq!(kinds(".5", Syntax::Css), vec![TokenKind::Number]);
        assert_eq!(kinds("50%", Syntax::Css), vec![TokenKind::Number]);
    }

    #[test]
    fn test_positions_track_lines_and_columns() {
        let tokens = Lexer::new("a {\n  color: red;\n}", Syntax::Css).tokenize().unwrap();
        let colon = tokens.iter().find(|t| t.is(TokenKind::Colon)).unwrap();
        assert_eq!(colon.start, Position::new(2, 8));
        assert_eq!(colon.end, Position::new(2, 8));

        let color = tokens.iter().find(|t| t.text == "color").unwrap();
        assert_eq!(color.start, Position::new(2, 3));
        assert_eq!(color.end, Position::new(2, 7));
    }

    #[test]
    fn test_comments() {
        assert_eq!(kinds("/* a */", Syntax::Css), vec![TokenKind::Comment]);
        assert_eq!(
            kinds("// a\nb", Syntax::Scss),
            vec![TokenKind::LineComment, TokenKind::Whitespace, TokenKind::Ident]
        );
        // css has no line comments
        assert_eq!(kinds("//", Syntax::Css), vec![TokenKind::Delim('/'), TokenKind::Delim('/')]);
    }

    #[test]
    fn test_unterminated_comment() {
        let err = Lexer::new("a { /* b", Syntax::Css).tokenize().unwrap_err();
        assert!(matches!(err, ParseError::UnterminatedComment { line: 1, column: 5 }));
    }

    #[test]
    fn test_unterminated_string() {
        let err = Lexer::new("a { content: \"x", Syntax::Css).tokenize().unwrap_err();
        assert!(matches!(err, ParseError::UnterminatedString { .. }));
    }

    #[test]
    fn test_unquoted_url_is_one_token() {
        let tokens = Lexer::new("url(data:image/png;base64,AA==)", Syntax::Css).tokenize().unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Uri);

        // quoted urls stay a function call
        assert_eq!(
            kinds("url(\"a.png\")", Syntax::Css),
            vec![TokenKind::Ident, TokenKind::LeftParen, TokenKind::String, TokenKind::RightParen]
        );
    }

    #[test]
    fn test_sass_splits_newlines() {
        assert_eq!(
            kinds("a\n  b", Syntax::Sass),
            vec![TokenKind::Ident, TokenKind::Newline, TokenKind::Whitespace, TokenKind::Ident]
        );
    }

    #[test]
    fn test_variables_and_at_keywords() {
        assert_eq!(kinds("$gap", Syntax::Scss), vec![TokenKind::Variable]);
        assert_eq!(kinds("@media", Syntax::Css), vec![TokenKind::AtKeyword]);
        assert_eq!(kinds("#{$x}-y", Syntax::Scss), vec![TokenKind::Ident]);
    }
}
