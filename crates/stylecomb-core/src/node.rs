//! Stylesheet syntax tree
//!
//! Every node carries a kind from a closed vocabulary, either literal text
//! (leaves) or an ordered list of owned children (branches), the dialect it
//! was parsed with, and the source span it came from. Spans are only used for
//! column arithmetic; nodes synthesized by rules carry `Position::default()`.

use std::fmt;

use crate::syntax::Syntax;

/// Kind tag of a tree node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Stylesheet,
    Ruleset,
    Selector,
    Block,
    Declaration,
    Property,
    /// The `:` between a property and its value
    PropertyDelimiter,
    Value,
    Ident,
    /// `name(args)`: an `Ident` followed by `Arguments`
    Function,
    Arguments,
    Parentheses,
    Space,
    /// `/* ... */`, text excludes the markers
    MultilineComment,
    /// `// ...`, text excludes the marker and the newline
    SinglelineComment,
    /// `;`, or a newline in sass
    DeclarationDelimiter,
    /// `,`
    Delimiter,
    Number,
    String,
    Color,
    Variable,
    Operator,
    Important,
    Uri,
    Atrule,
    Atkeyword,
    /// Any token without a more specific kind
    Raw,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Stylesheet => "stylesheet",
            NodeKind::Ruleset => "ruleset",
            NodeKind::Selector => "selector",
            NodeKind::Block => "block",
            NodeKind::Declaration => "declaration",
            NodeKind::Property => "property",
            NodeKind::PropertyDelimiter => "propertyDelimiter",
            NodeKind::Value => "value",
            NodeKind::Ident => "ident",
            NodeKind::Function => "function",
            NodeKind::Arguments => "arguments",
            NodeKind::Parentheses => "parentheses",
            NodeKind::Space => "space",
            NodeKind::MultilineComment => "multilineComment",
            NodeKind::SinglelineComment => "singlelineComment",
            NodeKind::DeclarationDelimiter => "declarationDelimiter",
            NodeKind::Delimiter => "delimiter",
            NodeKind::Number => "number",
            NodeKind::String => "string",
            NodeKind::Color => "color",
            NodeKind::Variable => "variable",
            NodeKind::Operator => "operator",
            NodeKind::Important => "important",
            NodeKind::Uri => "uri",
            NodeKind::Atrule => "atrule",
            NodeKind::Atkeyword => "atkeyword",
            NodeKind::Raw => "raw",
        }
    }

    /// Whether nodes of this kind hold text rather than children
    pub fn is_leaf(&self) -> bool {
        !matches!(
            self,
            NodeKind::Stylesheet
                | NodeKind::Ruleset
                | NodeKind::Selector
                | NodeKind::Block
                | NodeKind::Declaration
                | NodeKind::Property
                | NodeKind::Value
                | NodeKind::Function
                | NodeKind::Arguments
                | NodeKind::Parentheses
                | NodeKind::Atrule
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A 1-based line/column location, columns counted in characters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Payload of a node
#[derive(Debug, Clone, PartialEq)]
pub enum NodeContent {
    Text(String),
    Children(Vec<Node>),
}

/// A stylesheet syntax tree node
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub content: NodeContent,
    pub syntax: Syntax,
    /// Position of the first character
    pub start: Position,
    /// Position of the last character
    pub end: Position,
}

impl Node {
    /// Create a text node without position information
    pub fn leaf(kind: NodeKind, text: impl Into<String>, syntax: Syntax) -> Self {
        Self {
            kind,
            content: NodeContent::Text(text.into()),
            syntax,
            start: Position::default(),
            end: Position::default(),
        }
    }

    /// Create a node owning `children`, spanning from the first child to the last
    pub fn branch(kind: NodeKind, children: Vec<Node>, syntax: Syntax) -> Self {
        let start = children.first().map(|c| c.start).unwrap_or_default();
        let end = children.last().map(|c| c.end).unwrap_or_default();
        Self {
            kind,
            content: NodeContent::Children(children),
            syntax,
            start,
            end,
        }
    }

    /// Create a whitespace node
    pub fn space(text: impl Into<String>, syntax: Syntax) -> Self {
        Self::leaf(NodeKind::Space, text, syntax)
    }

    pub fn with_span(mut self, start: Position, end: Position) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    pub fn is(&self, kind: NodeKind) -> bool {
        self.kind == kind
    }

    /// Literal text of a leaf node
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            NodeContent::Text(text) => Some(text),
            NodeContent::Children(_) => None,
        }
    }

    pub fn text_mut(&mut self) -> Option<&mut String> {
        match &mut self.content {
            NodeContent::Text(text) => Some(text),
            NodeContent::Children(_) => None,
        }
    }

    /// Replace the text of a leaf node; branches are left untouched
    pub fn set_text(&mut self, text: impl Into<String>) {
        if let Some(current) = self.text_mut() {
            *current = text.into();
        }
    }

    /// Children of a branch node, empty for leaves
    pub fn children(&self) -> &[Node] {
        match &self.content {
            NodeContent::Children(children) => children,
            NodeContent::Text(_) => &[],
        }
    }

    pub fn children_mut(&mut self) -> &mut [Node] {
        match &mut self.content {
            NodeContent::Children(children) => children,
            NodeContent::Text(_) => &mut [],
        }
    }

    pub fn len(&self) -> usize {
        self.children().len()
    }

    pub fn is_empty(&self) -> bool {
        self.children().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Node> {
        self.children().get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Node> {
        self.children_mut().get_mut(index)
    }

    /// Whether the node's own text contains a newline
    pub fn has_line_break(&self) -> bool {
        self.text().is_some_and(|text| text.contains('\n'))
    }

    /// Structural equality: same kinds, texts and child order, ignoring spans
    pub fn same_shape(&self, other: &Node) -> bool {
        if self.kind != other.kind {
            return false;
        }
        match (&self.content, &other.content) {
            (NodeContent::Text(a), NodeContent::Text(b)) => a == b,
            (NodeContent::Children(a), NodeContent::Children(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same_shape(y))
            }
            _ => false,
        }
    }

    fn write_children(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for child in self.children() {
            write!(f, "{}", child)?;
        }
        Ok(())
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.content, self.kind) {
            (NodeContent::Text(text), NodeKind::MultilineComment) => write!(f, "/*{}*/", text),
            (NodeContent::Text(text), NodeKind::SinglelineComment) => write!(f, "//{}", text),
            (NodeContent::Text(text), _) => f.write_str(text),
            (NodeContent::Children(_), NodeKind::Block) if self.syntax.uses_braces() => {
                f.write_str("{")?;
                self.write_children(f)?;
                f.write_str("}")
            }
            (NodeContent::Children(_), NodeKind::Arguments | NodeKind::Parentheses) => {
                f.write_str("(")?;
                self.write_children(f)?;
                f.write_str(")")
            }
            (NodeContent::Children(_), _) => self.write_children(f),
        }
    }
}
