//! stylecomb-core: Core abstractions for stylesheet formatting
//!
//! This crate provides:
//! - `Node`: A tagged, position-carrying stylesheet syntax tree
//! - `Syntax`: The supported dialects (css, less, sass, scss)
//! - `parse()`: Text to tree, regenerating accurate source positions
//! - Traversal primitives: visit-by-kind, first-of-kind lookup, splice insert/remove
//!
//! Serializing a parsed tree with `to_string()` reproduces the input byte for byte.

mod node;
pub mod parser;
mod syntax;
pub mod traverse;

pub use node::{Node, NodeContent, NodeKind, Position};
pub use parser::{parse, ParseError};
pub use syntax::{Syntax, UnknownSyntax};
