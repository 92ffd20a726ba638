//! Whitespace rules

mod inline_single_declarations;

pub use inline_single_declarations::InlineSingleDeclarationsRule;
