//! stylecomb-rules: Code-style rules for stylesheets
//!
//! This crate provides rules that rewrite a parsed stylesheet tree to enforce
//! a formatting convention, and detect whether a tree already follows one.
//!
//! # Rules
//!
//! - `align-colons`: align the colons of a block's declarations
//! - `inline-single-declarations`: put blocks with one declaration on one line
//! - `vendor-prefix-align`: align prefixed properties and values with their
//!   unprefixed forms
//!
//! # Example
//!
//! ```ignore
//! use stylecomb_core::Syntax;
//! use stylecomb_rules::{Comb, RuleSettings};
//!
//! let comb = Comb::new(&RuleSettings::enabled(["align-colons"]))?;
//! let output = comb.process_str("a {\n  top: 0;\n  bottom: 0;\n}", Syntax::Css)?;
//! ```

pub mod comb;
pub mod config;
pub mod indent;
pub mod prefix;
pub mod rules;

pub use comb::{Comb, ProcessReport};
pub use config::{ConfigValue, RuleSettings};
pub use rules::{Accepts, Rule, RuleError, RuleInfo, RuleRegistry};
