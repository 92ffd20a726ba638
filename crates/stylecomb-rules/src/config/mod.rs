//! Rule configuration
//!
//! Settings map rule names to the value they are configured with. The same
//! shape is read from a `[rules]` table and produced by detection.

mod settings;

pub use settings::{ConfigValue, RuleSettings};
