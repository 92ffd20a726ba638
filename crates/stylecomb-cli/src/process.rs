//! File processing logic for stylecomb

use anyhow::{anyhow, Context, Result};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

use stylecomb_core::Syntax;
use stylecomb_rules::Comb;

/// Result of processing a single file
#[derive(Debug)]
pub struct ProcessResult {
    /// Rules whose pass changed the file, in run order
    pub changed_by: Vec<&'static str>,
    pub old_source: String,
    pub new_source: String,
}

impl ProcessResult {
    pub fn has_changes(&self) -> bool {
        !self.changed_by.is_empty()
    }
}

/// Whether `path` has a stylesheet extension stylecomb understands
pub fn is_stylesheet(path: &Path) -> bool {
    Syntax::from_extension(path).is_some()
}

fn file_syntax(path: &Path) -> Result<Syntax> {
    Syntax::from_extension(path)
        .ok_or_else(|| anyhow!("Unsupported file extension: {}", path.display()))
}

fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path.display()))
}

/// Run the configured rules over a single stylesheet
pub fn process_file(path: &Path, comb: &Comb) -> Result<ProcessResult> {
    let syntax = file_syntax(path)?;
    let source = read_source(path)?;

    debug!(path = %path.display(), %syntax, "processing");
    let report = comb
        .process_report(&source, syntax)
        .with_context(|| format!("Failed to process {}", path.display()))?;

    Ok(ProcessResult {
        changed_by: report.changed_by,
        old_source: source,
        new_source: report.output,
    })
}

/// Collect every rule's detector votes for a single stylesheet
pub fn detect_file(path: &Path, comb: &Comb) -> Result<BTreeMap<&'static str, Vec<bool>>> {
    let syntax = file_syntax(path)?;
    let source = read_source(path)?;

    debug!(path = %path.display(), %syntax, "detecting");
    comb.detect_str(&source, syntax)
        .with_context(|| format!("Failed to detect style of {}", path.display()))
}

/// Write the processed result to the file
pub fn write_file(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write file: {}", path.display()))
}

/// Number of lines that differ between `old` and `new`
pub fn changed_lines(old: &str, new: &str) -> usize {
    diff::lines(old, new)
        .into_iter()
        .filter(|line| matches!(line, diff::Result::Right(_)))
        .count()
}
