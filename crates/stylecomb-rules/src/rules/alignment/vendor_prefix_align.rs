//! Align vendor-prefixed properties and values with their unprefixed forms
//!
//! ```css
//! a {
//!   -webkit-transition: -webkit-transform 1s;
//!           transition:         transform 1s;
//! }
//! ```
//!
//! Each block is handled in two passes. The gather pass records, per base
//! name, the widest prefix and leading indent among the block's declarations;
//! the apply pass pads every occurrence to that target. Value names are
//! namespaced by their property so `transform` inside `transition` is aligned
//! separately from a `transform` property.

use std::collections::HashMap;

use stylecomb_core::{Node, NodeKind, Syntax};
use tracing::trace;

use crate::indent::{extra_indent, split_final_line};
use crate::prefix::{strip_vendor_prefix, PrefixInfo};
use crate::rules::{Rule, RuleError};

/// Pads prefixed and unprefixed declarations so their base names line up
pub struct VendorPrefixAlignRule;

impl Rule for VendorPrefixAlignRule {
    fn name(&self) -> &'static str {
        "vendor-prefix-align"
    }

    fn description(&self) -> &'static str {
        "Align vendor-prefixed properties and values with their unprefixed versions"
    }

    fn run_before(&self) -> Option<&'static str> {
        Some("align-colons")
    }

    fn syntax(&self) -> &'static [Syntax] {
        Syntax::ALL
    }

    fn process(&self, tree: &mut Node) -> Result<(), RuleError> {
        self.check_syntax(tree)?;
        let syntax = tree.syntax;
        tree.traverse_by_kind_mut(NodeKind::Block, |block, _| align_block(block, syntax));
        Ok(())
    }

    fn detect(&self, tree: &Node) -> Result<Vec<bool>, RuleError> {
        self.check_syntax(tree)?;
        let mut detected = Vec::new();
        tree.traverse_by_kind(NodeKind::Block, |block, _, _| {
            if let Some(aligned) = detect_block(block) {
                detected.push(aligned);
            }
        });
        Ok(detected)
    }
}

/// Widest prefix and extra indent recorded for one alignment id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Alignment {
    prefix_length: usize,
    extra: usize,
}

impl Alignment {
    fn total(&self) -> usize {
        self.prefix_length + self.extra
    }
}

/// State of one block's gather pass
struct BlockPass {
    /// No line break or tab was met while measuring
    oneline: bool,
    targets: HashMap<String, Alignment>,
}

impl BlockPass {
    fn new() -> Self {
        Self {
            oneline: true,
            targets: HashMap::new(),
        }
    }

    fn measure(&mut self, nodes: &[Node]) -> usize {
        let indent = extra_indent(nodes.iter());
        if indent.line_break {
            self.oneline = false;
        }
        indent.width
    }

    /// Keep the wider of the stored target and `info`, preferring `info` on a tie
    fn record(&mut self, info: &PrefixInfo) {
        if info.is_trivial() {
            return;
        }
        let candidate = Alignment {
            prefix_length: info.prefix_length,
            extra: info.extra,
        };
        let keep_stored = self
            .targets
            .get(&info.id)
            .is_some_and(|stored| stored.total() > candidate.total());
        if !keep_stored {
            self.targets.insert(info.id.clone(), candidate);
        }
    }

    /// Rewrite `whitespace` so the occurrence described by `info` reaches its target
    ///
    /// Everything up to the last break is kept. `None` when `info` has no target.
    fn padded(&self, info: &PrefixInfo, whitespace: &str) -> Option<String> {
        let target = self.targets.get(&info.id)?;
        let (head, tail) = split_final_line(whitespace);
        let width = (target.total() + tail.chars().count()).saturating_sub(info.total());
        Some(format!("{}{}", head, " ".repeat(width)))
    }
}

fn align_block(block: &mut Node, syntax: Syntax) {
    let mut pass = BlockPass::new();
    let (properties, values) = gather(block, &mut pass);

    if pass.oneline && syntax != Syntax::Sass {
        trace!("single-line block, skipping vendor prefix alignment");
        return;
    }
    trace!(targets = pass.targets.len(), "aligning vendor prefixes");

    for (index, info) in &values {
        if let Some(declaration) = block.get_mut(*index) {
            pad_value(declaration, info, &pass);
        }
    }

    if syntax == Syntax::Sass {
        return;
    }

    // Back to front so insertions leave the remaining indices valid
    for (index, info) in properties.iter().rev() {
        if *index == 0 {
            continue;
        }
        pad_property(block, *index, info, &pass);
    }
}

type Subjects = Vec<(usize, PrefixInfo)>;

/// Record every property and value occurrence of the block
///
/// Indents are measured for every child, so a break in front of any of them
/// marks the block as multi-line.
fn gather(block: &Node, pass: &mut BlockPass) -> (Subjects, Subjects) {
    let children = block.children();

    let mut properties = Vec::new();
    for (index, child) in children.iter().enumerate() {
        let extra = pass.measure(property_prelude(children, index));
        if let Some(name) = property_name(child) {
            let info = PrefixInfo::new(name, "", extra);
            pass.record(&info);
            properties.push((index, info));
        }
    }

    let mut values = Vec::new();
    for (index, child) in children.iter().enumerate() {
        if !child.is(NodeKind::Declaration) {
            continue;
        }
        let extra = value_prelude(child).map_or(0, |nodes| pass.measure(nodes));
        if let Some(name) = value_name(child) {
            let namespace = property_name(child).map_or("", |p| strip_vendor_prefix(p).0);
            let info = PrefixInfo::new(name, namespace, extra);
            pass.record(&info);
            values.push((index, info));
        }
    }

    (properties, values)
}

fn pad_value(declaration: &mut Node, info: &PrefixInfo, pass: &BlockPass) {
    let Some(value) = declaration.last_index(NodeKind::Value) else {
        return;
    };
    let space = value
        .checked_sub(1)
        .and_then(|i| declaration.get_mut(i))
        .filter(|node| node.is(NodeKind::Space));
    if let Some(space) = space {
        if let Some(padded) = space.text().and_then(|text| pass.padded(info, text)) {
            space.set_text(padded);
        }
    } else if let Some(padded) = pass.padded(info, "").filter(|p| !p.is_empty()) {
        let syntax = declaration.syntax;
        declaration.insert(value, Node::space(padded, syntax));
    }
}

fn pad_property(block: &mut Node, index: usize, info: &PrefixInfo, pass: &BlockPass) {
    let Some(previous) = block.get_mut(index - 1) else {
        return;
    };
    if previous.is(NodeKind::Space) {
        if let Some(padded) = previous.text().and_then(|text| pass.padded(info, text)) {
            previous.set_text(padded);
        }
        return;
    }

    // A comment keeps its place right before the property
    let at = if previous.is(NodeKind::MultilineComment) { index - 1 } else { index };
    if let Some(padded) = pass.padded(info, "").filter(|p| !p.is_empty()) {
        let syntax = block.syntax;
        block.insert(at, Node::space(padded, syntax));
    }
}

/// Siblings between the previous declaration delimiter and `index`
fn property_prelude(children: &[Node], index: usize) -> &[Node] {
    let before = &children[..index];
    let start = before
        .iter()
        .rposition(|n| n.is(NodeKind::DeclarationDelimiter))
        .map_or(0, |pos| pos + 1);
    &before[start..]
}

/// Declaration children between the colon and the value
fn value_prelude(declaration: &Node) -> Option<&[Node]> {
    let children = declaration.children();
    let value = declaration.last_index(NodeKind::Value)?;
    let colon = children[..value]
        .iter()
        .rposition(|n| n.is(NodeKind::PropertyDelimiter))?;
    Some(&children[colon + 1..value])
}

/// Text of a declaration's first property token
fn property_name(node: &Node) -> Option<&str> {
    if !node.is(NodeKind::Declaration) {
        return None;
    }
    node.first(NodeKind::Property)?.children().first()?.text()
}

/// Leading identifier of a declaration's value, or the name of a leading function
fn value_name(node: &Node) -> Option<&str> {
    if !node.is(NodeKind::Declaration) {
        return None;
    }
    let first = node.first(NodeKind::Value)?.children().first()?;
    match first.kind {
        NodeKind::Ident => first.text(),
        NodeKind::Function => first.children().first()?.text(),
        _ => None,
    }
}

/// True/false tally of prefixed groups in one block
#[derive(Debug, Default)]
struct Votes {
    aligned: usize,
    misaligned: usize,
}

impl Votes {
    fn cast(&mut self, aligned: bool) {
        if aligned {
            self.aligned += 1;
        } else {
            self.misaligned += 1;
        }
    }

    fn verdict(&self) -> Option<bool> {
        if self.aligned == 0 && self.misaligned == 0 {
            None
        } else {
            Some(self.aligned >= self.misaligned)
        }
    }
}

/// Follows consecutive occurrences of one base name through a walk
#[derive(Debug, Default)]
struct RunTracker {
    previous: Option<(String, usize, usize)>,
    pending: Option<bool>,
}

impl RunTracker {
    /// Account for an occurrence whose name ends at column offset `sum`
    fn observe(&mut self, info: &PrefixInfo, sum: usize, votes: &mut Votes) {
        let same_name = self
            .previous
            .as_ref()
            .is_some_and(|(name, _, _)| *name == info.base_name);

        if !same_name {
            self.flush(votes);
        }

        if let Some((_, prefix_length, previous_sum)) = &self.previous {
            let prefixed_pair = same_name && *prefix_length != info.prefix_length;
            if prefixed_pair && self.pending != Some(false) {
                self.pending = Some(sum == *previous_sum);
            }
        }

        self.previous = Some((info.base_name.clone(), info.prefix_length, sum));
    }

    fn flush(&mut self, votes: &mut Votes) {
        if let Some(aligned) = self.pending.take() {
            votes.cast(aligned);
        }
    }
}

/// Vote on whether the block's prefixed groups are aligned, `None` when it has none
fn detect_block(block: &Node) -> Option<bool> {
    let children = block.children();
    let mut votes = Votes::default();

    // Measured exactly as in `gather`
    let mut run = RunTracker::default();
    for (index, child) in children.iter().enumerate().skip(1) {
        let Some(name) = property_name(child) else {
            continue;
        };
        let info = PrefixInfo::new(name, "", 0);
        let extra = extra_indent(property_prelude(children, index).iter()).width;
        run.observe(&info, extra + info.prefix_length, &mut votes);
    }
    run.flush(&mut votes);

    let mut run = RunTracker::default();
    for child in children {
        let Some(name) = value_name(child) else {
            continue;
        };
        let Some(prelude) = value_prelude(child) else {
            continue;
        };
        let info = PrefixInfo::new(name, "", 0);
        let extra = extra_indent(prelude.iter()).width;
        run.observe(&info, extra + info.prefix_length, &mut votes);
    }
    run.flush(&mut votes);

    votes.verdict()
}

#[cfg(test)]
mod tests {
    use super::*;
    use stylecomb_core::parse;

    fn process(source: &str, syntax: Syntax) -> String {
        let mut tree = parse(source, syntax).unwrap();
        VendorPrefixAlignRule.process(&mut tree).unwrap();
        tree.to_string()
    }

    fn detect(source: &str, syntax: Syntax) -> Vec<bool> {
        let tree = parse(source, syntax).unwrap();
        VendorPrefixAlignRule.detect(&tree).unwrap()
    }

    #[test]
    fn test_aligns_prefixed_properties() {
        let output = process(
            "a {\n  -webkit-transform: scale(1);\n  transform: scale(1);\n}",
            Syntax::Css,
        );
        assert_eq!(
            output,
            "a {\n  -webkit-transform: scale(1);\n          transform: scale(1);\n}"
        );
    }

    #[test]
    fn test_aligns_every_prefix_length() {
        let output = process(
            "a {\n  -webkit-box-sizing: border-box;\n  -moz-box-sizing: border-box;\n  box-sizing: border-box;\n}",
            Syntax::Css,
        );
        assert_eq!(
            output,
            "a {\n  -webkit-box-sizing: border-box;\n     -moz-box-sizing: border-box;\n          box-sizing: border-box;\n}"
        );
    }

    #[test]
    fn test_aligns_prefixed_values() {
        let output = process(
            "a {\n  -webkit-transition: -webkit-transform 1s;\n  transition: transform 1s;\n}",
            Syntax::Css,
        );
        assert_eq!(
            output,
            "a {\n  -webkit-transition: -webkit-transform 1s;\n          transition:         transform 1s;\n}"
        );
    }

    #[test]
    fn test_aligns_prefixed_function_values() {
        let output = process(
            "a {\n  background: -webkit-linear-gradient(red, blue);\n  background: linear-gradient(red, blue);\n}",
            Syntax::Css,
        );
        assert_eq!(
            output,
            "a {\n  background: -webkit-linear-gradient(red, blue);\n  background:         linear-gradient(red, blue);\n}"
        );
    }

    #[test]
    fn test_single_line_block_is_untouched() {
        let source = "a { -webkit-transform: none; transform: none; }";
        assert_eq!(process(source, Syntax::Css), source);
    }

    #[test]
    fn test_unprefixed_declarations_are_untouched() {
        let source = "a {\n  color: red;\n    margin: 0;\n  top: 1px;\n}";
        assert_eq!(process(source, Syntax::Css), source);
    }

    #[test]
    fn test_idempotent() {
        let once = process(
            "a {\n  -webkit-transition: -webkit-transform 1s;\n  -o-transition: -o-transform 1s;\n  transition: transform 1s;\n}",
            Syntax::Scss,
        );
        assert_eq!(process(&once, Syntax::Scss), once);
    }

    #[test]
    fn test_comment_before_property_counts_as_indent() {
        let output = process(
            "a {\n  -moz-user-select: none;\n  /* x */user-select: none;\n}",
            Syntax::Css,
        );
        // the comment pushes `user-select` right by 7 columns, so the prefixed
        // line is indented to meet it
        assert_eq!(
            output,
            "a {\n    -moz-user-select: none;\n  /* x */user-select: none;\n}"
        );
    }

    #[test]
    fn test_missing_space_before_value_is_created() {
        let output = process(
            "a {\n  -webkit-transition: -webkit-transform 1s;\n  transition:transform 1s;\n}",
            Syntax::Css,
        );
        assert!(output.contains("transition:         transform 1s;"));
    }

    #[test]
    fn test_sass_aligns_values_only() {
        let output = process(
            "a\n  -webkit-transition: -webkit-transform 1s\n  transition: transform 1s\n",
            Syntax::Sass,
        );
        assert_eq!(
            output,
            "a\n  -webkit-transition: -webkit-transform 1s\n  transition:         transform 1s\n"
        );
    }

    #[test]
    fn test_detect_aligned_and_misaligned() {
        assert_eq!(
            detect("a {\n  -webkit-transform: none;\n          transform: none;\n}", Syntax::Css),
            vec![true]
        );
        assert_eq!(
            detect("a {\n  -webkit-transform: none;\n  transform: none;\n}", Syntax::Css),
            vec![false]
        );
    }

    #[test]
    fn test_detect_skips_blocks_without_prefixes() {
        assert!(detect("a {\n  color: red;\n  top: 0;\n}", Syntax::Css).is_empty());
    }

    #[test]
    fn test_detect_one_vote_per_block() {
        let source = "a {\n  -webkit-transform: none;\n          transform: none;\n}\nb {\n  -moz-box-sizing: a;\n  box-sizing: a;\n}";
        assert_eq!(detect(source, Syntax::Css), vec![true, false]);
    }

    #[test]
    fn test_detect_after_process() {
        let source = "a {\n  -webkit-transition: -webkit-transform 1s;\n  -moz-transition: -moz-transform 1s;\n  transition: transform 1s;\n}";
        let processed = process(source, Syntax::Css);
        assert_eq!(detect(&processed, Syntax::Css), vec![true]);
    }

    #[test]
    fn test_detect_after_process_with_comment() {
        let processed = process(
            "a {\n  -moz-user-select: none;\n  /* x */user-select: none;\n}",
            Syntax::Css,
        );
        assert_eq!(detect(&processed, Syntax::Css), vec![true]);
        // the comment shifts the property, not the detector's reading of it
        assert_eq!(
            detect("a {\n  -moz-user-select: none;\n  /* x */user-select: none;\n}", Syntax::Css),
            vec![false]
        );
    }
}
