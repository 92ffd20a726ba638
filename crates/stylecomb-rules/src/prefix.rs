//! Vendor prefix recognition

/// Recognized vendor prefixes
pub const VENDOR_PREFIXES: &[&str] = &["-webkit-", "-khtml-", "-moz-", "-ms-", "-o-"];

/// What a property or value name contributes to vendor-prefix alignment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixInfo {
    /// Namespace followed by the base name
    pub id: String,
    /// The name with any vendor prefix removed
    pub base_name: String,
    /// Character length of the removed prefix, 0 when there is none
    pub prefix_length: usize,
    /// Leading whitespace and comment width in front of the occurrence
    pub extra: usize,
}

impl PrefixInfo {
    pub fn new(name: &str, namespace: &str, extra: usize) -> Self {
        let (base_name, prefix_length) = strip_vendor_prefix(name);
        Self {
            id: format!("{}{}", namespace, base_name),
            base_name: base_name.to_string(),
            prefix_length,
            extra,
        }
    }

    /// An occurrence without prefix or extra indent never sets an alignment target
    pub fn is_trivial(&self) -> bool {
        self.prefix_length == 0 && self.extra == 0
    }

    pub fn total(&self) -> usize {
        self.prefix_length + self.extra
    }
}

/// Remove a leading vendor prefix, returning the base name and the prefix length
pub fn strip_vendor_prefix(name: &str) -> (&str, usize) {
    VENDOR_PREFIXES
        .iter()
        .find_map(|prefix| name.strip_prefix(prefix).map(|base| (base, prefix.len())))
        .unwrap_or((name, 0))
}
