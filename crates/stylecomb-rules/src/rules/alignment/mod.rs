//! Column alignment rules

mod align_colons;
mod vendor_prefix_align;

pub use align_colons::AlignColonsRule;
pub use vendor_prefix_align::VendorPrefixAlignRule;
