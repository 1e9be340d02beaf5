//! Merging consolidated transposable element evidence into a VCF.
//!
//! Each record takes its value from the evidence source its SV type is routed
//! to ([`RoutingTable`]); the value is written under a single INFO key whose
//! definition is added to the header once. Record count, order and every other
//! INFO token are preserved, and merging an already annotated file changes
//! nothing.
pub mod header;
pub mod merger;
pub mod output;
pub mod routing;

pub use header::info_header_line;
pub use merger::{AnnotationMerger, MergeSummary};
pub use output::write_output;
pub use routing::RoutingTable;
