//! Breakpoint projection and insertion extraction for structural variants.
//!
//! Deletions, duplications, inversions and breakends are projected onto the
//! genomic windows that carry transposable element signal, written as BED for
//! an interval intersection tool. Insertions are exported as FASTA for a
//! sequence homology search instead.
//!
//! ```rust
//! use trace_core::config::ProjectionConfig;
//! use trace_core::models::VariantRecord;
//! use trace_project::BreakpointProjector;
//!
//! let record = VariantRecord::parse(
//!     "chr1\t60000\tbnd1\tN\tN[chr2:500[\t.\tPASS\tSVTYPE=BND",
//!     1,
//! ).unwrap();
//! let projector = BreakpointProjector::new(&ProjectionConfig::default()).unwrap();
//! let intervals = projector.project_record(&record).unwrap();
//!
//! assert_eq!(intervals[1].as_bed_line(), "chr2\t499\t500\tbnd1#mate:FF");
//! ```
pub mod breakend;
pub mod extractor;
pub mod projector;

pub use breakend::{Breakend, BreakendParser};
pub use extractor::{ExtractionReport, InsertionExtractor, InsertionSequence};
pub use projector::{BedWrite, BreakpointProjector, ProjectionReport};
