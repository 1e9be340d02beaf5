//! Consolidation ("squash") of raw transposable element hits.
//!
//! Two external tools report hits: RepeatMasker aligns inserted sequence
//! against a repeat library, and `bedtools intersect` overlaps projected
//! windows with a repeat track. Both outputs are read into [`RawHit`]s and folded
//! into one deterministic value per variant identity by [`HitConsolidator`].
//!
//! [`RawHit`]: trace_core::models::RawHit
pub mod intersect;
pub mod repeatmasker;
pub mod squash;

pub use intersect::{parse_intersect_line, read_intersect, read_intersect_from_path};
pub use repeatmasker::{parse_out_line, read_out, read_out_from_path};
pub use squash::{HitConsolidator, write_hits};
