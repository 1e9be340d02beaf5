pub mod annotation;
pub mod hit;
pub mod interval;
pub mod table;
pub mod variant;
pub mod variant_set;

// re-export for cleaner imports
pub use self::annotation::{AnnotatedVariant, ConsolidatedAnnotation, parse_encoded, sentinel_value};
pub use self::hit::{EvidenceSource, HitEntry, RawHit};
pub use self::interval::{BreakendOrientation, Interval, IntervalTag, identity_from_name};
pub use self::table::{ConsolidatedTable, TableRow, read_table_rows, read_table_rows_from_path};
pub use self::variant::{InfoField, SvType, VariantRecord};
pub use self::variant_set::{VariantSet, VcfLine};
