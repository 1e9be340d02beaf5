/// INFO key written by the merger unless the configuration renames it.
pub const DEFAULT_INFO_TAG: &str = "RM_TE";

pub const INFO_DESCRIPTION: &str =
    "Transposable element annotation from RepeatMasker and genomic intersections";

/// Number of comma separated fields in every RM_TE entry, sentinel included.
pub const ENTRY_ARITY: usize = 9;

pub const ENTRY_FIELD_SEP: &str = ",";
pub const ENTRY_SEP: &str = "|";
pub const MISSING_FIELD: &str = "-";

/// Missing value of a VCF column or INFO value.
pub const MISSING_VALUE: &str = ".";

/// Separates the variant identity from the projection tag in BED name columns.
pub const NAME_TAG_SEP: char = '#';

pub const DEFAULT_DEL_FLANK: u64 = 1000;
pub const DEFAULT_BREAKPOINT_FLANK: u64 = 1000;
pub const DEFAULT_BND_FLANK: u64 = 0;
pub const DEFAULT_FASTA_LINE_WIDTH: usize = 80;

pub const DEFAULT_REPEATMASKER_TIMEOUT_SECS: u64 = 86_400;
pub const DEFAULT_BEDTOOLS_TIMEOUT_SECS: u64 = 3_600;

pub const ANNOTATED_SUFFIX: &str = "_annotated.vcf";
pub const INS_FASTA_SUFFIX: &str = "_INS.fasta";
pub const PROJECTED_SUFFIX: &str = "_processed.bed";
pub const INTERSECTED_SUFFIX: &str = "_intersected.bed";
pub const SQUASHED_SUFFIX: &str = "_squashed.tsv";
