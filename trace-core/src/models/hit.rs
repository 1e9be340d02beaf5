use std::cmp::Ordering;
use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::consts::{ENTRY_ARITY, ENTRY_FIELD_SEP, MISSING_FIELD};

///
/// The two independent evidence pipelines.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
pub enum EvidenceSource {
    /// inserted sequence aligned against a repeat library (RepeatMasker)
    #[serde(rename = "homology")]
    SequenceHomology,
    /// projected coordinates intersected with a repeat track (bedtools)
    #[serde(rename = "interval")]
    IntervalOverlap,
}

impl EvidenceSource {
    pub fn label(&self) -> &'static str {
        match self {
            EvidenceSource::SequenceHomology => "homology",
            EvidenceSource::IntervalOverlap => "interval",
        }
    }
}

impl Display for EvidenceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for EvidenceSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "homology" | "repeatmasker" => Ok(EvidenceSource::SequenceHomology),
            "interval" | "intersect" => Ok(EvidenceSource::IntervalOverlap),
            _ => Err(format!("Unknown evidence source: {}", s)),
        }
    }
}

///
/// The nine rendered fields of one hit, minus its owner.
///
/// `chrom` is `None` for homology hits, whose coordinates are local to the
/// inserted sequence; it renders as `-`.
///
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HitEntry {
    pub chrom: Option<String>,
    pub start: u64,
    pub end: u64,
    pub repeat_name: String,
    pub repeat_family: String,
    pub strand: String,
    pub rep_start: String,
    pub rep_end: String,
    pub rank: u64,
}

impl HitEntry {
    ///
    /// Check that a free-text field can be embedded in an INFO value without
    /// breaking the entry grammar.
    ///
    pub fn validate_field(name: &str, value: &str) -> Result<(), String> {
        if value.is_empty() {
            return Err(format!("empty {}", name));
        }
        if value
            .chars()
            .any(|c| matches!(c, ',' | '|' | ';' | '=') || c.is_whitespace())
        {
            return Err(format!("{} '{}' contains a reserved character", name, value));
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), String> {
        if let Some(chrom) = &self.chrom {
            Self::validate_field("chromosome", chrom)?;
        }
        Self::validate_field("repeat name", &self.repeat_name)?;
        Self::validate_field("repeat family", &self.repeat_family)?;
        Self::validate_field("strand", &self.strand)?;
        Self::validate_field("repeat start", &self.rep_start)?;
        Self::validate_field("repeat end", &self.rep_end)?;
        Ok(())
    }

    /// Whether this entry came from the homology pipeline.
    pub fn is_local(&self) -> bool {
        self.chrom.is_none()
    }
}

// rank, then start, then repeat name; the remaining fields only break exact ties
impl Ord for HitEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank
            .cmp(&other.rank)
            .then_with(|| self.start.cmp(&other.start))
            .then_with(|| self.repeat_name.cmp(&other.repeat_name))
            .then_with(|| self.end.cmp(&other.end))
            .then_with(|| self.repeat_family.cmp(&other.repeat_family))
            .then_with(|| self.strand.cmp(&other.strand))
            .then_with(|| self.rep_start.cmp(&other.rep_start))
            .then_with(|| self.rep_end.cmp(&other.rep_end))
            .then_with(|| self.chrom.cmp(&other.chrom))
    }
}

impl PartialOrd for HitEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Display for HitEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{chrom},{start},{end},{name},{family},{strand},{rs},{re},{rank}",
            chrom = self.chrom.as_deref().unwrap_or(MISSING_FIELD),
            start = self.start,
            end = self.end,
            name = self.repeat_name,
            family = self.repeat_family,
            strand = self.strand,
            rs = self.rep_start,
            re = self.rep_end,
            rank = self.rank,
        )
    }
}

impl FromStr for HitEntry {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split(ENTRY_FIELD_SEP).collect();
        if fields.len() != ENTRY_ARITY {
            return Err(format!(
                "entry '{}' has {} fields, expected {}",
                s,
                fields.len(),
                ENTRY_ARITY
            ));
        }

        let number = |name: &str, raw: &str| {
            raw.parse::<u64>()
                .map_err(|_| format!("invalid {} '{}' in entry '{}'", name, raw, s))
        };

        let entry = HitEntry {
            chrom: match fields[0] {
                MISSING_FIELD => None,
                chrom => Some(chrom.to_string()),
            },
            start: number("start", fields[1])?,
            end: number("end", fields[2])?,
            repeat_name: fields[3].to_string(),
            repeat_family: fields[4].to_string(),
            strand: fields[5].to_string(),
            rep_start: fields[6].to_string(),
            rep_end: fields[7].to_string(),
            rank: number("rank", fields[8])?,
        };
        entry.validate()?;

        Ok(entry)
    }
}

///
/// A single hit as produced by one of the external tools, owned by a variant
/// identity for the duration of one consolidation pass.
///
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawHit {
    pub source: EvidenceSource,
    pub variant_id: String,
    pub entry: HitEntry,
}
