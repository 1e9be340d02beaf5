use std::fmt::{self, Display};

use crate::consts::{ENTRY_ARITY, ENTRY_FIELD_SEP, ENTRY_SEP, MISSING_FIELD};
use crate::models::hit::{EvidenceSource, HitEntry};
use crate::models::variant::VariantRecord;

///
/// The value written for a variant with no hits: one entry of `-` fields with
/// the same arity as a populated entry.
///
pub fn sentinel_value() -> String {
    vec![MISSING_FIELD; ENTRY_ARITY].join(ENTRY_FIELD_SEP)
}

fn is_sentinel_entry(raw: &str) -> bool {
    raw.split(ENTRY_FIELD_SEP).all(|field| field == MISSING_FIELD)
        && raw.split(ENTRY_FIELD_SEP).count() == ENTRY_ARITY
}

///
/// Split an encoded value back into hit entries. Sentinel entries carry no hits
/// and are dropped.
///
pub fn parse_encoded(value: &str) -> Result<Vec<HitEntry>, String> {
    value
        .split(ENTRY_SEP)
        .filter(|raw| !is_sentinel_entry(raw))
        .map(|raw| raw.parse::<HitEntry>())
        .collect()
}

///
/// All evidence of one source for one variant, in final order.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsolidatedAnnotation {
    pub variant_id: String,
    pub source: EvidenceSource,
    pub entries: Vec<HitEntry>,
}

impl ConsolidatedAnnotation {
    pub fn empty(variant_id: &str, source: EvidenceSource) -> Self {
        ConsolidatedAnnotation {
            variant_id: variant_id.to_string(),
            source,
            entries: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    ///
    /// Encode the entries as `entry|entry|...`, or the sentinel when there are none.
    ///
    pub fn render(&self) -> String {
        if self.entries.is_empty() {
            return sentinel_value();
        }
        self.entries
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<String>>()
            .join(ENTRY_SEP)
    }
}

impl Display for ConsolidatedAnnotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

///
/// A record paired with the value resolved for it. `None` leaves the record as is.
///
#[derive(Debug, Clone)]
pub struct AnnotatedVariant<'a> {
    pub record: &'a VariantRecord,
    pub value: Option<String>,
}

impl AnnotatedVariant<'_> {
    ///
    /// Serialize the record with `tag=value` inserted into (or replaced within) INFO.
    ///
    pub fn to_line(&self, tag: &str) -> String {
        match &self.value {
            Some(value) => {
                let mut info = self.record.info.clone();
                info.upsert(tag, value);
                self.record.line_with_info(&info)
            }
            None => self.record.line().to_string(),
        }
    }
}
