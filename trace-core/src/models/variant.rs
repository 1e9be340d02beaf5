use std::fmt::{self, Display};
use std::str::FromStr;

use crate::consts::MISSING_VALUE;
use crate::errors::{Result, TraceError};

///
/// Structural variant class, as declared by `INFO/SVTYPE` or inferred from the ALT allele.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[allow(clippy::upper_case_acronyms)]
pub enum SvType {
    INS,
    DEL,
    DUP,
    INV,
    BND,
    OTHER,
}

impl SvType {
    pub const ALL: [SvType; 6] = [
        SvType::INS,
        SvType::DEL,
        SvType::DUP,
        SvType::INV,
        SvType::BND,
        SvType::OTHER,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SvType::INS => "INS",
            SvType::DEL => "DEL",
            SvType::DUP => "DUP",
            SvType::INV => "INV",
            SvType::BND => "BND",
            SvType::OTHER => "OTHER",
        }
    }

    /// Infer the class from an ALT allele when SVTYPE is missing.
    fn from_alt(alt: &str) -> SvType {
        if let Some(symbol) = alt.strip_prefix('<').and_then(|a| a.strip_suffix('>')) {
            return SvType::from_str(symbol).unwrap_or(SvType::OTHER);
        }
        if alt.contains('[') || alt.contains(']') {
            return SvType::BND;
        }
        SvType::OTHER
    }
}

impl FromStr for SvType {
    type Err = String;

    /// Sub-typed symbols such as `DUP:TANDEM` or `INS:ME` map onto their base class.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let base = s.split(':').next().unwrap_or(s).to_uppercase();
        match base.as_str() {
            "INS" => Ok(SvType::INS),
            "DEL" => Ok(SvType::DEL),
            "DUP" => Ok(SvType::DUP),
            "INV" => Ok(SvType::INV),
            "BND" => Ok(SvType::BND),
            "OTHER" => Ok(SvType::OTHER),
            _ => Err(format!("Unknown SV type: {}", s)),
        }
    }
}

impl Display for SvType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

///
/// Ordered view of a VCF INFO column. Tokens keep their original order and text;
/// only [`InfoField::upsert`] changes the list.
///
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InfoField {
    entries: Vec<(String, Option<String>)>,
}

impl InfoField {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    ///
    /// Get the value of a `key=value` token. Flags and missing keys yield `None`.
    ///
    pub fn value(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, v)| v.as_deref())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    ///
    /// Set `key=value`, replacing the first occurrence in place and dropping any later
    /// repeats of the same key. Appends when the key is new.
    ///
    /// Returns true when an existing token was replaced.
    ///
    pub fn upsert(&mut self, key: &str, value: &str) -> bool {
        match self.entries.iter().position(|(k, _)| k == key) {
            Some(first) => {
                self.entries[first].1 = Some(value.to_string());
                let mut index = 0;
                self.entries.retain(|(k, _)| {
                    let keep = index <= first || k != key;
                    index += 1;
                    keep
                });
                true
            }
            None => {
                self.entries.push((key.to_string(), Some(value.to_string())));
                false
            }
        }
    }
}

impl FromStr for InfoField {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.is_empty() || s == MISSING_VALUE {
            return Ok(InfoField::default());
        }

        let entries = s
            .split(';')
            .map(|token| match token.split_once('=') {
                Some((k, v)) => (k.to_string(), Some(v.to_string())),
                None => (token.to_string(), None),
            })
            .collect();

        Ok(InfoField { entries })
    }
}

impl Display for InfoField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.entries.is_empty() {
            return write!(f, ".");
        }
        for (i, (key, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ";")?;
            }
            match value {
                Some(v) => write!(f, "{}={}", key, v)?,
                None => write!(f, "{}", key)?,
            }
        }
        Ok(())
    }
}

///
/// One data line of a structural variant VCF.
///
/// The record is immutable once parsed; annotation renders a new line from
/// [`VariantRecord::line`] with a replacement INFO column instead of mutating it.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantRecord {
    pub id: String,
    pub chrom: String,
    /// 1-based VCF position
    pub pos: u64,
    pub ref_allele: String,
    pub alt: String,
    pub sv_type: SvType,
    pub sv_len: Option<i64>,
    pub end: Option<u64>,
    pub info: InfoField,
    pub line_number: usize,
    line: String,
}

impl VariantRecord {
    ///
    /// Parse a tab separated VCF data line.
    ///
    /// # Arguments
    /// - line: the raw line, with or without its trailing newline
    /// - line_number: 1-based line number used in diagnostics
    ///
    pub fn parse(line: &str, line_number: usize) -> Result<Self> {
        let line = line.trim_end_matches(['\n', '\r']);
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 8 {
            return Err(TraceError::parse(
                "VCF",
                line_number,
                format!("expected at least 8 columns, found {}", fields.len()),
            ));
        }

        let pos = fields[1].parse::<u64>().map_err(|_| {
            TraceError::parse("VCF", line_number, format!("invalid POS '{}'", fields[1]))
        })?;

        let info = InfoField::from_str(fields[7])
            .map_err(|e| TraceError::parse("VCF", line_number, e))?;

        let alt = fields[4].to_string();
        let sv_type = match info.value("SVTYPE") {
            Some(svtype) => SvType::from_str(svtype).unwrap_or(SvType::OTHER),
            None => SvType::from_alt(&alt),
        };

        // multi-valued SVLEN lists one length per ALT; only one ALT is expected for SVs
        let sv_len = match info.value("SVLEN") {
            Some(raw) => match raw.split(',').next().unwrap_or(raw) {
                MISSING_VALUE => None,
                first => Some(first.parse::<i64>().map_err(|_| {
                    TraceError::parse("VCF", line_number, format!("invalid SVLEN '{}'", raw))
                })?),
            },
            None => None,
        };

        let end = match info.value("END") {
            Some(MISSING_VALUE) | None => None,
            Some(raw) => Some(raw.parse::<u64>().map_err(|_| {
                TraceError::parse("VCF", line_number, format!("invalid END '{}'", raw))
            })?),
        };

        Ok(VariantRecord {
            id: fields[2].to_string(),
            chrom: fields[0].to_string(),
            pos,
            ref_allele: fields[3].to_string(),
            alt,
            sv_type,
            sv_len,
            end,
            info,
            line_number,
            line: line.to_string(),
        })
    }

    ///
    /// Get the original, untouched line
    ///
    pub fn line(&self) -> &str {
        &self.line
    }

    ///
    /// Render the original line with its INFO column swapped for `info`.
    /// All other columns are copied byte for byte.
    ///
    pub fn line_with_info(&self, info: &InfoField) -> String {
        let info = info.to_string();
        self.line
            .split('\t')
            .enumerate()
            .map(|(i, column)| if i == 7 { info.as_str() } else { column })
            .collect::<Vec<&str>>()
            .join("\t")
    }

    ///
    /// 0-based, half-open span of the variant on its own chromosome:
    /// `POS - 1` up to `END`, else `POS + |SVLEN|`, else `POS`.
    ///
    pub fn span(&self) -> (u64, u64) {
        let start = self.pos.saturating_sub(1);
        let end = match (self.end, self.sv_len) {
            (Some(end), _) => end,
            (None, Some(len)) => self.pos.saturating_add(len.unsigned_abs()),
            (None, None) => self.pos,
        };
        (start, end.max(start))
    }
}
