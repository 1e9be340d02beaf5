use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

use log::{debug, warn};

use crate::errors::{Result, TraceError};
use crate::models::variant::VariantRecord;
use crate::utils::get_dynamic_reader;

///
/// One line of a VCF file, classified.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VcfLine {
    /// `##` meta-information line
    Meta(String),
    /// the `#CHROM ...` column header
    ColumnHeader(String),
    Record(VariantRecord),
    /// a data line that failed to parse; carried through untouched
    Malformed { line_number: usize, text: String },
}

///
/// A parsed VCF: header block plus records, in file order, with an identity index.
///
/// Identities must be present and unique, otherwise joining evidence back onto
/// the records is undefined and loading fails.
///
#[derive(Debug, Clone, Default)]
pub struct VariantSet {
    pub lines: Vec<VcfLine>,
    index: HashMap<String, usize>,
}

impl VariantSet {
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut lines = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for (i, line) in reader.lines().enumerate() {
            let line_number = i + 1;
            let line = line?;
            let line = line.trim_end_matches('\r');

            if line.is_empty() {
                continue;
            }

            if line.starts_with("##") {
                lines.push(VcfLine::Meta(line.to_string()));
                continue;
            }

            if line.starts_with('#') {
                lines.push(VcfLine::ColumnHeader(line.to_string()));
                continue;
            }

            match VariantRecord::parse(line, line_number) {
                Ok(record) => {
                    if record.id.is_empty() || record.id == "." {
                        return Err(TraceError::VariantIdentity {
                            line: line_number,
                            message: "variant has no ID".to_string(),
                        });
                    }
                    if let Some(VcfLine::Record(first)) = index.get(&record.id).map(|i| &lines[*i]) {
                        return Err(TraceError::VariantIdentity {
                            line: line_number,
                            message: format!(
                                "ID {} already used by the record at line {}",
                                record.id, first.line_number
                            ),
                        });
                    }
                    index.insert(record.id.clone(), lines.len());
                    lines.push(VcfLine::Record(record));
                }
                Err(e) if e.is_recoverable() => {
                    warn!("{}; record left unannotated", e);
                    lines.push(VcfLine::Malformed {
                        line_number,
                        text: line.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        debug!("Loaded {} variant records", index.len());

        Ok(VariantSet { lines, index })
    }

    ///
    /// Iterate over successfully parsed records, in file order.
    ///
    pub fn records(&self) -> impl Iterator<Item = &VariantRecord> {
        self.lines.iter().filter_map(|l| match l {
            VcfLine::Record(r) => Some(r),
            _ => None,
        })
    }

    pub fn get(&self, id: &str) -> Option<&VariantRecord> {
        match self.index.get(id).map(|i| &self.lines[*i]) {
            Some(VcfLine::Record(r)) => Some(r),
            _ => None,
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Number of parsed records.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Number of data lines, malformed ones included.
    pub fn data_line_count(&self) -> usize {
        self.lines
            .iter()
            .filter(|l| matches!(l, VcfLine::Record(_) | VcfLine::Malformed { .. }))
            .count()
    }
}

impl TryFrom<&Path> for VariantSet {
    type Error = TraceError;

    fn try_from(path: &Path) -> Result<Self> {
        let reader = get_dynamic_reader(path)?;
        VariantSet::from_reader(reader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;
    use std::io::Cursor;
    use std::path::PathBuf;

    use crate::models::SvType;

    fn load(text: &str) -> Result<VariantSet> {
        VariantSet::from_reader(Cursor::new(text.to_string()))
    }

    #[rstest]
    fn test_load_keeps_order_and_header() {
        let vcf = "##fileformat=VCFv4.2\n#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\n\
                   chr1\t10\tb\tN\t<DEL>\t.\tPASS\tSVTYPE=DEL;SVLEN=-50\n\
                   chr1\t20\ta\tN\tNACGT\t.\tPASS\tSVTYPE=INS;SVLEN=4\n";
        let set = load(vcf).unwrap();

        assert_eq!(set.len(), 2);
        assert!(matches!(set.lines[0], VcfLine::Meta(_)));
        assert!(matches!(set.lines[1], VcfLine::ColumnHeader(_)));
        let ids: Vec<&str> = set.records().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(set.get("a").unwrap().sv_type, SvType::INS);
    }

    #[rstest]
    fn test_duplicate_identity_fails_loudly() {
        let vcf = "chr1\t10\tdup\tN\t<DEL>\t.\tPASS\t.\nchr1\t20\tdup\tN\t<DEL>\t.\tPASS\t.\n";
        let err = load(vcf).unwrap_err();
        assert!(matches!(err, TraceError::VariantIdentity { line: 2, .. }));
    }

    #[rstest]
    fn test_missing_identity_fails_loudly() {
        let err = load("chr1\t10\t.\tN\t<DEL>\t.\tPASS\t.\n").unwrap_err();
        assert!(matches!(err, TraceError::VariantIdentity { line: 1, .. }));
    }

    #[rstest]
    fn test_malformed_line_is_kept_verbatim() {
        let vcf = "chr1\t10\tok\tN\t<DEL>\t.\tPASS\t.\nbroken\tline\n";
        let set = load(vcf).unwrap();

        assert_eq!(set.len(), 1);
        assert_eq!(set.data_line_count(), 2);
        assert_eq!(
            set.lines[1],
            VcfLine::Malformed {
                line_number: 2,
                text: "broken\tline".to_string()
            }
        );
    }

    #[rstest]
    fn test_load_from_path() {
        let path = PathBuf::from("../tests/data/vcf/small_sv.vcf");
        let set = VariantSet::try_from(path.as_path()).unwrap();
        assert_eq!(set.len(), 6);
    }
}
