use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::debug;

use trace_core::config::ExtractionConfig;
use trace_core::models::{SvType, VariantRecord};

///
/// The inserted sequence of one insertion record, keyed by variant identity.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertionSequence {
    pub variant_id: String,
    pub chrom: String,
    pub pos: u64,
    pub sv_len: Option<i64>,
    pub sequence: String,
}

impl InsertionSequence {
    ///
    /// FASTA header line (without `>`): `<id> CHR=<chrom> POS=<pos>[ LEN=<svlen>]`
    ///
    pub fn header(&self) -> String {
        let mut header = format!("{} CHR={} POS={}", self.variant_id, self.chrom, self.pos);
        if let Some(len) = self.sv_len {
            header.push_str(&format!(" LEN={}", len));
        }
        header
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionReport {
    pub sequences: Vec<InsertionSequence>,
    /// insertions with a symbolic, breakend or missing ALT
    pub symbolic_skipped: usize,
    /// insertions outside the configured length bounds
    pub filtered: usize,
    /// insertions with several ALT alleles, of which only the first is used
    pub multi_allelic: usize,
}

impl ExtractionReport {
    pub fn extracted(&self) -> usize {
        self.sequences.len()
    }

    ///
    /// Write the sequences as FASTA, wrapping sequence lines at `line_width`.
    ///
    pub fn write_fasta<W: Write>(&self, writer: &mut W, line_width: usize) -> std::io::Result<()> {
        let width = line_width.max(1);
        for insertion in &self.sequences {
            writeln!(writer, ">{}", insertion.header())?;
            for chunk in insertion.sequence.as_bytes().chunks(width) {
                writer.write_all(chunk)?;
                writer.write_all(b"\n")?;
            }
        }
        Ok(())
    }

    pub fn write_fasta_to_path<T: AsRef<Path>>(
        &self,
        path: T,
        line_width: usize,
    ) -> std::io::Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut writer = BufWriter::new(File::create(path)?);
        self.write_fasta(&mut writer, line_width)?;
        writer.flush()
    }
}

enum Extraction {
    Sequence(InsertionSequence),
    Symbolic,
    Filtered,
}

///
/// Emits the inserted sequence of every insertion record for homology search.
///
#[derive(Debug, Clone)]
pub struct InsertionExtractor {
    config: ExtractionConfig,
}

impl InsertionExtractor {
    pub fn new(config: &ExtractionConfig) -> Self {
        InsertionExtractor {
            config: config.clone(),
        }
    }

    fn extract_record(&self, record: &VariantRecord) -> Extraction {
        let alt = record.alt.split(',').next().unwrap_or(&record.alt);
        if alt.is_empty()
            || alt == "."
            || alt.starts_with('<')
            || alt.contains('[')
            || alt.contains(']')
        {
            return Extraction::Symbolic;
        }

        // drop the padding base shared with REF
        let inserted = match (alt.chars().next(), record.ref_allele.chars().next()) {
            (Some(a), Some(r)) if a.eq_ignore_ascii_case(&r) => &alt[a.len_utf8()..],
            _ => alt,
        };

        let sequence: String = inserted
            .chars()
            .filter(|c| matches!(c.to_ascii_uppercase(), 'A' | 'C' | 'G' | 'T' | 'N'))
            .map(|c| c.to_ascii_uppercase())
            .collect();

        let too_short = sequence.len() < self.config.min_length;
        let too_long = self
            .config
            .max_length
            .is_some_and(|max| sequence.len() > max);
        if too_short || too_long {
            debug!(
                "Skipping insertion {}: {} bp outside length bounds",
                record.id,
                sequence.len()
            );
            return Extraction::Filtered;
        }

        Extraction::Sequence(InsertionSequence {
            variant_id: record.id.clone(),
            chrom: record.chrom.clone(),
            pos: record.pos,
            sv_len: record.sv_len,
            sequence,
        })
    }

    ///
    /// Extract every insertion among `records`, in record order. Non-insertion
    /// records are ignored.
    ///
    pub fn extract<'a, I>(&self, records: I) -> ExtractionReport
    where
        I: IntoIterator<Item = &'a VariantRecord>,
    {
        let mut report = ExtractionReport::default();

        for record in records.into_iter().filter(|r| r.sv_type == SvType::INS) {
            if record.alt.contains(',') {
                debug!(
                    "Insertion {} has several ALT alleles; extracting the first",
                    record.id
                );
                report.multi_allelic += 1;
            }
            match self.extract_record(record) {
                Extraction::Sequence(seq) => report.sequences.push(seq),
                Extraction::Symbolic => {
                    debug!("Skipping symbolic insertion {}: {}", record.id, record.alt);
                    report.symbolic_skipped += 1;
                }
                Extraction::Filtered => report.filtered += 1,
            }
        }

        report
    }
}
