use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use fxhash::FxHashMap as HashMap;
use log::{debug, info, warn};
use rayon::prelude::*;

use trace_core::errors::TraceError;
use trace_core::models::{
    ConsolidatedAnnotation, ConsolidatedTable, EvidenceSource, HitEntry, RawHit, TableRow,
    parse_encoded,
};

///
/// Sort one identity's hits into their final order and drop exact duplicates.
/// Distinct hits that share a rank are kept and reported.
///
fn fold_group(variant_id: &str, mut entries: Vec<HitEntry>) -> Vec<HitEntry> {
    entries.sort();
    entries.dedup();

    for window in entries.chunk_by(|a, b| a.rank == b.rank) {
        if window.len() > 1 {
            warn!(
                "{}",
                TraceError::ConsolidationAmbiguity {
                    id: variant_id.to_string(),
                    rank: window[0].rank,
                    count: window.len(),
                }
            );
        }
    }

    entries
}

///
/// Folds raw hits of one evidence source into one consolidated annotation per
/// variant identity.
///
#[derive(Debug, Clone, Copy)]
pub struct HitConsolidator {
    source: EvidenceSource,
}

impl HitConsolidator {
    pub fn new(source: EvidenceSource) -> Self {
        HitConsolidator { source }
    }

    pub fn source(&self) -> EvidenceSource {
        self.source
    }

    fn fold_groups<I>(&self, groups: I) -> ConsolidatedTable
    where
        I: IntoParallelIterator<Item = (String, Vec<HitEntry>)>,
    {
        let annotations: Vec<ConsolidatedAnnotation> = groups
            .into_par_iter()
            .map(|(variant_id, entries)| {
                let entries = fold_group(&variant_id, entries);
                ConsolidatedAnnotation {
                    variant_id,
                    source: self.source,
                    entries,
                }
            })
            .collect();

        let mut table = ConsolidatedTable::new(self.source);
        for annotation in annotations {
            table.insert(annotation);
        }
        table
    }

    ///
    /// Consolidate a stream of raw hits.
    ///
    /// Every identity in `identities` gets a row even without hits, so that
    /// zero-hit variants carry the sentinel. Hits of the other evidence source
    /// are ignored.
    ///
    /// # Arguments
    /// - hits: raw hits, in any order
    /// - identities: variant identities that must appear in the table
    ///
    pub fn consolidate<'a, I>(&self, hits: Vec<RawHit>, identities: I) -> ConsolidatedTable
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut groups: HashMap<String, Vec<HitEntry>> = HashMap::default();
        let mut foreign = 0;
        let total = hits.len();

        for hit in hits {
            if hit.source != self.source {
                foreign += 1;
                continue;
            }
            groups.entry(hit.variant_id).or_default().push(hit.entry);
        }
        if foreign > 0 {
            warn!(
                "Ignored {} hits from another evidence source while consolidating {} evidence",
                foreign, self.source
            );
        }

        let with_hits = groups.len();
        for id in identities {
            groups.entry(id.to_string()).or_default();
        }

        info!(
            "Consolidated {} {} hits into {} variants ({} without hits)",
            total - foreign,
            self.source,
            groups.len(),
            groups.len() - with_hits
        );

        self.fold_groups(groups)
    }

    ///
    /// Consolidate rows of previously consolidated tables.
    ///
    /// Rows whose identities are already unique are taken as they are, which
    /// makes consolidating a consolidated table a no-op. Repeated identities are
    /// merged and refolded.
    ///
    pub fn consolidate_rows(&self, rows: Vec<TableRow>) -> ConsolidatedTable {
        let mut groups: HashMap<String, Vec<HitEntry>> = HashMap::default();
        let mut row_counts: HashMap<String, usize> = HashMap::default();

        for row in rows {
            match parse_encoded(&row.value) {
                Ok(entries) => {
                    *row_counts.entry(row.variant_id.clone()).or_default() += 1;
                    groups.entry(row.variant_id).or_default().extend(entries);
                }
                Err(e) => warn!(
                    "{}; row skipped",
                    TraceError::parse("consolidated table", row.line_number, e)
                ),
            }
        }

        if row_counts.values().all(|count| *count == 1) {
            debug!("Table is already consolidated; keeping {} rows as they are", groups.len());
            let mut table = ConsolidatedTable::new(self.source);
            for (variant_id, entries) in groups {
                table.insert(ConsolidatedAnnotation {
                    variant_id,
                    source: self.source,
                    entries,
                });
            }
            return table;
        }

        self.fold_groups(groups)
    }
}

///
/// Write raw homology hits as a nine column BED-like table, one row per hit.
///
pub fn write_hits<T: AsRef<Path>>(hits: &[RawHit], path: T) -> std::io::Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = BufWriter::new(File::create(path)?);
    writeln!(
        writer,
        "#ID\tstart\tend\trepeat_name\trepeat_family\tstrand\trepeat_start\trepeat_end\trank"
    )?;
    for hit in hits {
        let e = &hit.entry;
        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            hit.variant_id,
            e.start,
            e.end,
            e.repeat_name,
            e.repeat_family,
            e.strand,
            e.rep_start,
            e.rep_end,
            e.rank
        )?;
    }
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    fn interval_hit(id: &str, entry: &str) -> RawHit {
        RawHit {
            source: EvidenceSource::IntervalOverlap,
            variant_id: id.to_string(),
            entry: entry.parse().unwrap(),
        }
    }

    fn row(line_number: usize, id: &str, value: &str) -> TableRow {
        TableRow {
            line_number,
            variant_id: id.to_string(),
            value: value.to_string(),
        }
    }

    #[fixture]
    fn consolidator() -> HitConsolidator {
        HitConsolidator::new(EvidenceSource::IntervalOverlap)
    }

    #[rstest]
    fn test_deletion_end_to_end_value(consolidator: HitConsolidator) {
        let hits = vec![
            interval_hit("del1", "chr1,1500,2500,SVA,Retroposon/SVA,-,1,100,3"),
            interval_hit("del1", "chr1,1000,2000,L1HS,LINE/L1,+,1,500,2"),
        ];
        let table = consolidator.consolidate(hits, ["del1"]);

        assert_eq!(table.len(), 1);
        assert_eq!(
            table.get("del1").unwrap().render(),
            "chr1,1000,2000,L1HS,LINE/L1,+,1,500,2|chr1,1500,2500,SVA,Retroposon/SVA,-,1,100,3"
        );
    }

    #[rstest]
    fn test_arrival_order_does_not_matter(consolidator: HitConsolidator) {
        let hits = vec![
            interval_hit("a", "chr1,50,60,AluY,SINE/Alu,+,1,10,1"),
            interval_hit("b", "chr2,5,6,MIR,SINE/MIR,-,1,10,7"),
            interval_hit("a", "chr1,10,20,L1HS,LINE/L1,+,1,10,1"),
            interval_hit("a", "chr1,10,20,AluSx,SINE/Alu,+,1,10,1"),
        ];
        let mut reversed = hits.clone();
        reversed.reverse();

        let forward = consolidator.consolidate(hits, std::iter::empty());
        let backward = consolidator.consolidate(reversed, std::iter::empty());

        assert_eq!(forward, backward);
        assert_eq!(
            forward.get("a").unwrap().render(),
            "chr1,10,20,AluSx,SINE/Alu,+,1,10,1|chr1,10,20,L1HS,LINE/L1,+,1,10,1|chr1,50,60,AluY,SINE/Alu,+,1,10,1"
        );
    }

    #[rstest]
    fn test_duplicate_hits_collapse(consolidator: HitConsolidator) {
        // both junction windows of a small duplication hit the same repeat
        let hits = vec![
            interval_hit("dup1", "chr1,100,400,AluY,SINE/Alu,+,1,300,5"),
            interval_hit("dup1", "chr1,100,400,AluY,SINE/Alu,+,1,300,5"),
        ];
        let table = consolidator.consolidate(hits, std::iter::empty());
        assert_eq!(table.get("dup1").unwrap().entries.len(), 1);
    }

    #[rstest]
    fn test_zero_hit_identities_get_sentinel(consolidator: HitConsolidator) {
        let table = consolidator.consolidate(Vec::new(), ["x", "y"]);

        assert_eq!(table.len(), 2);
        assert_eq!(table.get("y").unwrap().render(), "-,-,-,-,-,-,-,-,-");
    }

    #[rstest]
    fn test_other_source_is_ignored(consolidator: HitConsolidator) {
        let homology = RawHit {
            source: EvidenceSource::SequenceHomology,
            variant_id: "ins1".to_string(),
            entry: "-,100,200,AluY,SINE/Alu,+,1,300,1".parse().unwrap(),
        };
        let table = consolidator.consolidate(vec![homology], std::iter::empty());
        assert!(table.is_empty());
    }

    #[rstest]
    fn test_insertion_homology_value() {
        let consolidator = HitConsolidator::new(EvidenceSource::SequenceHomology);
        let hit = RawHit {
            source: EvidenceSource::SequenceHomology,
            variant_id: "ins1".to_string(),
            entry: "-,100,200,AluY,SINE/Alu,+,1,300,1".parse().unwrap(),
        };
        let table = consolidator.consolidate(vec![hit], ["ins1"]);
        assert_eq!(
            table.get("ins1").unwrap().render(),
            "-,100,200,AluY,SINE/Alu,+,1,300,1"
        );
    }

    #[rstest]
    fn test_consolidating_a_table_is_a_noop(consolidator: HitConsolidator) {
        let hits = vec![
            interval_hit("b", "chr1,1500,2500,SVA,Retroposon/SVA,-,1,100,3"),
            interval_hit("b", "chr1,1000,2000,L1HS,LINE/L1,+,1,500,2"),
        ];
        let first = consolidator.consolidate(hits, ["a"]);

        let rows: Vec<TableRow> = first
            .iter()
            .enumerate()
            .map(|(i, ann)| row(i + 2, &ann.variant_id, &ann.render()))
            .collect();
        let second = consolidator.consolidate_rows(rows);

        assert_eq!(second, first);
    }

    #[rstest]
    fn test_repeated_identities_are_merged(consolidator: HitConsolidator) {
        let rows = vec![
            row(1, "sv1", "chr1,1500,2500,SVA,Retroposon/SVA,-,1,100,3"),
            row(2, "sv1", "-,-,-,-,-,-,-,-,-"),
            row(3, "sv1", "chr1,1000,2000,L1HS,LINE/L1,+,1,500,2|chr1,1500,2500,SVA,Retroposon/SVA,-,1,100,3"),
        ];
        let table = consolidator.consolidate_rows(rows);

        assert_eq!(
            table.get("sv1").unwrap().render(),
            "chr1,1000,2000,L1HS,LINE/L1,+,1,500,2|chr1,1500,2500,SVA,Retroposon/SVA,-,1,100,3"
        );
    }

    #[rstest]
    fn test_unparseable_rows_skipped(consolidator: HitConsolidator) {
        let rows = vec![row(1, "sv1", "not,an,entry"), row(2, "sv2", "-,-,-,-,-,-,-,-,-")];
        let table = consolidator.consolidate_rows(rows);

        assert!(!table.contains("sv1"));
        assert!(table.contains("sv2"));
    }

    #[rstest]
    fn test_write_hits() {
        let hit = RawHit {
            source: EvidenceSource::SequenceHomology,
            variant_id: "ins1".to_string(),
            entry: "-,100,200,AluY,SINE/Alu,+,1,300,1".parse().unwrap(),
        };
        let tempdir = tempfile::tempdir().unwrap();
        let path = tempdir.path().join("ins_hits.bed");
        write_hits(&[hit], &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().nth(1).unwrap(), "ins1\t100\t200\tAluY\tSINE/Alu\t+\t1\t300\t1");
    }
}
