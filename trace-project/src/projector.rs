use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::{debug, warn};
use rayon::prelude::*;

use trace_core::config::ProjectionConfig;
use trace_core::errors::{Result, TraceError};
use trace_core::models::{Interval, IntervalTag, SvType, VariantRecord};

use crate::breakend::BreakendParser;

///
/// Everything one projection pass produced: the query intervals, plus the
/// identities of records that could not be projected.
///
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectionReport {
    pub intervals: Vec<Interval>,
    pub unprojectable: Vec<String>,
}

impl ProjectionReport {
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }
}

pub trait BedWrite {
    ///
    /// Write the intervals to disk as a four column BED file
    ///
    /// # Arguments
    /// - path: the path to the file to dump to
    fn write_bed<T: AsRef<Path>>(&self, path: T) -> std::io::Result<()>;
}

impl BedWrite for ProjectionReport {
    fn write_bed<T: AsRef<Path>>(&self, path: T) -> std::io::Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = BufWriter::new(File::create(path)?);

        for interval in &self.intervals {
            writeln!(file, "{}", interval.as_bed_line())?;
        }
        file.flush()
    }
}

///
/// Turns non-insertion variant records into the genomic windows that get
/// intersected with a repeat track.
///
#[derive(Debug, Clone)]
pub struct BreakpointProjector {
    config: ProjectionConfig,
    parser: BreakendParser,
}

impl BreakpointProjector {
    pub fn new(config: &ProjectionConfig) -> Result<Self> {
        Ok(BreakpointProjector {
            config: config.clone(),
            parser: BreakendParser::new()?,
        })
    }

    fn window(&self, chrom: &str, start: u64, end: u64, tag: IntervalTag, id: &str) -> Interval {
        let start = start.max(self.config.min_coord);
        Interval {
            chrom: chrom.to_string(),
            start,
            end: end.max(start.saturating_add(1)),
            tag,
            variant_id: id.to_string(),
        }
    }

    ///
    /// Project one record.
    ///
    /// Insertions and unclassified records yield no intervals. A breakend whose
    /// ALT matches none of the bracket grammars yields a `Projection` error.
    ///
    /// # Arguments
    /// - record: the variant to project
    ///
    pub fn project_record(&self, record: &VariantRecord) -> Result<Vec<Interval>> {
        let id = record.id.as_str();
        let chrom = record.chrom.as_str();
        let (start, end) = record.span();

        let intervals = match record.sv_type {
            SvType::DEL => {
                let flank = self.config.del_flank;
                vec![self.window(
                    chrom,
                    start.saturating_sub(flank),
                    end.saturating_add(flank),
                    IntervalTag::Span,
                    id,
                )]
            }
            SvType::DUP | SvType::INV => {
                let flank = self.config.breakpoint_flank;
                vec![
                    self.window(
                        chrom,
                        start.saturating_sub(flank),
                        start.saturating_add(flank),
                        IntervalTag::LeftJunction,
                        id,
                    ),
                    self.window(
                        chrom,
                        end.saturating_sub(flank),
                        end.saturating_add(flank),
                        IntervalTag::RightJunction,
                        id,
                    ),
                ]
            }
            SvType::BND if !self.config.parse_bnd => {
                let flank = self.config.bnd_flank;
                vec![self.window(
                    chrom,
                    start.saturating_sub(flank),
                    record.pos.saturating_add(flank),
                    IntervalTag::Span,
                    id,
                )]
            }
            SvType::BND => {
                let breakend = self.parser.parse(&record.alt).ok_or_else(|| {
                    TraceError::Projection {
                        id: id.to_string(),
                        alt: record.alt.clone(),
                    }
                })?;
                let flank = self.config.bnd_flank;
                let mate_start = breakend.mate_pos.saturating_sub(1);
                vec![
                    self.window(
                        chrom,
                        start.saturating_sub(flank),
                        record.pos.saturating_add(flank),
                        IntervalTag::LocalBreakend(breakend.orientation),
                        id,
                    ),
                    self.window(
                        &breakend.mate_chrom,
                        mate_start.saturating_sub(flank),
                        breakend.mate_pos.saturating_add(flank),
                        IntervalTag::MateBreakend(breakend.orientation),
                        id,
                    ),
                ]
            }
            SvType::INS | SvType::OTHER => Vec::new(),
        };

        Ok(intervals)
    }

    ///
    /// Project a batch of records in parallel. Projection errors are logged and
    /// the record is reported as unprojectable; other records are unaffected.
    ///
    /// Intervals come back in record order.
    ///
    pub fn project<'a, I>(&self, records: I) -> ProjectionReport
    where
        I: IntoIterator<Item = &'a VariantRecord>,
    {
        let records: Vec<&VariantRecord> = records.into_iter().collect();

        let results: Vec<(&str, Result<Vec<Interval>>)> = records
            .par_iter()
            .map(|record| (record.id.as_str(), self.project_record(record)))
            .collect();

        let mut report = ProjectionReport::default();
        for (id, result) in results {
            match result {
                Ok(intervals) => report.intervals.extend(intervals),
                Err(e) => {
                    warn!("{}; no interval evidence will be gathered", e);
                    report.unprojectable.push(id.to_string());
                }
            }
        }

        debug!(
            "Projected {} intervals covering {} bp from {} records ({} unprojectable)",
            report.intervals.len(),
            report
                .intervals
                .iter()
                .fold(0u64, |total, i| total.saturating_add(i.width())),
            records.len(),
            report.unprojectable.len()
        );

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    use trace_core::models::BreakendOrientation;

    #[fixture]
    fn projector() -> BreakpointProjector {
        BreakpointProjector::new(&ProjectionConfig::default()).unwrap()
    }

    fn record(chrom: &str, pos: u64, alt: &str, info: &str) -> VariantRecord {
        let line = format!("{}\t{}\tsv1\tN\t{}\t.\tPASS\t{}", chrom, pos, alt, info);
        VariantRecord::parse(&line, 1).unwrap()
    }

    fn coords(intervals: &[Interval]) -> Vec<(String, u64, u64, String)> {
        intervals
            .iter()
            .map(|i| (i.chrom.clone(), i.start, i.end, i.tag.to_string()))
            .collect()
    }

    #[rstest]
    fn test_deletion_is_widened_by_flank(projector: BreakpointProjector) {
        let del = record("chr1", 10000, "<DEL>", "SVTYPE=DEL;SVLEN=-500");
        let intervals = projector.project_record(&del).unwrap();

        assert_eq!(
            coords(&intervals),
            vec![("chr1".to_string(), 8999, 11500, "span".to_string())]
        );
        assert_eq!(intervals[0].name(), "sv1#span");
    }

    #[rstest]
    fn test_deletion_near_chromosome_start_is_clamped(projector: BreakpointProjector) {
        let del = record("chr1", 100, "<DEL>", "SVTYPE=DEL;END=300");
        let intervals = projector.project_record(&del).unwrap();
        assert_eq!(intervals[0].start, 0);
        assert_eq!(intervals[0].end, 1300);
    }

    #[rstest]
    fn test_extreme_end_saturates(projector: BreakpointProjector) {
        let end = u64::MAX - 10;
        let del = record("chr1", 100, "<DEL>", &format!("SVTYPE=DEL;END={}", end));
        let intervals = projector.project_record(&del).unwrap();
        assert_eq!(intervals[0].end, u64::MAX);

        let dup = record("chr1", 100, "<DUP>", &format!("SVTYPE=DUP;END={}", end));
        let intervals = projector.project_record(&dup).unwrap();
        assert_eq!(intervals[1].start, end - 1000);
        assert_eq!(intervals[1].end, u64::MAX);
        assert_eq!(intervals[1].width(), 1010);
    }

    #[rstest]
    fn test_breakend_without_mate_parsing() {
        let projector = BreakpointProjector::new(&ProjectionConfig {
            parse_bnd: false,
            ..Default::default()
        })
        .unwrap();
        let bnd = record("chr1", 60000, "not-a-breakend", "SVTYPE=BND");
        let intervals = projector.project_record(&bnd).unwrap();

        assert_eq!(
            coords(&intervals),
            vec![("chr1".to_string(), 59999, 60000, "span".to_string())]
        );
    }

    #[rstest]
    fn test_missing_svlen_breakend_is_projected(projector: BreakpointProjector) {
        let bnd = record("chr1", 60000, "N[chr2:500[", "SVTYPE=BND;SVLEN=.");
        assert_eq!(projector.project_record(&bnd).unwrap().len(), 2);
    }

    #[rstest]
    #[case("DUP")]
    #[case("INV")]
    fn test_junction_windows(projector: BreakpointProjector, #[case] svtype: &str) {
        let rec = record(
            "chr3",
            20000,
            &format!("<{}>", svtype),
            &format!("SVTYPE={};END=23000", svtype),
        );
        let intervals = projector.project_record(&rec).unwrap();

        assert_eq!(
            coords(&intervals),
            vec![
                ("chr3".to_string(), 18999, 20999, "left".to_string()),
                ("chr3".to_string(), 22000, 24000, "right".to_string()),
            ]
        );
    }

    #[rstest]
    fn test_forward_forward_breakend(projector: BreakpointProjector) {
        let bnd = record("chr1", 60000, "N[chr2:500[", "SVTYPE=BND");
        let intervals = projector.project_record(&bnd).unwrap();

        let ff = BreakendOrientation::ForwardForward;
        assert_eq!(intervals.len(), 2);
        assert_eq!(intervals[0].tag, IntervalTag::LocalBreakend(ff));
        assert_eq!((intervals[0].start, intervals[0].end), (59999, 60000));

        let mate = &intervals[1];
        assert_eq!(mate.chrom, "chr2");
        assert_eq!((mate.start, mate.end), (499, 500));
        assert_eq!(mate.tag, IntervalTag::MateBreakend(ff));
    }

    #[rstest]
    fn test_reverse_forward_breakend(projector: BreakpointProjector) {
        let bnd = record("chr1", 60000, "]chr2:500]N", "SVTYPE=BND");
        let intervals = projector.project_record(&bnd).unwrap();

        let rf = BreakendOrientation::ReverseForward;
        assert_eq!(intervals[1].chrom, "chr2");
        assert_eq!(intervals[1].end, 500);
        assert_eq!(intervals[1].tag, IntervalTag::MateBreakend(rf));
        assert_eq!(intervals[1].name(), "sv1#mate:RF");
    }

    #[rstest]
    fn test_mate_position_zero(projector: BreakpointProjector) {
        let bnd = record("chr1", 5, "N[chr2:0[", "SVTYPE=BND");
        let intervals = projector.project_record(&bnd).unwrap();
        assert_eq!((intervals[1].start, intervals[1].end), (0, 1));
    }

    #[rstest]
    fn test_breakend_flank() {
        let config = ProjectionConfig {
            bnd_flank: 50,
            ..Default::default()
        };
        let projector = BreakpointProjector::new(&config).unwrap();
        let bnd = record("chr1", 1000, "[chr5:2000[N", "SVTYPE=BND");
        let intervals = projector.project_record(&bnd).unwrap();

        assert_eq!(
            coords(&intervals),
            vec![
                ("chr1".to_string(), 949, 1050, "local:RR".to_string()),
                ("chr5".to_string(), 1949, 2050, "mate:RR".to_string()),
            ]
        );
    }

    #[rstest]
    fn test_unrecognized_breakend_is_projection_error(projector: BreakpointProjector) {
        let bnd = record("chr1", 1000, "N[chr2:500]", "SVTYPE=BND");
        let err = projector.project_record(&bnd).unwrap_err();
        assert!(matches!(err, TraceError::Projection { .. }));
        assert!(err.is_recoverable());
    }

    #[rstest]
    #[case("NACGT", "SVTYPE=INS;SVLEN=4")]
    #[case("<CNV>", ".")]
    fn test_insertions_and_others_are_not_projected(
        projector: BreakpointProjector,
        #[case] alt: &str,
        #[case] info: &str,
    ) {
        let rec = record("chr1", 1000, alt, info);
        assert!(projector.project_record(&rec).unwrap().is_empty());
    }

    #[rstest]
    fn test_batch_reports_unprojectable(projector: BreakpointProjector) {
        let good = record("chr1", 10000, "<DEL>", "SVTYPE=DEL;SVLEN=-500");
        let bad = VariantRecord::parse("chr1\t5\tbad_bnd\tN\tN[[\t.\tPASS\tSVTYPE=BND", 2).unwrap();

        let report = projector.project([&good, &bad]);
        assert_eq!(report.intervals.len(), 1);
        assert_eq!(report.unprojectable, vec!["bad_bnd".to_string()]);
    }

    #[rstest]
    fn test_write_bed() {
        let projector = BreakpointProjector::new(&ProjectionConfig::default()).unwrap();
        let del = record("chr1", 10000, "<DEL>", "SVTYPE=DEL;SVLEN=-500");
        let report = projector.project([&del]);

        let tempdir = tempfile::tempdir().unwrap();
        let path = tempdir.path().join("out").join("projected.bed");
        report.write_bed(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "chr1\t8999\t11500\tsv1#span\n");
    }
}
