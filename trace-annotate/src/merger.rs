use std::io::Write;

use log::{debug, info};

use trace_core::config::{AnnotationConfig, UnroutedPolicy};
use trace_core::errors::{Result, TraceError};
use trace_core::models::{
    AnnotatedVariant, ConsolidatedTable, EvidenceSource, VariantRecord, VariantSet, VcfLine,
    sentinel_value,
};

use crate::header::{has_info_header, info_header_line};
use crate::routing::RoutingTable;

///
/// Counts of what one merge did to the records.
///
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeSummary {
    pub records: usize,
    /// records whose value lists at least one hit
    pub with_hits: usize,
    /// records that received the zero-hit sentinel
    pub sentinel: usize,
    /// records left as they were, per the unrouted policy
    pub untouched: usize,
    /// data lines that could not be parsed and were copied through
    pub malformed: usize,
}

///
/// Joins consolidated evidence back onto the variant records.
///
#[derive(Debug, Clone)]
pub struct AnnotationMerger {
    routing: RoutingTable,
    tag: String,
}

impl AnnotationMerger {
    pub fn new(config: &AnnotationConfig) -> Result<Self> {
        Ok(AnnotationMerger {
            routing: RoutingTable::from_config(config)?,
            tag: config.tag.clone(),
        })
    }

    pub fn routing(&self) -> &RoutingTable {
        &self.routing
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    ///
    /// Fail when `table` names a variant that is not in `variants`.
    ///
    /// Identities that exist but are routed to the other source are not an
    /// error; their rows are simply never used.
    ///
    pub fn check_join(&self, variants: &VariantSet, table: &ConsolidatedTable) -> Result<()> {
        for id in table.ids() {
            match variants.get(id) {
                None => {
                    return Err(TraceError::Join {
                        id: id.to_string(),
                        origin: format!("the {} table", table.source),
                    });
                }
                Some(record) if self.routing.route(record.sv_type) != Some(table.source) => {
                    debug!(
                        "Variant {} ({}) has a {} row but is not routed to {} evidence",
                        id, record.sv_type, table.source, table.source
                    );
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    ///
    /// Resolve the annotation value of one record.
    ///
    /// A record without a row in its source's table has no hits and gets the
    /// sentinel. A record whose type has no source follows the unrouted policy.
    ///
    pub fn resolve<'a>(
        &self,
        record: &'a VariantRecord,
        homology: &ConsolidatedTable,
        interval: &ConsolidatedTable,
    ) -> AnnotatedVariant<'a> {
        let value = match self.routing.route(record.sv_type) {
            Some(source) => {
                let table = match source {
                    EvidenceSource::SequenceHomology => homology,
                    EvidenceSource::IntervalOverlap => interval,
                };
                Some(
                    table
                        .get(&record.id)
                        .map(|annotation| annotation.render())
                        .unwrap_or_else(sentinel_value),
                )
            }
            None => match self.routing.unrouted() {
                UnroutedPolicy::Sentinel => Some(sentinel_value()),
                UnroutedPolicy::Omit => None,
            },
        };

        AnnotatedVariant { record, value }
    }

    ///
    /// Write the annotated VCF.
    ///
    /// Both tables are checked against the variant set before anything is
    /// written. Lines come out in input order; the INFO definition of the tag is
    /// added right before the column header unless one is already present.
    ///
    /// # Arguments
    /// - variants: the parsed input VCF
    /// - homology: consolidated sequence homology evidence
    /// - interval: consolidated interval overlap evidence
    /// - writer: where the annotated VCF goes
    ///
    pub fn merge<W: Write + ?Sized>(
        &self,
        variants: &VariantSet,
        homology: &ConsolidatedTable,
        interval: &ConsolidatedTable,
        writer: &mut W,
    ) -> Result<MergeSummary> {
        self.check_join(variants, homology)?;
        self.check_join(variants, interval)?;

        let mut summary = MergeSummary::default();
        let mut header_pending = !has_info_header(&variants.lines, &self.tag);
        let sentinel = sentinel_value();

        for line in &variants.lines {
            if header_pending && !matches!(line, VcfLine::Meta(_)) {
                writeln!(writer, "{}", info_header_line(&self.tag))?;
                header_pending = false;
            }

            match line {
                VcfLine::Meta(text) | VcfLine::ColumnHeader(text) => writeln!(writer, "{}", text)?,
                VcfLine::Malformed { text, .. } => {
                    summary.malformed += 1;
                    writeln!(writer, "{}", text)?;
                }
                VcfLine::Record(record) => {
                    let annotated = self.resolve(record, homology, interval);
                    summary.records += 1;
                    match &annotated.value {
                        None => summary.untouched += 1,
                        Some(value) if *value == sentinel => summary.sentinel += 1,
                        Some(_) => summary.with_hits += 1,
                    }
                    writeln!(writer, "{}", annotated.to_line(&self.tag))?;
                }
            }
        }

        if header_pending {
            writeln!(writer, "{}", info_header_line(&self.tag))?;
        }

        info!(
            "Annotated {} records: {} with hits, {} without, {} left untouched, {} malformed lines copied",
            summary.records, summary.with_hits, summary.sentinel, summary.untouched, summary.malformed
        );

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;
    use std::io::Cursor;

    use trace_core::config::EvidenceRoute;
    use trace_core::models::ConsolidatedAnnotation;

    const VCF: &str = "##fileformat=VCFv4.2\n\
                       ##INFO=<ID=SVTYPE,Number=1,Type=String,Description=\"Type\">\n\
                       #CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\n\
                       chr1\t1000\tdel1\tN\t<DEL>\t.\tPASS\tSVTYPE=DEL;SVLEN=-500\n\
                       chr1\t3000\tins1\tA\tACGT\t.\tPASS\tSVTYPE=INS;SVLEN=3\n\
                       chr1\t5000\tcnv1\tN\t<CNV>\t.\tPASS\t.\n\
                       chr1\tbad\tbroken\n";

    fn table(source: EvidenceSource, rows: &[(&str, &str)]) -> ConsolidatedTable {
        let mut table = ConsolidatedTable::new(source);
        for (id, value) in rows {
            table.insert(ConsolidatedAnnotation {
                variant_id: id.to_string(),
                source,
                entries: trace_core::models::parse_encoded(value).unwrap(),
            });
        }
        table
    }

    #[fixture]
    fn variants() -> VariantSet {
        VariantSet::from_reader(Cursor::new(VCF)).unwrap()
    }

    #[fixture]
    fn homology() -> ConsolidatedTable {
        table(
            EvidenceSource::SequenceHomology,
            &[("ins1", "-,100,200,AluY,SINE/Alu,+,1,300,1")],
        )
    }

    #[fixture]
    fn interval() -> ConsolidatedTable {
        table(
            EvidenceSource::IntervalOverlap,
            &[(
                "del1",
                "chr1,1000,2000,L1HS,LINE/L1,+,1,500,2|chr1,1500,2500,SVA,Retroposon/SVA,-,1,100,3",
            )],
        )
    }

    fn merge_to_string(
        merger: &AnnotationMerger,
        variants: &VariantSet,
        homology: &ConsolidatedTable,
        interval: &ConsolidatedTable,
    ) -> (String, MergeSummary) {
        let mut out = Vec::new();
        let summary = merger.merge(variants, homology, interval, &mut out).unwrap();
        (String::from_utf8(out).unwrap(), summary)
    }

    #[rstest]
    fn test_merge(variants: VariantSet, homology: ConsolidatedTable, interval: ConsolidatedTable) {
        let merger = AnnotationMerger::new(&AnnotationConfig::default()).unwrap();
        let (text, summary) = merge_to_string(&merger, &variants, &homology, &interval);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 8);
        assert_eq!(lines[2], info_header_line("RM_TE"));
        assert!(lines[3].starts_with("#CHROM"));
        assert_eq!(
            lines[4],
            "chr1\t1000\tdel1\tN\t<DEL>\t.\tPASS\tSVTYPE=DEL;SVLEN=-500;RM_TE=chr1,1000,2000,L1HS,LINE/L1,+,1,500,2|chr1,1500,2500,SVA,Retroposon/SVA,-,1,100,3"
        );
        assert_eq!(
            lines[5],
            "chr1\t3000\tins1\tA\tACGT\t.\tPASS\tSVTYPE=INS;SVLEN=3;RM_TE=-,100,200,AluY,SINE/Alu,+,1,300,1"
        );
        assert_eq!(lines[6], "chr1\t5000\tcnv1\tN\t<CNV>\t.\tPASS\tRM_TE=-,-,-,-,-,-,-,-,-");
        assert_eq!(lines[7], "chr1\tbad\tbroken");

        assert_eq!(
            summary,
            MergeSummary {
                records: 3,
                with_hits: 2,
                sentinel: 1,
                untouched: 0,
                malformed: 1,
            }
        );
    }

    #[rstest]
    fn test_insertion_never_takes_interval_evidence(variants: VariantSet) {
        // an interval row for an insertion is ignored; its homology row is missing
        let homology = ConsolidatedTable::new(EvidenceSource::SequenceHomology);
        let interval = table(
            EvidenceSource::IntervalOverlap,
            &[("ins1", "chr1,1,2,L1HS,LINE/L1,+,1,2,1")],
        );
        let merger = AnnotationMerger::new(&AnnotationConfig::default()).unwrap();
        let (text, _) = merge_to_string(&merger, &variants, &homology, &interval);

        let ins = text.lines().find(|l| l.contains("\tins1\t")).unwrap();
        assert!(ins.ends_with("RM_TE=-,-,-,-,-,-,-,-,-"));
    }

    #[rstest]
    fn test_merge_is_idempotent(
        variants: VariantSet,
        homology: ConsolidatedTable,
        interval: ConsolidatedTable,
    ) {
        let merger = AnnotationMerger::new(&AnnotationConfig::default()).unwrap();
        let (first, _) = merge_to_string(&merger, &variants, &homology, &interval);

        let reloaded = VariantSet::from_reader(Cursor::new(first.clone())).unwrap();
        let (second, _) = merge_to_string(&merger, &reloaded, &homology, &interval);

        assert_eq!(second, first);
        assert_eq!(second.matches("##INFO=<ID=RM_TE,").count(), 1);
        assert_eq!(second.matches("RM_TE=").count(), 3);
    }

    #[rstest]
    fn test_unknown_identity_is_fatal(variants: VariantSet, homology: ConsolidatedTable) {
        let interval = table(
            EvidenceSource::IntervalOverlap,
            &[("ghost", "chr1,1,2,L1HS,LINE/L1,+,1,2,1")],
        );
        let merger = AnnotationMerger::new(&AnnotationConfig::default()).unwrap();

        let mut out = Vec::new();
        let err = merger
            .merge(&variants, &homology, &interval, &mut out)
            .unwrap_err();

        assert!(matches!(err, TraceError::Join { ref id, .. } if id == "ghost"));
        assert!(out.is_empty());
    }

    #[rstest]
    fn test_omit_policy_leaves_unrouted_records(
        variants: VariantSet,
        homology: ConsolidatedTable,
        interval: ConsolidatedTable,
    ) {
        let mut config = AnnotationConfig {
            unrouted: UnroutedPolicy::Omit,
            ..Default::default()
        };
        config.routing.insert("DEL".to_string(), EvidenceRoute::None);
        let merger = AnnotationMerger::new(&config).unwrap();

        let (text, summary) = merge_to_string(&merger, &variants, &homology, &interval);
        assert!(text.contains("\tSVTYPE=DEL;SVLEN=-500\n"));
        assert!(text.contains("\tPASS\t.\n"));
        assert_eq!(summary.untouched, 2);
    }

    #[rstest]
    fn test_custom_tag(variants: VariantSet, homology: ConsolidatedTable, interval: ConsolidatedTable) {
        let config = AnnotationConfig {
            tag: "TE".to_string(),
            ..Default::default()
        };
        let merger = AnnotationMerger::new(&config).unwrap();
        let (text, _) = merge_to_string(&merger, &variants, &homology, &interval);

        assert!(text.contains("##INFO=<ID=TE,"));
        assert!(text.contains(";TE=-,100,200,AluY"));
        assert!(!text.contains("RM_TE"));
    }

    #[rstest]
    fn test_headerless_input_still_gets_definition(homology: ConsolidatedTable) {
        let variants =
            VariantSet::from_reader(Cursor::new("chr1\t3000\tins1\tA\tACGT\t.\tPASS\tSVTYPE=INS\n"))
                .unwrap();
        let merger = AnnotationMerger::new(&AnnotationConfig::default()).unwrap();
        let interval = ConsolidatedTable::new(EvidenceSource::IntervalOverlap);

        let (text, _) = merge_to_string(&merger, &variants, &homology, &interval);
        assert!(text.starts_with("##INFO=<ID=RM_TE,"));
        assert_eq!(text.lines().count(), 2);
    }

    #[rstest]
    fn test_missing_length_values_still_get_sentinel() {
        let variants = VariantSet::from_reader(Cursor::new(
            "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\n\
             chr1\t100\tbnd1\tN\tN[chr2:500[\t.\tPASS\tSVTYPE=BND;SVLEN=.\n\
             chr1\t900\tdel2\tN\t<DEL>\t.\tPASS\tSVTYPE=DEL;SVLEN=-50;END=.\n",
        ))
        .unwrap();
        let merger = AnnotationMerger::new(&AnnotationConfig::default()).unwrap();
        let homology = ConsolidatedTable::new(EvidenceSource::SequenceHomology);
        let interval = table(
            EvidenceSource::IntervalOverlap,
            &[("del2", "chr1,800,900,L1HS,LINE/L1,+,1,100,4")],
        );

        let (text, summary) = merge_to_string(&merger, &variants, &homology, &interval);

        assert_eq!(summary.records, 2);
        assert_eq!(summary.malformed, 0);
        assert_eq!(summary.sentinel, 1);
        assert!(text.contains("\tSVTYPE=BND;SVLEN=.;RM_TE=-,-,-,-,-,-,-,-,-\n"));
        assert!(text.contains("\tSVTYPE=DEL;SVLEN=-50;END=.;RM_TE=chr1,800,900,L1HS,LINE/L1,+,1,100,4\n"));
    }
}
