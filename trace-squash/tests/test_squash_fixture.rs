//! Consolidation of the shared RepeatMasker and intersect fixtures.

use std::path::PathBuf;

use pretty_assertions::assert_eq;
use rstest::*;

use trace_core::models::{EvidenceSource, VariantSet, read_table_rows_from_path};
use trace_squash::{HitConsolidator, read_intersect_from_path, read_out_from_path};

#[fixture]
fn variants() -> VariantSet {
    let path = PathBuf::from("../tests/data/vcf/small_sv.vcf");
    VariantSet::try_from(path.as_path()).unwrap()
}

fn render(table: &trace_core::models::ConsolidatedTable) -> String {
    let mut out = Vec::new();
    table.write(&mut out, "RM_TE").unwrap();
    String::from_utf8(out).unwrap()
}

#[rstest]
fn test_intersect_fixture_matches_expected_table(variants: VariantSet) {
    let hits =
        read_intersect_from_path(&PathBuf::from("../tests/data/intersect/small_sv_intersected.bed"))
            .unwrap();
    let ids = variants
        .records()
        .filter(|r| r.sv_type != trace_core::models::SvType::INS)
        .map(|r| r.id.as_str());

    let table = HitConsolidator::new(EvidenceSource::IntervalOverlap).consolidate(hits, ids);

    let expected =
        std::fs::read_to_string("../tests/data/tables/small_sv_intersect_squashed.tsv").unwrap();
    assert_eq!(render(&table), expected);
}

#[rstest]
fn test_repeatmasker_fixture_matches_expected_table() {
    let hits = read_out_from_path(&PathBuf::from(
        "../tests/data/repeatmasker/small_sv_INS.fasta.out",
    ))
    .unwrap();

    let table = HitConsolidator::new(EvidenceSource::SequenceHomology).consolidate(hits, ["sv_ins_1"]);

    let expected =
        std::fs::read_to_string("../tests/data/tables/small_sv_homology_squashed.tsv").unwrap();
    assert_eq!(render(&table), expected);
}

#[rstest]
#[case("../tests/data/tables/small_sv_intersect_squashed.tsv", EvidenceSource::IntervalOverlap)]
#[case("../tests/data/tables/small_sv_homology_squashed.tsv", EvidenceSource::SequenceHomology)]
fn test_squashing_a_squashed_table_is_a_noop(#[case] path: &str, #[case] source: EvidenceSource) {
    let rows = read_table_rows_from_path(&PathBuf::from(path)).unwrap();
    let table = HitConsolidator::new(source).consolidate_rows(rows);

    assert_eq!(render(&table), std::fs::read_to_string(path).unwrap());
}
