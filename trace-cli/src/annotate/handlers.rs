use std::path::Path;

use anyhow::{Context, Result};
use clap::ArgMatches;
use log::info;

use trace_annotate::{AnnotationMerger, write_output};
use trace_core::consts::ANNOTATED_SUFFIX;
use trace_core::models::{
    ConsolidatedTable, EvidenceSource, VariantSet, read_table_rows_from_path,
};
use trace_squash::HitConsolidator;

use crate::common::{load_config, output_path};

fn load_table(path: &str, source: EvidenceSource) -> Result<ConsolidatedTable> {
    let rows = read_table_rows_from_path(Path::new(path))
        .with_context(|| format!("Failed to read {}", path))?;
    Ok(HitConsolidator::new(source).consolidate_rows(rows))
}

pub fn run_annotate(matches: &ArgMatches) -> Result<()> {
    let vcf = matches
        .get_one::<String>("vcf")
        .expect("A path to a VCF file is required.");
    let vcf = Path::new(vcf);
    let homology = matches
        .get_one::<String>("homology")
        .expect("A consolidated homology table is required.");
    let intersect = matches
        .get_one::<String>("intersect")
        .expect("A consolidated intersect table is required.");
    let overwrite = matches.get_flag("overwrite");

    let mut config = load_config(matches)?;
    if let Some(tag) = matches.get_one::<String>("column-name") {
        config.annotation.tag = tag.clone();
    }
    config.validate()?;

    let merger = AnnotationMerger::new(&config.annotation)?;
    let variants =
        VariantSet::try_from(vcf).with_context(|| format!("Failed to load {}", vcf.display()))?;
    let homology = load_table(homology, EvidenceSource::SequenceHomology)?;
    let interval = load_table(intersect, EvidenceSource::IntervalOverlap)?;

    let output = if matches.get_flag("stdout") {
        None
    } else {
        Some(output_path(matches, vcf, ANNOTATED_SUFFIX))
    };

    let summary = write_output(output.as_deref(), overwrite, |w| {
        merger.merge(&variants, &homology, &interval, w)
    })?;

    info!(
        "Annotated {} records ({} with hits, {} sentinel, {} untouched, {} malformed)",
        summary.records, summary.with_hits, summary.sentinel, summary.untouched, summary.malformed
    );
    if let Some(output) = output {
        info!("Wrote {}", output.display());
    }

    Ok(())
}
