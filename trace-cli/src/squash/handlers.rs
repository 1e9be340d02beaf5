use std::io::BufRead;
use std::path::Path;

use anyhow::{Context, Result};
use clap::ArgMatches;
use log::info;

use trace_annotate::AnnotationMerger;
use trace_core::consts::SQUASHED_SUFFIX;
use trace_core::models::{
    ConsolidatedAnnotation, ConsolidatedTable, EvidenceSource, TableRow, VariantSet,
    read_table_rows_from_path,
};
use trace_core::utils::get_dynamic_reader;
use trace_squash::{HitConsolidator, read_intersect_from_path, read_out_from_path};

use super::cli::HOMOLOGY;
use crate::common::{load_config, output_path};

///
/// Whether `path` holds a consolidated table rather than raw hits.
///
fn is_consolidated_table(path: &Path) -> Result<bool> {
    let reader = get_dynamic_reader(path)?;
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        return Ok(line.starts_with("#ID"));
    }
    Ok(false)
}

pub fn run_squash(matches: &ArgMatches) -> Result<()> {
    let source = matches
        .get_one::<String>("source")
        .expect("An evidence source is required.");
    let input = matches
        .get_one::<String>("input")
        .expect("A path to a hits file is required.");
    let input = Path::new(input);

    let source = if source == HOMOLOGY {
        EvidenceSource::SequenceHomology
    } else {
        EvidenceSource::IntervalOverlap
    };
    let config = load_config(matches)?;
    let merger = AnnotationMerger::new(&config.annotation)?;
    let consolidator = HitConsolidator::new(source);

    let table = if is_consolidated_table(input)? {
        let rows = read_table_rows_from_path(input)
            .with_context(|| format!("Failed to read {}", input.display()))?;
        squash_with_identities(&consolidator, rows, matches, &merger)?
    } else {
        let hits = match source {
            EvidenceSource::SequenceHomology => read_out_from_path(input),
            EvidenceSource::IntervalOverlap => read_intersect_from_path(input),
        }
        .with_context(|| format!("Failed to read {}", input.display()))?;

        match load_variants(matches)? {
            Some(variants) => {
                let table = consolidator
                    .consolidate(hits, merger.routing().identities(&variants, source));
                merger.check_join(&variants, &table)?;
                table
            }
            None => consolidator.consolidate(hits, std::iter::empty()),
        }
    };

    let output = output_path(matches, input, SQUASHED_SUFFIX);
    table
        .write_to_path(&output, merger.tag())
        .with_context(|| format!("Failed to write {}", output.display()))?;
    info!("Wrote {} rows to {}", table.len(), output.display());

    Ok(())
}

fn load_variants(matches: &ArgMatches) -> Result<Option<VariantSet>> {
    matches
        .get_one::<String>("vcf")
        .map(|vcf| {
            let vcf = Path::new(vcf);
            VariantSet::try_from(vcf).with_context(|| format!("Failed to load {}", vcf.display()))
        })
        .transpose()
}

fn squash_with_identities(
    consolidator: &HitConsolidator,
    rows: Vec<TableRow>,
    matches: &ArgMatches,
    merger: &AnnotationMerger,
) -> Result<ConsolidatedTable> {
    let mut table = consolidator.consolidate_rows(rows);
    if let Some(variants) = load_variants(matches)? {
        merger.check_join(&variants, &table)?;
        for id in merger.routing().identities(&variants, consolidator.source()) {
            if !table.contains(id) {
                table.insert(ConsolidatedAnnotation::empty(id, consolidator.source()));
            }
        }
    }
    Ok(table)
}
