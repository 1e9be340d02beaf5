use std::path::Path;

use anyhow::{Context, Result};
use clap::ArgMatches;
use log::{info, warn};

use trace_core::consts::INS_FASTA_SUFFIX;
use trace_core::models::VariantSet;
use trace_project::InsertionExtractor;

use crate::common::{load_config, output_path};

pub fn run_extract(matches: &ArgMatches) -> Result<()> {
    let vcf = matches
        .get_one::<String>("vcf")
        .expect("A path to a VCF file is required.");
    let vcf = Path::new(vcf);

    let mut config = load_config(matches)?;
    if let Some(min) = matches.get_one::<usize>("min-length") {
        config.extraction.min_length = *min;
    }
    if let Some(max) = matches.get_one::<usize>("max-length") {
        config.extraction.max_length = Some(*max);
    }
    config.validate()?;

    let variants =
        VariantSet::try_from(vcf).with_context(|| format!("Failed to load {}", vcf.display()))?;
    let report = InsertionExtractor::new(&config.extraction).extract(variants.records());

    let output = output_path(matches, vcf, INS_FASTA_SUFFIX);
    report
        .write_fasta_to_path(&output, config.extraction.line_width)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    info!(
        "Wrote {} sequences to {} ({} symbolic skipped, {} outside length bounds)",
        report.extracted(),
        output.display(),
        report.symbolic_skipped,
        report.filtered
    );
    if report.multi_allelic > 0 {
        warn!(
            "{} multi-allelic insertions were reduced to their first ALT allele",
            report.multi_allelic
        );
    }

    Ok(())
}
