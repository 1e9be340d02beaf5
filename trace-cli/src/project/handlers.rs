use std::path::Path;

use anyhow::{Context, Result};
use clap::ArgMatches;
use log::{info, warn};

use trace_core::consts::PROJECTED_SUFFIX;
use trace_core::models::VariantSet;
use trace_project::{BedWrite, BreakpointProjector};

use crate::common::{load_config, output_path};

pub fn run_project(matches: &ArgMatches) -> Result<()> {
    let vcf = matches
        .get_one::<String>("vcf")
        .expect("A path to a VCF file is required.");
    let vcf = Path::new(vcf);

    let mut config = load_config(matches)?;
    if let Some(flank) = matches.get_one::<u64>("del-flank") {
        config.projection.del_flank = *flank;
    }
    if let Some(flank) = matches.get_one::<u64>("flank-size") {
        config.projection.breakpoint_flank = *flank;
    }
    if let Some(flank) = matches.get_one::<u64>("bnd-flank") {
        config.projection.bnd_flank = *flank;
    }
    if matches.get_flag("no-bnd-parse") {
        config.projection.parse_bnd = false;
    }

    let variants =
        VariantSet::try_from(vcf).with_context(|| format!("Failed to load {}", vcf.display()))?;
    let projector = BreakpointProjector::new(&config.projection)?;
    let report = projector.project(variants.records());

    let output = output_path(matches, vcf, PROJECTED_SUFFIX);
    report
        .write_bed(&output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    if !report.unprojectable.is_empty() {
        warn!(
            "{} breakend records could not be projected",
            report.unprojectable.len()
        );
    }
    info!(
        "Wrote {} intervals to {}",
        report.intervals.len(),
        output.display()
    );

    Ok(())
}
