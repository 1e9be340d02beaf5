use std::path::PathBuf;

use anyhow::Result;
use clap::ArgMatches;
use log::info;

use trace_pipeline::{Pipeline, PipelineInputs, SystemRunner};

use crate::common::load_config;

pub fn run_pipeline(matches: &ArgMatches) -> Result<()> {
    let vcf = matches
        .get_one::<String>("vcf")
        .expect("A path to a VCF file is required.");
    let track = matches
        .get_one::<String>("intersect")
        .expect("A repeat track is required.");
    let library = matches
        .get_one::<String>("lib")
        .expect("A RepeatMasker library is required.");

    let mut config = load_config(matches)?;
    if let Some(threads) = matches.get_one::<usize>("threads") {
        config.run.threads = *threads;
    }
    if matches.get_flag("no-bnd-parse") {
        config.projection.parse_bnd = false;
    }
    if matches.get_flag("keep-intermediates") {
        config.run.keep_intermediates = true;
    }
    if let Some(timeout) = matches.get_one::<u64>("timeout") {
        config.tools.repeatmasker.timeout_secs = Some(*timeout);
        config.tools.bedtools.timeout_secs = Some(*timeout);
    }
    if let Some(retries) = matches.get_one::<u32>("retries") {
        config.tools.repeatmasker.retries = *retries;
        config.tools.bedtools.retries = *retries;
    }

    let inputs = PipelineInputs {
        vcf: PathBuf::from(vcf),
        track: PathBuf::from(track),
        library: PathBuf::from(library),
        output: matches.get_one::<String>("output").map(PathBuf::from),
        overwrite: matches.get_flag("overwrite"),
    };

    let runner = SystemRunner::default();
    let summary = Pipeline::new(&config, &runner).run(&inputs)?;

    info!(
        "Annotated {} records into {}: {} insertion sequences, {} projected windows, {} homology hits, {} interval hits",
        summary.merge.records,
        summary.output.display(),
        summary.extracted,
        summary.projected,
        summary.homology_hits,
        summary.interval_hits
    );

    Ok(())
}
