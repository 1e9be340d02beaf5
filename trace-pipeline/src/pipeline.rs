use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail, ensure};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};

use trace_annotate::{AnnotationMerger, MergeSummary, write_output};
use trace_core::TraceConfig;
use trace_core::consts::*;
use trace_core::errors::TraceError;
use trace_core::models::{EvidenceSource, RawHit, VariantSet};
use trace_core::utils::{derive_output_path, file_stem};
use trace_project::{BedWrite, BreakpointProjector, InsertionExtractor};
use trace_squash::{HitConsolidator, read_intersect_from_path, read_out_from_path, write_hits};

use crate::process::{ProcessRunner, ToolInvocation, run_with_retries};

///
/// Files a full run reads and writes.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineInputs {
    pub vcf: PathBuf,
    /// repeat track BED intersected with the projected windows
    pub track: PathBuf,
    /// RepeatMasker repeat library
    pub library: PathBuf,
    /// defaults to `<vcf stem>_annotated.vcf` next to the input
    pub output: Option<PathBuf>,
    pub overwrite: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub output: PathBuf,
    pub extracted: usize,
    pub projected: usize,
    pub homology_hits: usize,
    pub interval_hits: usize,
    pub merge: MergeSummary,
}

///
/// Directory holding the intermediates of one run. It is removed when dropped,
/// whether the run succeeded or not, unless intermediates are kept.
///
#[derive(Debug)]
pub struct WorkDir {
    path: PathBuf,
    keep: bool,
}

impl WorkDir {
    pub fn create(path: PathBuf, keep: bool) -> std::io::Result<Self> {
        std::fs::create_dir_all(&path)?;
        Ok(WorkDir { path, keep })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn join<P: AsRef<Path>>(&self, name: P) -> PathBuf {
        self.path.join(name)
    }
}

impl Drop for WorkDir {
    fn drop(&mut self) {
        if self.keep {
            info!("Intermediate files kept in {}", self.path.display());
            return;
        }
        if let Err(e) = std::fs::remove_dir_all(&self.path) {
            warn!("Could not remove {}: {}", self.path.display(), e);
        }
    }
}

///
/// The end-to-end annotation run: extraction and RepeatMasker for insertions,
/// projection and bedtools for everything with breakpoints, consolidation of
/// both evidence streams and the final merge.
///
pub struct Pipeline<'a, R: ProcessRunner + ?Sized> {
    config: &'a TraceConfig,
    runner: &'a R,
    show_progress: bool,
}

impl<'a, R: ProcessRunner + ?Sized> Pipeline<'a, R> {
    pub fn new(config: &'a TraceConfig, runner: &'a R) -> Self {
        Pipeline {
            config,
            runner,
            show_progress: true,
        }
    }

    pub fn show_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    fn spinner(&self) -> Result<ProgressBar> {
        if !self.show_progress {
            return Ok(ProgressBar::hidden());
        }
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .context("Invalid progress template")?,
        );
        pb.enable_steady_tick(Duration::from_millis(120));
        Ok(pb)
    }

    ///
    /// Run every stage and write the annotated VCF.
    ///
    /// Nothing is written to the output path unless the whole run succeeds.
    ///
    pub fn run(&self, inputs: &PipelineInputs) -> Result<RunSummary> {
        self.config.validate()?;

        for (path, what) in [
            (&inputs.vcf, "Input VCF"),
            (&inputs.track, "Repeat track"),
            (&inputs.library, "RepeatMasker library"),
        ] {
            ensure!(path.is_file(), "{} not found: {}", what, path.display());
        }

        let output = inputs
            .output
            .clone()
            .unwrap_or_else(|| derive_output_path(&inputs.vcf, ANNOTATED_SUFFIX));
        if output.exists() && !inputs.overwrite {
            bail!(TraceError::OutputExists(output.display().to_string()));
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.run.threads)
            .build()
            .context("Failed to build the worker thread pool")?;

        pool.install(|| self.run_stages(inputs, output))
    }

    fn run_stages(&self, inputs: &PipelineInputs, output: PathBuf) -> Result<RunSummary> {
        let config = self.config;
        let stem = file_stem(&inputs.vcf);
        let base = match &config.run.work_dir {
            Some(dir) => dir.clone(),
            None => output
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        };
        let work = WorkDir::create(
            base.join(format!("{}_trace_work", stem)),
            config.run.keep_intermediates,
        )
        .context("Failed to create the work directory")?;

        let pb = self.spinner()?;

        pb.set_message("Loading variants");
        let variants = VariantSet::try_from(inputs.vcf.as_path())
            .with_context(|| format!("Failed to load {}", inputs.vcf.display()))?;
        info!(
            "Loaded {} records ({} data lines) from {}",
            variants.len(),
            variants.data_line_count(),
            inputs.vcf.display()
        );

        let merger = AnnotationMerger::new(&config.annotation)?;

        // insertions: extract -> RepeatMasker
        pb.set_message("Extracting inserted sequences");
        let extraction = InsertionExtractor::new(&config.extraction).extract(variants.records());
        info!(
            "Extracted {} insertion sequences ({} symbolic skipped, {} outside length bounds)",
            extraction.extracted(),
            extraction.symbolic_skipped,
            extraction.filtered
        );
        if extraction.multi_allelic > 0 {
            warn!(
                "{} multi-allelic insertions were reduced to their first ALT allele",
                extraction.multi_allelic
            );
        }

        let homology_hits: Vec<RawHit> = if extraction.extracted() > 0 {
            let fasta = work.join(format!("{}{}", stem, INS_FASTA_SUFFIX));
            extraction.write_fasta_to_path(&fasta, config.extraction.line_width)?;

            let rm_dir = work.join("repeatmasker");
            std::fs::create_dir_all(&rm_dir)?;

            pb.set_message("Running RepeatMasker");
            let invocation = ToolInvocation::from_config(
                "RepeatMasker",
                "RepeatMasker",
                DEFAULT_REPEATMASKER_TIMEOUT_SECS,
                &config.tools.repeatmasker,
                work.path(),
            )
            .args(["-no_is", "-lib"])
            .arg(inputs.library.display().to_string())
            .arg("-pa")
            .arg(config.run.threads.to_string())
            .arg("-dir")
            .arg(rm_dir.display().to_string())
            .arg(fasta.display().to_string());
            run_with_retries(self.runner, &invocation)?;

            let rm_out = rm_dir.join(format!("{}{}.out", stem, INS_FASTA_SUFFIX));
            if rm_out.is_file() {
                let hits = read_out_from_path(&rm_out)?;
                write_hits(&hits, work.join(format!("{}_INS_hits.bed", stem)))?;
                hits
            } else {
                warn!(
                    "RepeatMasker produced no {}; insertions get no homology hits",
                    rm_out.display()
                );
                Vec::new()
            }
        } else {
            info!("No insertion sequences to search; skipping RepeatMasker");
            Vec::new()
        };

        // breakpoints: project -> bedtools intersect
        pb.set_message("Projecting breakpoints");
        let projector = BreakpointProjector::new(&config.projection)?;
        let projection = projector.project(variants.records());

        let interval_hits: Vec<RawHit> = if !projection.is_empty() {
            let projected = work.join(format!("{}{}", stem, PROJECTED_SUFFIX));
            projection.write_bed(&projected)?;

            let intersected = work.join(format!("{}{}", stem, INTERSECTED_SUFFIX));
            pb.set_message("Running bedtools intersect");
            let invocation = ToolInvocation::from_config(
                "bedtools",
                "bedtools",
                DEFAULT_BEDTOOLS_TIMEOUT_SECS,
                &config.tools.bedtools,
                work.path(),
            )
            .args(["intersect", "-wa", "-wb", "-a"])
            .arg(projected.display().to_string())
            .arg("-b")
            .arg(inputs.track.display().to_string())
            .stdout_to(&intersected);
            run_with_retries(self.runner, &invocation)?;

            read_intersect_from_path(&intersected)
                .with_context(|| format!("Failed to read {}", intersected.display()))?
        } else {
            info!("No intervals were projected; skipping bedtools intersect");
            Vec::new()
        };

        // consolidate both streams independently
        pb.set_message("Consolidating hits");
        let homology_count = homology_hits.len();
        let interval_count = interval_hits.len();
        let routing = merger.routing();
        let (homology, interval) = rayon::join(
            || {
                HitConsolidator::new(EvidenceSource::SequenceHomology).consolidate(
                    homology_hits,
                    routing.identities(&variants, EvidenceSource::SequenceHomology),
                )
            },
            || {
                HitConsolidator::new(EvidenceSource::IntervalOverlap).consolidate(
                    interval_hits,
                    routing.identities(&variants, EvidenceSource::IntervalOverlap),
                )
            },
        );
        homology.write_to_path(
            work.join(format!("{}_INS{}", stem, SQUASHED_SUFFIX)),
            merger.tag(),
        )?;
        interval.write_to_path(
            work.join(format!("{}_intersect{}", stem, SQUASHED_SUFFIX)),
            merger.tag(),
        )?;

        pb.set_message("Writing annotated VCF");
        let merge = write_output(Some(&output), inputs.overwrite, |w| {
            merger.merge(&variants, &homology, &interval, w)
        })
        .with_context(|| format!("Failed to write {}", output.display()))?;

        pb.finish_with_message(format!(
            "Annotated {} records into {}",
            merge.records,
            output.display()
        ));

        Ok(RunSummary {
            output,
            extracted: extraction.extracted(),
            projected: projection.intervals.len(),
            homology_hits: homology_count,
            interval_hits: interval_count,
            merge,
        })
    }
}
