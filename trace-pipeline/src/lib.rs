//! # End-to-end transposable element annotation runs.
//!
//! A run loads a structural variant VCF, searches inserted sequence with
//! RepeatMasker, intersects projected breakpoint windows with a repeat track
//! through `bedtools intersect`, consolidates both kinds of hits and writes the
//! annotated VCF. External tools are reached through the [`ProcessRunner`]
//! trait, so runs can be driven without the tools installed.
//!
pub mod pipeline;
pub mod process;

pub use pipeline::{Pipeline, PipelineInputs, RunSummary, WorkDir};
pub use process::{ProcessRunner, SystemRunner, ToolInvocation, ToolOutcome, run_with_retries};
