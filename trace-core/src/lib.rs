//! # Core data model for transposable element annotation of structural variants.
//!
//! This crate holds the types shared by every stage of the pipeline: variant records
//! parsed from a VCF, the query intervals projected from them, the raw hits reported by
//! the external repeat tools, and the consolidated per-variant annotations that are
//! finally merged back into the VCF. It also carries the run-wide [`TraceConfig`] and
//! the [`TraceError`] taxonomy.
//!
pub mod config;
pub mod consts;
pub mod errors;
pub mod models;
pub mod utils;

pub use config::TraceConfig;
pub use errors::{Result, TraceError};
