use std::collections::BTreeMap;
use std::fs::read_to_string;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::errors::{Result, TraceError};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ProjectionConfig {
    /// margin added on both sides of a deleted span
    pub del_flank: u64,
    /// half-width of the window around each DUP/INV junction
    pub breakpoint_flank: u64,
    /// margin added on both sides of a BND breakpoint base
    pub bnd_flank: u64,
    /// projected starts are clamped to this coordinate
    pub min_coord: u64,
    /// read the mate position from BND ALTs; when off only the local breakpoint is projected
    pub parse_bnd: bool,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        ProjectionConfig {
            del_flank: DEFAULT_DEL_FLANK,
            breakpoint_flank: DEFAULT_BREAKPOINT_FLANK,
            bnd_flank: DEFAULT_BND_FLANK,
            min_coord: 0,
            parse_bnd: true,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ExtractionConfig {
    pub min_length: usize,
    pub max_length: Option<usize>,
    pub line_width: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        ExtractionConfig {
            min_length: 1,
            max_length: None,
            line_width: DEFAULT_FASTA_LINE_WIDTH,
        }
    }
}

/// What the merger does with a variant whose SV type has no evidence source.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UnroutedPolicy {
    /// write the zero-hit sentinel
    Sentinel,
    /// leave the record untouched
    Omit,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EvidenceRoute {
    Homology,
    Interval,
    None,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AnnotationConfig {
    pub tag: String,
    pub unrouted: UnroutedPolicy,
    /// SV type -> evidence source overrides, applied on top of the built-in routing
    pub routing: BTreeMap<String, EvidenceRoute>,
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        AnnotationConfig {
            tag: DEFAULT_INFO_TAG.to_string(),
            unrouted: UnroutedPolicy::Sentinel,
            routing: BTreeMap::new(),
        }
    }
}

///
/// How to invoke one external tool. `env_prefix` is prepended to the command line
/// to enter an isolated environment (e.g. `["conda", "run", "-n", "repeatmasker"]`).
///
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct ToolConfig {
    pub program: Option<String>,
    pub env_prefix: Vec<String>,
    pub env: BTreeMap<String, String>,
    pub timeout_secs: Option<u64>,
    pub retries: u32,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct ToolsConfig {
    pub repeatmasker: ToolConfig,
    pub bedtools: ToolConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct RunConfig {
    pub keep_intermediates: bool,
    pub threads: usize,
    pub work_dir: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            keep_intermediates: false,
            threads: 1,
            work_dir: None,
        }
    }
}

///
/// The single run-wide configuration value. Every stage receives it explicitly.
///
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct TraceConfig {
    pub projection: ProjectionConfig,
    pub extraction: ExtractionConfig,
    pub annotation: AnnotationConfig,
    pub tools: ToolsConfig,
    pub run: RunConfig,
}

impl TraceConfig {
    ///
    /// Load a TOML config file, or the defaults when no path is given.
    ///
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => TraceConfig::try_from(path)?,
            None => TraceConfig::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.run.threads == 0 {
            return Err(TraceError::Config("run.threads must be at least 1".to_string()));
        }
        if self.extraction.line_width == 0 {
            return Err(TraceError::Config(
                "extraction.line_width must be at least 1".to_string(),
            ));
        }
        if self.extraction.min_length == 0 {
            return Err(TraceError::Config(
                "extraction.min_length must be at least 1".to_string(),
            ));
        }
        if let Some(max) = self.extraction.max_length {
            if max < self.extraction.min_length {
                return Err(TraceError::Config(format!(
                    "extraction.max_length ({}) is smaller than min_length ({})",
                    max, self.extraction.min_length
                )));
            }
        }
        let tag = &self.annotation.tag;
        if tag.is_empty()
            || tag
                .chars()
                .any(|c| matches!(c, ';' | '=' | ',' | '<' | '>') || c.is_whitespace())
        {
            return Err(TraceError::Config(format!("invalid INFO tag '{}'", tag)));
        }
        Ok(())
    }
}

impl TryFrom<&Path> for TraceConfig {
    type Error = TraceError;

    fn try_from(path: &Path) -> Result<Self> {
        let toml_str = read_to_string(path)?;
        let config = toml::from_str(&toml_str)?;
        Ok(config)
    }
}
