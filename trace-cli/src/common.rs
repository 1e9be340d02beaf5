use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Arg, ArgMatches};

use trace_core::TraceConfig;
use trace_core::utils::derive_output_path;

pub fn config_arg() -> Arg {
    Arg::new("config")
        .short('c')
        .long("config")
        .value_name("CONFIG")
        .help("TOML configuration file")
}

pub fn output_arg(help: &'static str) -> Arg {
    Arg::new("output")
        .short('o')
        .long("output")
        .value_name("PATH")
        .help(help)
}

///
/// Load the configuration named by `--config`, or the defaults.
///
pub fn load_config(matches: &ArgMatches) -> Result<TraceConfig> {
    let path = matches.get_one::<String>("config").map(Path::new);
    TraceConfig::load(path).with_context(|| match path {
        Some(p) => format!("Failed to load configuration from {}", p.display()),
        None => "Invalid default configuration".to_string(),
    })
}

///
/// `--output` when given, otherwise `input` with its extensions replaced by `suffix`.
///
pub fn output_path(matches: &ArgMatches, input: &Path, suffix: &str) -> PathBuf {
    matches
        .get_one::<String>("output")
        .map(PathBuf::from)
        .unwrap_or_else(|| derive_output_path(input, suffix))
}
