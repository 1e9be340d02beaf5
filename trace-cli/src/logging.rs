use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap::ArgMatches;
use env_logger::{Env, Target};

use crate::run::cli::RUN_CMD;

///
/// Copies every log line to stderr and to a log file.
///
pub struct TeeWriter {
    file: File,
}

impl TeeWriter {
    pub fn append(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(TeeWriter { file })
    }
}

impl Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stderr().write_all(buf)?;
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()?;
        self.file.flush()
    }
}

fn default_level(matches: &ArgMatches) -> &'static str {
    if matches.get_flag("debug") {
        "debug"
    } else if matches.get_flag("quiet") {
        "warn"
    } else {
        "info"
    }
}

///
/// Install the logger. `--debug`/`--quiet` pick the default level, `RUST_LOG`
/// overrides it, and `run --log-file` adds a copy of the log on disk.
///
pub fn init_logging(matches: &ArgMatches) -> Result<()> {
    let env = Env::default().default_filter_or(default_level(matches));
    let mut builder = env_logger::Builder::from_env(env);
    builder.format_timestamp_secs();

    let log_file = matches
        .subcommand_matches(RUN_CMD)
        .and_then(|m| m.get_one::<String>("log-file"));
    if let Some(path) = log_file {
        let tee = TeeWriter::append(Path::new(path))
            .with_context(|| format!("Failed to open log file {}", path))?;
        builder.target(Target::Pipe(Box::new(tee)));
    }

    builder.init();
    Ok(())
}
