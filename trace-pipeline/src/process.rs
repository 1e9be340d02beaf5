use std::collections::BTreeMap;
use std::fs::File;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread::sleep;
use std::time::{Duration, Instant};

use log::{debug, warn};

use trace_core::config::ToolConfig;
use trace_core::errors::{Result, TraceError};

/// Number of stderr lines quoted when a tool fails.
const STDERR_TAIL_LINES: usize = 20;

///
/// One whole-batch call of an external tool.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    /// label used in logs, errors and log file names
    pub tool: String,
    pub program: String,
    pub args: Vec<String>,
    /// prepended to the command line to enter an isolated environment
    pub env_prefix: Vec<String>,
    pub env: BTreeMap<String, String>,
    /// capture stdout into this file instead of the tool log
    pub stdout: Option<PathBuf>,
    /// directory receiving `<tool>.stdout.log` and `<tool>.stderr.log`
    pub log_dir: PathBuf,
    pub timeout: Option<Duration>,
    pub retries: u32,
}

impl ToolInvocation {
    ///
    /// Build an invocation from a tool's configuration section.
    ///
    /// # Arguments
    /// - tool: label, e.g. `RepeatMasker`
    /// - default_program: executable used when the configuration names none
    /// - default_timeout_secs: timeout used when the configuration sets none
    /// - config: the `[tools.*]` section
    /// - log_dir: where the tool's logs are written
    ///
    pub fn from_config(
        tool: &str,
        default_program: &str,
        default_timeout_secs: u64,
        config: &ToolConfig,
        log_dir: &Path,
    ) -> Self {
        ToolInvocation {
            tool: tool.to_string(),
            program: config
                .program
                .clone()
                .unwrap_or_else(|| default_program.to_string()),
            args: Vec::new(),
            env_prefix: config.env_prefix.clone(),
            env: config.env.clone(),
            stdout: None,
            log_dir: log_dir.to_path_buf(),
            timeout: match config.timeout_secs.unwrap_or(default_timeout_secs) {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            },
            retries: config.retries,
        }
    }

    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn stdout_to<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.stdout = Some(path.into());
        self
    }

    ///
    /// The full command line: environment prefix, program, arguments.
    ///
    pub fn command_line(&self) -> Vec<String> {
        self.env_prefix
            .iter()
            .chain(std::iter::once(&self.program))
            .chain(self.args.iter())
            .cloned()
            .collect()
    }

    pub fn log_path(&self, stream: &str) -> PathBuf {
        self.log_dir
            .join(format!("{}.{}.log", self.tool.to_lowercase(), stream))
    }

    fn failure(&self, reason: impl Into<String>) -> TraceError {
        TraceError::ExternalTool {
            tool: self.tool.clone(),
            reason: reason.into(),
        }
    }
}

///
/// What a successful invocation reported.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutcome {
    pub status: Option<i32>,
    pub elapsed: Duration,
}

///
/// The process execution capability. A run either completes successfully or
/// returns an `ExternalTool` error for a missing executable, a non-zero exit
/// or a timeout.
///
pub trait ProcessRunner: Sync {
    fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutcome>;
}

///
/// Runs tools as child processes of this one.
///
#[derive(Debug, Clone)]
pub struct SystemRunner {
    poll_interval: Duration,
}

impl Default for SystemRunner {
    fn default() -> Self {
        SystemRunner {
            poll_interval: Duration::from_millis(200),
        }
    }
}

impl SystemRunner {
    pub fn with_poll_interval(poll_interval: Duration) -> Self {
        SystemRunner { poll_interval }
    }
}

fn stderr_tail(path: &Path) -> String {
    let text = std::fs::read_to_string(path).unwrap_or_default();
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}

impl ProcessRunner for SystemRunner {
    fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutcome> {
        let command_line = invocation.command_line();
        let (program, args) = command_line
            .split_first()
            .ok_or_else(|| invocation.failure("empty command line"))?;

        std::fs::create_dir_all(&invocation.log_dir)?;
        let stdout_path = invocation
            .stdout
            .clone()
            .unwrap_or_else(|| invocation.log_path("stdout"));
        let stderr_path = invocation.log_path("stderr");

        debug!("Running {}: {}", invocation.tool, command_line.join(" "));

        let started = Instant::now();
        let mut child = Command::new(program)
            .args(args)
            .envs(&invocation.env)
            .stdin(Stdio::null())
            .stdout(Stdio::from(File::create(&stdout_path)?))
            .stderr(Stdio::from(File::create(&stderr_path)?))
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => {
                    invocation.failure(format!("executable '{}' not found", program))
                }
                _ => invocation.failure(format!("could not start '{}': {}", program, e)),
            })?;

        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if let Some(timeout) = invocation.timeout {
                if started.elapsed() >= timeout {
                    warn!(
                        "{} exceeded its {}s timeout; killing it",
                        invocation.tool,
                        timeout.as_secs()
                    );
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(invocation.failure(format!(
                        "timed out after {}s",
                        timeout.as_secs()
                    )));
                }
            }
            sleep(self.poll_interval);
        };

        if !status.success() {
            let code = status
                .code()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "a signal".to_string());
            let tail = stderr_tail(&stderr_path);
            return Err(invocation.failure(if tail.is_empty() {
                format!("exited with {}", code)
            } else {
                format!("exited with {}:\n{}", code, tail)
            }));
        }

        Ok(ToolOutcome {
            status: status.code(),
            elapsed: started.elapsed(),
        })
    }
}

///
/// Run an invocation, repeating the whole call up to `invocation.retries`
/// extra times. The last failure is returned.
///
pub fn run_with_retries<R: ProcessRunner + ?Sized>(
    runner: &R,
    invocation: &ToolInvocation,
) -> Result<ToolOutcome> {
    let attempts = invocation.retries + 1;
    let mut attempt = 1;
    loop {
        match runner.run(invocation) {
            Ok(outcome) => return Ok(outcome),
            Err(e) if attempt < attempts => {
                warn!("{} (attempt {}/{}); retrying", e, attempt, attempts);
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
