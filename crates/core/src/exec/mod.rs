//! Bounded execution of external command-line tools.
//!
//! Every fetch, remux and trim step goes through [`ToolInvocation::run`], which
//! turns a subprocess into an explicit result: exit status is always checked,
//! stderr is captured for diagnostics (and optionally appended to a tool log
//! file), and a timeout kills a hung child.

mod error;

pub use error::ToolError;

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Instant;
use tokio::fs::OpenOptions;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tokio::time::{timeout, Duration};

use crate::metrics::{TOOL_DURATION, TOOL_INVOCATIONS};

/// Maximum number of stderr bytes kept for diagnostics.
const STDERR_TAIL_BYTES: usize = 4096;

/// A single external tool run.
#[derive(Debug, Clone)]
pub struct ToolInvocation {
    /// Short tool label used in logs, errors and metrics.
    pub tool: String,
    /// Program to execute.
    pub program: PathBuf,
    /// Command line arguments.
    pub args: Vec<String>,
    /// Maximum run time.
    pub timeout: Duration,
    /// File that receives the tool's stderr, appended.
    pub stderr_log: Option<PathBuf>,
}

/// Result of a successful tool run.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Wall time in milliseconds.
    pub duration_ms: u64,
    /// Tail of the captured stderr.
    pub stderr: String,
}

impl ToolInvocation {
    /// Creates an invocation with no arguments.
    pub fn new(tool: impl Into<String>, program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            tool: tool.into(),
            program: program.into(),
            args: Vec::new(),
            timeout,
            stderr_log: None,
        }
    }

    /// Appends arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Sends stderr to the given log file in addition to capturing it.
    pub fn with_stderr_log(mut self, path: Option<PathBuf>) -> Self {
        self.stderr_log = path;
        self
    }

    /// Runs the tool to completion.
    pub async fn run(&self) -> Result<ToolOutput, ToolError> {
        let start = Instant::now();
        let result = self.run_inner().await;

        let label = match &result {
            Ok(_) => "success",
            Err(ToolError::Failed { .. }) => "failed",
            Err(ToolError::Timeout { .. }) => "timeout",
            Err(_) => "error",
        };
        TOOL_INVOCATIONS
            .with_label_values(&[self.tool.as_str(), label])
            .inc();
        TOOL_DURATION
            .with_label_values(&[self.tool.as_str()])
            .observe(start.elapsed().as_secs_f64());

        result
    }

    async fn run_inner(&self) -> Result<ToolOutput, ToolError> {
        let start = Instant::now();
        tracing::debug!(tool = %self.tool, args = ?self.args, "Spawning external tool");

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ToolError::NotFound {
                        tool: self.tool.clone(),
                        path: self.program.clone(),
                    }
                } else {
                    ToolError::Io(e)
                }
            })?;

        let mut log_file = match &self.stderr_log {
            Some(path) => Some(
                OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .await?,
            ),
            None => None,
        };

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| std::io::Error::other("stderr was not captured"))?;
        let mut reader = BufReader::new(stderr).lines();

        let result = timeout(self.timeout, async {
            let mut tail = String::new();

            while let Some(line) = reader.next_line().await? {
                if let Some(ref mut file) = log_file {
                    file.write_all(line.as_bytes()).await?;
                    file.write_all(b"\n").await?;
                }
                push_tail(&mut tail, &line);
            }

            let status = child.wait().await?;
            Ok::<(std::process::ExitStatus, String), std::io::Error>((status, tail))
        })
        .await;

        match result {
            Ok(Ok((status, tail))) => {
                if !status.success() {
                    return Err(ToolError::failed(self.tool.clone(), status.code(), tail));
                }
                Ok(ToolOutput {
                    duration_ms: start.elapsed().as_millis() as u64,
                    stderr: tail,
                })
            }
            Ok(Err(e)) => Err(ToolError::Io(e)),
            Err(_) => {
                let _ = child.kill().await;
                Err(ToolError::Timeout {
                    tool: self.tool.clone(),
                    timeout_secs: self.timeout.as_secs(),
                })
            }
        }
    }
}

/// Keeps the last `STDERR_TAIL_BYTES` of output, cut on a line boundary.
fn push_tail(tail: &mut String, line: &str) {
    tail.push_str(line);
    tail.push('\n');
    if tail.len() > STDERR_TAIL_BYTES {
        let mut excess = tail.len() - STDERR_TAIL_BYTES;
        while !tail.is_char_boundary(excess) {
            excess += 1;
        }
        let cut = tail[excess..]
            .find('\n')
            .map(|i| excess + i + 1)
            .unwrap_or(excess);
        tail.drain(..cut);
    }
}
