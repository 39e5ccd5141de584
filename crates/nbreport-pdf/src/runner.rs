//! Child process execution with combined output logging
//!
//! Every external tool runs to completion with stdout and stderr both
//! redirected into a log file. Stdin is closed so a tool waiting for input
//! ends its run instead of blocking the pipeline. There is no timeout.

use std::fmt;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{PdfError, Result};

/// Number of log lines kept in a failed outcome
pub const LOG_TAIL_LINES: usize = 40;

/// A program and its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: String,
    args: Vec<String>,
}

impl CommandLine {
    /// Split a configured command string on whitespace
    ///
    /// `tool` names the command in the error when the string is blank.
    pub fn parse(command: &str, tool: &'static str) -> Result<Self> {
        let mut tokens = command.split_whitespace().map(String::from);
        let program = tokens.next().ok_or(PdfError::EmptyCommand(tool))?;
        Ok(Self {
            program,
            args: tokens.collect(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Result of one external step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepOutcome {
    Success,
    Failed {
        /// `None` when the process was killed by a signal
        exit_code: Option<i32>,
        /// Last lines of the step log
        log: String,
    },
}

impl StepOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, StepOutcome::Success)
    }
}

/// Runs commands inside a working directory
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    work_dir: PathBuf,
}

impl ProcessRunner {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
        }
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Run one command with a fresh log file at `log_path`
    pub fn run(&self, command: &CommandLine, log_path: &Path) -> Result<StepOutcome> {
        let log = File::create(log_path)?;
        self.run_logged(command, &log, log_path)
    }

    /// Run one command appending to an already open log
    ///
    /// Used for multi-pass steps that share one log file.
    pub fn run_logged(
        &self,
        command: &CommandLine,
        log: &File,
        log_path: &Path,
    ) -> Result<StepOutcome> {
        info!(command = %command, "running");
        let stdout = log.try_clone()?;
        let stderr = log.try_clone()?;

        let status = Command::new(command.program())
            .args(command.args())
            .current_dir(&self.work_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr))
            .status()
            .map_err(|source| PdfError::Spawn {
                command: command.to_string(),
                source,
            })?;

        debug!(command = %command, ?status, "finished");
        if status.success() {
            Ok(StepOutcome::Success)
        } else {
            Ok(StepOutcome::Failed {
                exit_code: status.code(),
                log: log_tail(log_path, LOG_TAIL_LINES)?,
            })
        }
    }
}

/// Last `lines` lines of a log file
pub fn log_tail(path: &Path, lines: usize) -> Result<String> {
    let bytes = fs::read(path)?;
    let text = String::from_utf8_lossy(&bytes);
    let all: Vec<&str> = text.lines().collect();
    let start = all.len().saturating_sub(lines);
    Ok(all[start..].join("\n"))
}
