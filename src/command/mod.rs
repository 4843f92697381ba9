//! Shell command execution with normalized results.
//!
//! Commands are run through a shell (`sh -c` by default), so callers pass a
//! single command string exactly as they would type it. Two modes are offered
//! by [`CommandRunner`]:
//!
//! - [`CommandRunner::run`]: the command must succeed; its trimmed stdout is
//!   returned and a non-zero exit becomes [`CommandError::Failed`] carrying the
//!   captured stderr.
//! - [`CommandRunner::run_allow_failure`]: any exit status is accepted and the
//!   `(status, stdout, stderr)` triple is returned as a [`CommandOutput`].
//!
//! Diagnostics about each run are emitted through `tracing`, at `info` when
//! the call is verbose and `debug` otherwise. Verbosity comes from the
//! runner's [`RunnerConfig`] and can be overridden per call.

pub mod runner;

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub use runner::CommandRunner;

/// Errors from running shell commands.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The command exited unsuccessfully.
    #[error("command '{command}' failed with status {status}: '{stderr}'")]
    Failed {
        command: String,
        status: i32,
        stderr: String,
    },

    /// The command exited unsuccessfully and its output went to the terminal.
    #[error("command '{command}' failed with status {status}; see terminal output")]
    FailedStreamed { command: String, status: i32 },

    /// The shell could not be started.
    #[error("failed to spawn '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    /// IO error talking to the child process.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl CommandError {
    /// Returns the exit status for errors caused by the command itself.
    pub fn status(&self) -> Option<i32> {
        match self {
            CommandError::Failed { status, .. } | CommandError::FailedStreamed { status, .. } => {
                Some(*status)
            }
            CommandError::Spawn { .. } | CommandError::Io(_) => None,
        }
    }
}

/// Result type for command operations.
pub type CommandResult<T> = Result<T, CommandError>;

/// How much a run reports about itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Verbosity {
    /// Command, status and output are logged at `debug`.
    #[default]
    Quiet,
    /// Command, status and output are logged at `info`.
    Verbose,
}

impl Verbosity {
    pub fn is_verbose(self) -> bool {
        self == Verbosity::Verbose
    }
}

impl From<bool> for Verbosity {
    fn from(verbose: bool) -> Self {
        if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Quiet
        }
    }
}

/// Configuration shared by every run of a [`CommandRunner`].
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Default verbosity when a call does not override it.
    pub verbosity: Verbosity,

    /// Shell used to interpret command strings; invoked as `<shell> -c <cmd>`.
    pub shell: PathBuf,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        RunnerConfig {
            verbosity: Verbosity::Quiet,
            shell: PathBuf::from("sh"),
        }
    }
}

impl RunnerConfig {
    pub fn with_verbosity(mut self, verbosity: impl Into<Verbosity>) -> Self {
        self.verbosity = verbosity.into();
        self
    }
}

/// Per-call options for a command run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Text fed to the command's stdin. Stdin is inherited when `None`.
    pub input: Option<String>,

    /// Working directory for the command. Inherited when `None`.
    pub from_dir: Option<PathBuf>,

    /// Overrides the runner's configured verbosity for this call.
    pub verbosity: Option<Verbosity>,

    /// Send stdout and stderr straight to the terminal instead of capturing
    /// them. Captured output is then empty.
    pub stream_output: bool,
}

impl RunOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(mut self, input: impl Into<String>) -> Self {
        self.input = Some(input.into());
        self
    }

    pub fn from_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.from_dir = Some(dir.into());
        self
    }

    pub fn verbosity(mut self, verbosity: impl Into<Verbosity>) -> Self {
        self.verbosity = Some(verbosity.into());
        self
    }

    pub fn stream_output(mut self, stream: bool) -> Self {
        self.stream_output = stream;
        self
    }
}

/// Outcome of a command run in tolerant mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code. On Unix, a command killed by signal `N` reports `-N`.
    pub status: i32,
    /// Whitespace-trimmed stdout.
    pub stdout: String,
    /// Whitespace-trimmed stderr.
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == 0
    }
}
