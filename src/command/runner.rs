//! The [`CommandRunner`] and the process plumbing behind it.

use std::io::{self, Write};
use std::process::{Command, ExitStatus, Stdio};
use std::thread;

use super::{CommandError, CommandOutput, CommandResult, RunOptions, RunnerConfig};

/// Logs at `info` when verbose and at `debug` otherwise.
macro_rules! report {
    ($verbose:expr, $($arg:tt)+) => {
        if $verbose {
            tracing::info!($($arg)+);
        } else {
            tracing::debug!($($arg)+);
        }
    };
}

/// Runs shell commands with a fixed [`RunnerConfig`].
#[derive(Debug, Clone, Default)]
pub struct CommandRunner {
    config: RunnerConfig,
}

impl CommandRunner {
    pub fn new(config: RunnerConfig) -> Self {
        CommandRunner { config }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Runs `cmd` and returns its trimmed stdout, failing on non-zero exit.
    ///
    /// The error carries the command and its captured stderr, or points at the
    /// terminal when `opts.stream_output` is set.
    pub fn run(&self, cmd: &str, opts: &RunOptions) -> CommandResult<String> {
        let output = self.run_allow_failure(cmd, opts)?;

        if output.success() {
            Ok(output.stdout)
        } else if opts.stream_output {
            Err(CommandError::FailedStreamed {
                command: cmd.to_string(),
                status: output.status,
            })
        } else {
            Err(CommandError::Failed {
                command: cmd.to_string(),
                status: output.status,
                stderr: output.stderr,
            })
        }
    }

    /// Runs `cmd` and returns its exit status and trimmed output, whatever the
    /// status. Only failures to start or talk to the process are errors.
    pub fn run_allow_failure(&self, cmd: &str, opts: &RunOptions) -> CommandResult<CommandOutput> {
        let verbose = opts
            .verbosity
            .unwrap_or(self.config.verbosity)
            .is_verbose();

        report!(verbose, command = cmd, "RUN: {}", cmd);

        let mut child = self
            .shell_command(cmd, opts)
            .spawn()
            .map_err(|source| CommandError::Spawn {
                command: cmd.to_string(),
                source,
            })?;

        // Feed stdin from another thread so a child that fills its stdout pipe
        // before draining stdin cannot stall us.
        let writer = match (opts.input.clone(), child.stdin.take()) {
            (Some(input), Some(mut stdin)) => {
                Some(thread::spawn(move || stdin.write_all(input.as_bytes())))
            }
            _ => None,
        };

        let raw = child.wait_with_output()?;

        if let Some(handle) = writer {
            match handle.join() {
                Ok(Ok(())) => {}
                // The child exited without reading all of its input.
                Ok(Err(e)) if e.kind() == io::ErrorKind::BrokenPipe => {}
                Ok(Err(e)) => return Err(e.into()),
                Err(_) => return Err(io::Error::other("stdin writer thread panicked").into()),
            }
        }

        let output = CommandOutput {
            status: status_code(raw.status),
            stdout: String::from_utf8_lossy(&raw.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&raw.stderr).trim().to_string(),
        };

        report!(verbose, status = output.status, "  stat: {}", output.status);
        report!(verbose, "  output: {}", output.stdout);
        report!(verbose, "  errput: {}", output.stderr);

        Ok(output)
    }

    /// Builds the shell invocation for `cmd` with stdio wired per `opts`.
    fn shell_command(&self, cmd: &str, opts: &RunOptions) -> Command {
        let mut command = Command::new(&self.config.shell);
        command.arg("-c").arg(cmd);

        if let Some(ref dir) = opts.from_dir {
            command.current_dir(dir);
        }

        command.stdin(if opts.input.is_some() {
            Stdio::piped()
        } else {
            Stdio::inherit()
        });

        if opts.stream_output {
            command.stdout(Stdio::inherit()).stderr(Stdio::inherit());
        } else {
            command.stdout(Stdio::piped()).stderr(Stdio::piped());
        }

        command
    }
}

/// Converts an exit status to a single integer, using `-N` for death by
/// signal `N`.
fn status_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return -signal;
        }
    }

    -1
}
