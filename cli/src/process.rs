//! Subprocess execution.
//!
//! External tools (`adb`, `flutter`) are launched through a [`ProcessRunner`] so that
//! the install and build workflows can be exercised without real binaries.

use std::{
    ffi::{OsStr, OsString},
    fmt,
    future::Future,
    path::{Path, PathBuf},
    process::{ExitStatus, Stdio},
    time::Duration,
};

use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

/// A fully described external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: PathBuf,
    args: Vec<OsString>,
    current_dir: Option<PathBuf>,
    stdout_to_stderr: bool,
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
            stdout_to_stderr: false,
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|arg| arg.as_ref().to_os_string()));
        self
    }

    #[must_use]
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Send the child's stdout to our stderr on interactive runs, keeping stdout
    /// free for machine-readable output.
    #[must_use]
    pub fn stdout_to_stderr(mut self, redirect: bool) -> Self {
        self.stdout_to_stderr = redirect;
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub const fn redirects_stdout(&self) -> bool {
        self.stdout_to_stderr
    }

    pub fn arguments(&self) -> &[OsString] {
        &self.args
    }

    pub fn working_dir(&self) -> Option<&Path> {
        self.current_dir.as_deref()
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args).kill_on_drop(true);
        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }
        command
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self
            .program
            .file_name()
            .unwrap_or(self.program.as_os_str())
            .to_string_lossy();
        write!(f, "{name}")?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Standard streams collected from a command that exited successfully.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    pub stdout: String,
    pub stderr: String,
}

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to launch `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` failed with {status}{}", detail_suffix(detail))]
    Failed {
        command: String,
        status: String,
        detail: String,
    },

    #[error("`{command}` timed out after {}s", timeout.as_secs())]
    TimedOut { command: String, timeout: Duration },
}

fn detail_suffix(detail: &str) -> String {
    if detail.is_empty() {
        String::new()
    } else {
        format!(": {detail}")
    }
}

impl ProcessError {
    fn failed(invocation: &Invocation, status: ExitStatus, stdout: &str, stderr: &str) -> Self {
        let detail = if stderr.trim().is_empty() {
            stdout.trim()
        } else {
            stderr.trim()
        };
        Self::Failed {
            command: invocation.to_string(),
            status: describe_status(status),
            detail: detail.to_string(),
        }
    }
}

fn describe_status(status: ExitStatus) -> String {
    status
        .code()
        .map_or_else(|| "termination by signal".to_string(), |code| format!("exit code {code}"))
}

/// Launches external programs in one of two modes.
///
/// Interactive runs inherit the parent's standard streams so the user sees tool
/// output live. Captured runs pipe both streams and hand them back to the caller.
pub trait ProcessRunner: Send + Sync {
    /// Run with inherited stdio; succeeds iff the exit status is zero.
    fn run_interactive(
        &self,
        invocation: &Invocation,
    ) -> impl Future<Output = Result<(), ProcessError>> + Send;

    /// Run with piped stdio; returns both streams iff the exit status is zero.
    fn run_captured(
        &self,
        invocation: &Invocation,
    ) -> impl Future<Output = Result<CapturedOutput, ProcessError>> + Send;
}

impl<T: ProcessRunner> ProcessRunner for &T {
    fn run_interactive(
        &self,
        invocation: &Invocation,
    ) -> impl Future<Output = Result<(), ProcessError>> + Send {
        (*self).run_interactive(invocation)
    }

    fn run_captured(
        &self,
        invocation: &Invocation,
    ) -> impl Future<Output = Result<CapturedOutput, ProcessError>> + Send {
        (*self).run_captured(invocation)
    }
}

/// Runs real processes on the tokio runtime.
///
/// Children are killed when their future is dropped, which covers both Ctrl+C and
/// an expired timeout.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner {
    timeout: Option<Duration>,
}

impl SystemRunner {
    #[must_use]
    pub const fn new() -> Self {
        Self { timeout: None }
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    async fn limit<F, T>(&self, invocation: &Invocation, fut: F) -> Result<T, ProcessError>
    where
        F: Future<Output = Result<T, ProcessError>>,
    {
        match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, fut).await.map_err(|_| {
                ProcessError::TimedOut {
                    command: invocation.to_string(),
                    timeout,
                }
            })?,
            None => fut.await,
        }
    }
}

impl ProcessRunner for SystemRunner {
    async fn run_interactive(&self, invocation: &Invocation) -> Result<(), ProcessError> {
        debug!("running `{invocation}` (interactive)");
        let run = async {
            let stdout = if invocation.stdout_to_stderr {
                Stdio::from(std::io::stderr())
            } else {
                Stdio::inherit()
            };
            let status = invocation
                .command()
                .stdin(Stdio::inherit())
                .stdout(stdout)
                .stderr(Stdio::inherit())
                .status()
                .await
                .map_err(|source| ProcessError::Spawn {
                    command: invocation.to_string(),
                    source,
                })?;

            if status.success() {
                Ok(())
            } else {
                Err(ProcessError::failed(invocation, status, "", ""))
            }
        };
        self.limit(invocation, run).await
    }

    async fn run_captured(&self, invocation: &Invocation) -> Result<CapturedOutput, ProcessError> {
        debug!("running `{invocation}` (captured)");
        let run = async {
            let output = invocation
                .command()
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .output()
                .await
                .map_err(|source| ProcessError::Spawn {
                    command: invocation.to_string(),
                    source,
                })?;

            let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

            if output.status.success() {
                Ok(CapturedOutput { stdout, stderr })
            } else {
                Err(ProcessError::failed(invocation, output.status, &stdout, &stderr))
            }
        };
        self.limit(invocation, run).await
    }
}
