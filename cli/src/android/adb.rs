//! Android Debug Bridge wrapper.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use serde::Serialize;
use tracing::debug;

use crate::{
    error::FltError,
    process::{CapturedOutput, Invocation, ProcessError, ProcessRunner},
};

/// Connection state reported by `adb devices`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum DeviceStatus {
    /// Authorized and online; the only state installs target.
    Device,
    Unauthorized,
    Offline,
    Other(String),
}

impl DeviceStatus {
    fn parse(raw: &str) -> Self {
        match raw {
            "device" => Self::Device,
            "unauthorized" => Self::Unauthorized,
            "offline" => Self::Offline,
            other => Self::Other(other.to_string()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Device => "device",
            Self::Unauthorized => "unauthorized",
            Self::Offline => "offline",
            Self::Other(raw) => raw,
        }
    }

    #[must_use]
    pub const fn is_online(&self) -> bool {
        matches!(self, Self::Device)
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<DeviceStatus> for String {
    fn from(status: DeviceStatus) -> Self {
        status.as_str().to_string()
    }
}

/// A device as listed by `adb devices`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceHandle {
    pub id: String,
    pub status: DeviceStatus,
}

/// Parse the output of `adb devices`.
///
/// The first line (`List of devices attached`) is a header. Every other non-blank
/// line is `<id>\t<status>`.
#[must_use]
pub fn parse_devices(output: &str) -> Vec<DeviceHandle> {
    output
        .lines()
        .skip(1)
        .filter_map(|line| {
            let line = line.trim();
            if line.is_empty() {
                return None;
            }
            // Statuses such as `no permissions (...)` contain spaces; only the tab separates.
            let (id, status) = line
                .split_once('\t')
                .or_else(|| line.split_once(char::is_whitespace))
                .unwrap_or((line, ""));
            Some(DeviceHandle {
                id: id.trim().to_string(),
                status: DeviceStatus::parse(status.trim()),
            })
        })
        .collect()
}

/// A located and verified `adb` executable.
#[derive(Debug)]
pub struct Adb<R> {
    runner: R,
    program: PathBuf,
    stdout_to_stderr: bool,
}

impl<R: ProcessRunner> Adb<R> {
    /// Verify that `adb` runs before anything else talks to it.
    ///
    /// # Errors
    /// Returns [`FltError::AdbUnavailable`] if `adb version` cannot be run.
    pub async fn connect(runner: R, program: impl Into<PathBuf>) -> Result<Self, FltError> {
        let adb = Self {
            runner,
            program: program.into(),
            stdout_to_stderr: false,
        };
        let version = adb
            .runner
            .run_captured(&adb.invocation().arg("version"))
            .await
            .map_err(|source| FltError::AdbUnavailable {
                source: Some(source),
            })?;
        debug!(
            "using {}",
            version.stdout.lines().next().unwrap_or("adb").trim()
        );
        Ok(adb)
    }

    /// Route interactive install output to stderr instead of stdout.
    #[must_use]
    pub fn stdout_to_stderr(mut self, redirect: bool) -> Self {
        self.stdout_to_stderr = redirect;
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn invocation(&self) -> Invocation {
        Invocation::new(&self.program)
    }

    fn install_invocation(&self, device: &str, apk: &Path) -> Invocation {
        self.invocation()
            .args(["-s", device, "install", "-r"])
            .arg(apk)
    }

    /// Every device `adb` reports, whatever its state.
    ///
    /// # Errors
    /// Returns [`FltError::DeviceQuery`] if `adb devices` fails.
    pub async fn devices(&self) -> Result<Vec<DeviceHandle>, FltError> {
        let output = self
            .runner
            .run_captured(&self.invocation().arg("devices"))
            .await
            .map_err(FltError::DeviceQuery)?;
        let devices = parse_devices(&output.stdout);
        debug!("adb reported {} device(s)", devices.len());
        Ok(devices)
    }

    /// Devices that are authorized and online.
    ///
    /// # Errors
    /// Returns [`FltError::DeviceQuery`] if `adb devices` fails.
    pub async fn online_devices(&self) -> Result<Vec<DeviceHandle>, FltError> {
        let mut devices = self.devices().await?;
        devices.retain(|device| device.status.is_online());
        Ok(devices)
    }

    /// `adb -s <device> install -r <apk>` with output streamed to the terminal.
    ///
    /// # Errors
    /// Returns the process error if the install fails.
    pub async fn install_interactive(&self, device: &str, apk: &Path) -> Result<(), ProcessError> {
        let invocation = self
            .install_invocation(device, apk)
            .stdout_to_stderr(self.stdout_to_stderr);
        self.runner.run_interactive(&invocation).await
    }

    /// `adb -s <device> install -r <apk>` with output captured.
    ///
    /// # Errors
    /// Returns the process error if the install fails.
    pub async fn install_captured(
        &self,
        device: &str,
        apk: &Path,
    ) -> Result<CapturedOutput, ProcessError> {
        self.runner
            .run_captured(&self.install_invocation(device, apk))
            .await
    }
}
