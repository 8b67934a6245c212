use std::{path::Path, sync::OnceLock};

use serde::Serialize;

use crate::android::{BuildVariant, adb::DeviceHandle, install::InstallSummary};

/// Supported output formats for CLI commands.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
}

impl OutputFormat {
    /// Check if the format expects JSON payloads.
    #[must_use]
    pub const fn is_json(self) -> bool {
        matches!(self, Self::Json)
    }
}

static GLOBAL_OUTPUT_FORMAT: OnceLock<OutputFormat> = OnceLock::new();

/// Store the desired global output format used across CLI commands.
pub fn set_global_output_format(format: OutputFormat) {
    let _ = GLOBAL_OUTPUT_FORMAT.set(format);
}

/// Access the configured global output format, defaulting to human-friendly logs.
#[must_use]
pub fn global_output_format() -> OutputFormat {
    *GLOBAL_OUTPUT_FORMAT.get().unwrap_or(&OutputFormat::Human)
}

/// Emit a JSON payload to stdout.
///
/// # Errors
/// Returns an error if the payload cannot be serialized.
pub fn emit_json<T>(payload: &T) -> serde_json::Result<()>
where
    T: Serialize,
{
    println!("{}", serde_json::to_string(payload)?);
    Ok(())
}

/// `flt android devices --json`
#[derive(Debug, Serialize)]
pub struct DevicesReport<'a> {
    pub devices: &'a [DeviceHandle],
}

/// `flt android build --json`
#[derive(Debug, Serialize)]
pub struct BuildReport<'a> {
    pub variant: BuildVariant,
    pub apk: &'a Path,
}

/// `flt android install --json`
#[derive(Debug, Serialize)]
pub struct InstallReport<'a> {
    pub apk: &'a Path,
    pub succeeded: usize,
    pub failed: usize,
    #[serde(flatten)]
    pub summary: &'a InstallSummary,
}

impl<'a> InstallReport<'a> {
    #[must_use]
    pub fn new(apk: &'a Path, summary: &'a InstallSummary) -> Self {
        Self {
            apk,
            succeeded: summary.succeeded(),
            failed: summary.failed(),
            summary,
        }
    }
}
