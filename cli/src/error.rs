//! Error types surfaced by `flt` operations.

use std::path::PathBuf;

use thiserror::Error;

use crate::{android::BuildVariant, process::ProcessError};

/// Fatal conditions reported by the build and install workflows.
///
/// Every variant maps to a single user-facing message. [`FltError::notes`] adds
/// the remediation hints the terminal prints below the error line.
#[derive(Debug, Error)]
pub enum FltError {
    #[error("{} is not a Flutter project directory", dir.display())]
    NotFlutterProject { dir: PathBuf },

    #[error("`adb` not found or not working")]
    AdbUnavailable {
        #[source]
        source: Option<ProcessError>,
    },

    #[error("`flutter` not found on PATH")]
    FlutterUnavailable,

    #[error("unsupported build type: {value}")]
    UnsupportedBuildType { value: String },

    #[error("APK file does not exist: {}", path.display())]
    ApkFileMissing { path: PathBuf },

    #[error("no {variant} APK found (name prefix: {prefix})")]
    ApkNotFound {
        variant: BuildVariant,
        prefix: String,
    },

    #[error("no connected Android devices found")]
    NoDevicesConnected,

    #[error("device {device} is not connected")]
    DeviceNotConnected {
        device: String,
        available: Vec<String>,
    },

    #[error("failed to list Android devices")]
    DeviceQuery(#[source] ProcessError),

    #[error("Flutter build failed")]
    BuildFailed(#[source] ProcessError),

    #[error("built APK not found: {}", path.display())]
    BuiltApkMissing { path: PathBuf },

    #[error("failed to rename {} to {}", from.display(), to.display())]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to install APK on {device}")]
    InstallFailed {
        device: String,
        #[source]
        source: ProcessError,
    },

    #[error("failed to read {}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration in {}", path.display())]
    InvalidConfig {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl FltError {
    /// Remediation hints shown after the error message.
    #[must_use]
    pub fn notes(&self) -> Vec<String> {
        match self {
            Self::NotFlutterProject { .. } => {
                vec!["Run this command from the root of a Flutter project (where pubspec.yaml lives).".to_string()]
            }
            Self::AdbUnavailable { .. } => vec![
                "Install the Android SDK platform-tools and make sure `adb` is on PATH.".to_string(),
                "Alternatively point FLT_ADB at the adb executable.".to_string(),
            ],
            Self::FlutterUnavailable => vec![
                "Install the Flutter SDK and make sure `flutter` is on PATH.".to_string(),
                "Alternatively point FLT_FLUTTER at the flutter executable.".to_string(),
            ],
            Self::UnsupportedBuildType { .. } => {
                vec!["Supported build types: debug, release".to_string()]
            }
            Self::ApkNotFound { variant, prefix } => vec![
                "Build the APK first or pass an explicit path with --file.".to_string(),
                format!("Build command: {}", build_command_hint(*variant, prefix)),
            ],
            Self::NoDevicesConnected => vec![
                "Make sure the device is connected with USB debugging enabled.".to_string(),
                "Make sure the device has authorized this computer.".to_string(),
            ],
            Self::DeviceNotConnected { available, .. } => {
                let mut notes = vec!["Available devices:".to_string()];
                notes.extend(available.iter().map(|id| format!("  • {id}")));
                notes
            }
            _ => Vec::new(),
        }
    }
}

/// The `flt` invocation that produces the APK the resolver looks for.
#[must_use]
pub fn build_command_hint(variant: BuildVariant, prefix: &str) -> String {
    let mut command = String::from("flt android build");
    if variant == BuildVariant::Release {
        command.push_str(" --release");
    }
    if prefix != crate::android::DEFAULT_NAME_PREFIX {
        command.push_str(" --name ");
        command.push_str(prefix);
    }
    command
}
