//! Android build and deployment.
//!
//! - [`apk`] locates built packages on disk.
//! - [`adb`] wraps the Android Debug Bridge.
//! - [`install`] fans an APK out to connected devices.
//! - [`build`] drives `flutter build apk` and timestamps the result.

use std::{fmt, str::FromStr};

use serde::Serialize;

use crate::error::FltError;

pub mod adb;
pub mod apk;
pub mod build;
pub mod install;
pub mod sdk;

/// Package base name used when the user does not pass `--name`.
pub const DEFAULT_NAME_PREFIX: &str = "app";

/// Build configuration of an APK.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildVariant {
    #[default]
    Debug,
    Release,
}

impl BuildVariant {
    #[must_use]
    pub const fn from_release(release: bool) -> Self {
        if release { Self::Release } else { Self::Debug }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Release => "release",
        }
    }
}

impl fmt::Display for BuildVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildVariant {
    type Err = FltError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "debug" => Ok(Self::Debug),
            "release" => Ok(Self::Release),
            other => Err(FltError::UnsupportedBuildType {
                value: other.to_string(),
            }),
        }
    }
}
