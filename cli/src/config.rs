//! Optional per-project settings in `flt.toml`.
//!
//! ```toml
//! [android]
//! name = "shop"
//! output_dir = "build/app/outputs/flutter-apk"
//! adb = "/opt/android-sdk/platform-tools/adb"
//! flutter = "/opt/flutter/bin/flutter"
//! install_timeout_secs = 120
//! ```
//!
//! Command-line flags and `FLT_*` environment variables take precedence over
//! anything set here.

use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};

use crate::error::FltError;

pub const CONFIG_FILE: &str = "flt.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub android: AndroidConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AndroidConfig {
    /// Default APK name prefix.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// APK output directory, relative to the project root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adb: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flutter: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub install_timeout_secs: Option<u64>,
}

impl AndroidConfig {
    #[must_use]
    pub fn install_timeout(&self) -> Option<Duration> {
        self.install_timeout_secs.map(Duration::from_secs)
    }
}

impl Config {
    /// Load `flt.toml` from `root`. A missing file yields the defaults.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(root: &Path) -> Result<Self, FltError> {
        let path = Self::path(root);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => return Err(FltError::ConfigRead { path, source }),
        };
        toml::from_str(&contents).map_err(|source| FltError::InvalidConfig { path, source })
    }

    #[must_use]
    pub fn path(root: &Path) -> PathBuf {
        root.join(CONFIG_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Config::load(dir.path()).unwrap(), Config::default());
    }

    #[test]
    fn parses_android_section() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            Config::path(dir.path()),
            "[android]\nname = \"shop\"\ninstall_timeout_secs = 90\nadb = \"/sdk/adb\"\n",
        )
        .unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.android.name.as_deref(), Some("shop"));
        assert_eq!(config.android.adb.as_deref(), Some(Path::new("/sdk/adb")));
        assert_eq!(
            config.android.install_timeout(),
            Some(Duration::from_secs(90))
        );
        assert_eq!(config.android.output_dir, None);
    }

    #[test]
    fn rejects_unknown_keys() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(Config::path(dir.path()), "[android]\nnmae = \"typo\"\n").unwrap();
        let err = Config::load(dir.path()).unwrap_err();
        assert!(matches!(err, FltError::InvalidConfig { .. }));
    }
}
