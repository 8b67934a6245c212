//! The Flutter project a command operates on.

use std::path::{Path, PathBuf};

use crate::{
    android::{DEFAULT_NAME_PREFIX, apk::DEFAULT_OUTPUT_DIR},
    config::Config,
    error::FltError,
};

/// Marker file that identifies a Flutter project root.
pub const PUBSPEC: &str = "pubspec.yaml";

#[derive(Debug, Clone)]
pub struct FlutterProject {
    root: PathBuf,
    config: Config,
}

impl FlutterProject {
    /// Open the Flutter project rooted at `dir` and load its `flt.toml`.
    ///
    /// # Errors
    /// - [`FltError::NotFlutterProject`] if `dir` has no `pubspec.yaml`.
    /// - A configuration error if `flt.toml` is present but invalid.
    pub fn open(dir: &Path) -> Result<Self, FltError> {
        ensure_flutter_project(dir)?;
        let config = Config::load(dir)?;
        Ok(Self {
            root: dir.to_path_buf(),
            config,
        })
    }

    /// Open the project at `dir` with an already loaded configuration.
    ///
    /// # Errors
    /// Returns [`FltError::NotFlutterProject`] if `dir` has no `pubspec.yaml`.
    pub fn with_config(dir: &Path, config: Config) -> Result<Self, FltError> {
        ensure_flutter_project(dir)?;
        Ok(Self {
            root: dir.to_path_buf(),
            config,
        })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Directory the APKs are written to and searched in.
    #[must_use]
    pub fn apk_output_dir(&self) -> PathBuf {
        let relative = self
            .config
            .android
            .output_dir
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_OUTPUT_DIR));
        self.root.join(relative)
    }

    /// The APK name prefix: the explicit value, then `flt.toml`, then `app`.
    #[must_use]
    pub fn name_prefix(&self, explicit: Option<&str>) -> String {
        explicit
            .or(self.config.android.name.as_deref())
            .unwrap_or(DEFAULT_NAME_PREFIX)
            .to_string()
    }
}

/// Check that `dir` looks like a Flutter project.
///
/// # Errors
/// Returns [`FltError::NotFlutterProject`] if `dir` has no `pubspec.yaml`.
pub fn ensure_flutter_project(dir: &Path) -> Result<(), FltError> {
    if dir.join(PUBSPEC).is_file() {
        Ok(())
    } else {
        Err(FltError::NotFlutterProject {
            dir: dir.to_path_buf(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::config::AndroidConfig;

    #[test]
    fn requires_pubspec() {
        let dir = tempfile::tempdir().unwrap();
        let err = FlutterProject::open(dir.path()).unwrap_err();
        assert!(matches!(err, FltError::NotFlutterProject { .. }));
    }

    #[test]
    fn defaults_without_config() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(PUBSPEC), "name: demo\n").unwrap();

        let project = FlutterProject::open(dir.path()).unwrap();
        assert_eq!(
            project.apk_output_dir(),
            dir.path().join("build/app/outputs/flutter-apk")
        );
        assert_eq!(project.name_prefix(None), "app");
        assert_eq!(project.name_prefix(Some("shop")), "shop");
    }

    #[test]
    fn config_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(PUBSPEC), "name: demo\n").unwrap();

        let config = Config {
            android: AndroidConfig {
                name: Some("shop".to_string()),
                output_dir: Some(PathBuf::from("dist")),
                ..AndroidConfig::default()
            },
        };
        let project = FlutterProject::with_config(dir.path(), config).unwrap();
        assert_eq!(project.apk_output_dir(), dir.path().join("dist"));
        assert_eq!(project.name_prefix(None), "shop");
        assert_eq!(project.name_prefix(Some("other")), "other");
    }
}
