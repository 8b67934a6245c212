//! Locating built APKs.
//!
//! Builds are renamed to `{prefix}-{variant}-{YYYYMMDDHHmm}.apk`, so the output directory
//! accumulates one file per build. [`resolve_apk`] picks the one an install should use:
//!
//! 1. the untouched Flutter output `{prefix}-{variant}.apk`, if present;
//! 2. otherwise the timestamped file with the greatest timestamp.

use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::{DateTime, TimeZone};
use serde::Serialize;
use tracing::debug;

use super::BuildVariant;

/// Number of digits in a build timestamp (`YYYYMMDDHHmm`).
pub const TIMESTAMP_LEN: usize = 12;

/// Directory Flutter writes APKs to, relative to the project root.
pub const DEFAULT_OUTPUT_DIR: &str = "build/app/outputs/flutter-apk";

/// An APK selected by the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageCandidate {
    pub path: PathBuf,
    /// Build timestamp embedded in the file name; `None` for the standard name.
    pub timestamp: Option<String>,
}

impl PackageCandidate {
    /// File name of the candidate, for display.
    #[must_use]
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// `{prefix}-{variant}.apk`, the name Flutter produces.
#[must_use]
pub fn standard_file_name(prefix: &str, variant: BuildVariant) -> String {
    format!("{prefix}-{variant}.apk")
}

/// `{prefix}-{variant}-{timestamp}.apk`, the name a finished build is renamed to.
#[must_use]
pub fn timestamped_file_name(prefix: &str, variant: BuildVariant, timestamp: &str) -> String {
    format!("{prefix}-{variant}-{timestamp}.apk")
}

/// Format a build timestamp: year, month, day, hour and minute, zero padded.
#[must_use]
pub fn build_timestamp<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    now.format("%Y%m%d%H%M").to_string()
}

/// Match `file_name` against `prefix "-" variant "-" DIGIT{12} ".apk"`.
///
/// `prefix` and `variant` are compared literally. Returns the timestamp digits.
#[must_use]
pub fn parse_timestamped_apk<'a>(
    file_name: &'a str,
    prefix: &str,
    variant: BuildVariant,
) -> Option<&'a str> {
    let timestamp = file_name
        .strip_prefix(prefix)?
        .strip_prefix('-')?
        .strip_prefix(variant.as_str())?
        .strip_prefix('-')?
        .strip_suffix(".apk")?;

    (timestamp.len() == TIMESTAMP_LEN && timestamp.bytes().all(|b| b.is_ascii_digit()))
        .then_some(timestamp)
}

/// Find the APK to install for `prefix` and `variant` inside `dir`.
///
/// A missing or unreadable directory yields `None`; callers fall back to asking
/// the user to build first or to pass an explicit path.
#[must_use]
pub fn resolve_apk(prefix: &str, variant: BuildVariant, dir: &Path) -> Option<PackageCandidate> {
    if !dir.is_dir() {
        debug!("APK output directory {} does not exist", dir.display());
        return None;
    }

    let standard = dir.join(standard_file_name(prefix, variant));
    if standard.is_file() {
        return Some(PackageCandidate {
            path: standard,
            timestamp: None,
        });
    }

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            debug!("failed to read {}: {err}", dir.display());
            return None;
        }
    };

    entries
        .filter_map(Result::ok)
        .filter_map(|entry| {
            let name = entry.file_name().into_string().ok()?;
            let timestamp = parse_timestamped_apk(&name, prefix, variant)?.to_string();
            Some(PackageCandidate {
                path: entry.path(),
                timestamp: Some(timestamp),
            })
        })
        .max_by(|a, b| a.timestamp.cmp(&b.timestamp))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use chrono::{FixedOffset, TimeZone};
    use tempfile::TempDir;

    use super::*;

    fn output_dir(files: &[&str]) -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        for file in files {
            fs::write(dir.path().join(file), b"apk").unwrap();
        }
        dir
    }

    #[test]
    fn parses_timestamped_names() {
        assert_eq!(
            parse_timestamped_apk("app-debug-202506271511.apk", "app", BuildVariant::Debug),
            Some("202506271511")
        );
        assert_eq!(
            parse_timestamped_apk("my.app-release-202501010000.apk", "my.app", BuildVariant::Release),
            Some("202501010000")
        );
    }

    #[test]
    fn rejects_non_conforming_names() {
        let debug = BuildVariant::Debug;
        for name in [
            "app-debug-20250627151.apk",
            "app-debug-2025062715110.apk",
            "app-debug-20250627151a.apk",
            "app-debug-202506271511.apk.bak",
            "app-debug-202506271511-1.apk",
            "app-release-202506271511.apk",
            "other-debug-202506271511.apk",
            "app-debug.apk",
            "xapp-debug-202506271511.apk",
            "app-debug-２０２５０６２７１５１１.apk",
        ] {
            assert_eq!(parse_timestamped_apk(name, "app", debug), None, "{name}");
        }
    }

    #[test]
    fn prefix_is_matched_literally() {
        assert_eq!(
            parse_timestamped_apk("a.b-debug-202506271511.apk", "a.b", BuildVariant::Debug),
            Some("202506271511")
        );
        assert_eq!(
            parse_timestamped_apk("axb-debug-202506271511.apk", "a.b", BuildVariant::Debug),
            None
        );
        assert_eq!(
            parse_timestamped_apk("app-debug-202506271511.apk", ".*", BuildVariant::Debug),
            None
        );
    }

    #[test]
    fn standard_name_has_priority() {
        let dir = output_dir(&["app-debug.apk", "app-debug-202501010101.apk"]);
        let found = resolve_apk("app", BuildVariant::Debug, dir.path()).unwrap();
        assert_eq!(found.path, dir.path().join("app-debug.apk"));
        assert_eq!(found.timestamp, None);
    }

    #[test]
    fn newest_timestamp_wins() {
        let dir = output_dir(&[
            "app-release-202506271200.apk",
            "app-release-202507011530.apk",
            "app-release-202412312359.apk",
        ]);
        let found = resolve_apk("app", BuildVariant::Release, dir.path()).unwrap();
        assert_eq!(found.path, dir.path().join("app-release-202507011530.apk"));
        assert_eq!(found.timestamp.as_deref(), Some("202507011530"));
    }

    #[test]
    fn ignores_other_variants_and_prefixes() {
        let dir = output_dir(&[
            "app-debug-202507011530.apk",
            "shop-release-202508011530.apk",
            "app-release-202501011530.apk",
            "app-release-209912312359.apk.tmp",
        ]);
        let found = resolve_apk("app", BuildVariant::Release, dir.path()).unwrap();
        assert_eq!(found.file_name(), "app-release-202501011530.apk");
    }

    #[test]
    fn missing_directory_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            resolve_apk("app", BuildVariant::Debug, &dir.path().join("build/app/outputs/flutter-apk")),
            None
        );
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_directory_is_not_found() {
        use std::os::unix::fs::PermissionsExt;

        let dir = output_dir(&["app-debug-202501010101.apk"]);
        fs::set_permissions(dir.path(), fs::Permissions::from_mode(0o000)).unwrap();
        // Permission bits do not stop root.
        let readable = fs::read_dir(dir.path()).is_ok();
        let found = resolve_apk("app", BuildVariant::Debug, dir.path());
        fs::set_permissions(dir.path(), fs::Permissions::from_mode(0o755)).unwrap();

        if !readable {
            assert_eq!(found, None);
        }
    }

    #[test]
    fn empty_directory_is_not_found() {
        let dir = output_dir(&[]);
        assert_eq!(resolve_apk("app", BuildVariant::Debug, dir.path()), None);
    }

    #[test]
    fn timestamp_is_zero_padded() {
        let offset = FixedOffset::east_opt(8 * 3600).unwrap();
        let now = offset.with_ymd_and_hms(2025, 6, 7, 9, 5, 59).unwrap();
        assert_eq!(build_timestamp(&now), "202506070905");
    }

    #[test]
    fn timestamped_name_round_trips_through_parser() {
        let name = timestamped_file_name("app", BuildVariant::Release, "202506070905");
        assert_eq!(name, "app-release-202506070905.apk");
        assert_eq!(
            parse_timestamped_apk(&name, "app", BuildVariant::Release),
            Some("202506070905")
        );
    }
}
