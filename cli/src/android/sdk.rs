//! Locating the external tools `flt` drives.

use std::{
    env,
    path::{Path, PathBuf},
};

use tracing::debug;
use which::which;

const ADB_SDK_SUFFIXES: &[&str] = &["platform-tools/adb", "platform-tools/adb.exe"];

/// Locate `adb`, preferring an explicit override, then `PATH`, then the Android SDK.
#[must_use]
pub fn find_adb(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return resolve_explicit(path);
    }

    if let Ok(path) = which("adb") {
        return Some(path);
    }

    for root in android_sdk_roots() {
        for suffix in ADB_SDK_SUFFIXES {
            let candidate = root.join(suffix);
            if candidate.exists() {
                debug!("using adb from Android SDK at {}", root.display());
                return Some(candidate);
            }
        }
    }

    None
}

/// Locate `flutter`, preferring an explicit override over `PATH`.
#[must_use]
pub fn find_flutter(explicit: Option<&Path>) -> Option<PathBuf> {
    match explicit {
        Some(path) => resolve_explicit(path),
        None => which("flutter").ok(),
    }
}

/// An explicit tool path, or a bare program name looked up on `PATH`.
fn resolve_explicit(path: &Path) -> Option<PathBuf> {
    if path.exists() {
        return Some(path.to_path_buf());
    }
    let bare = path.parent().is_none_or(|parent| parent.as_os_str().is_empty());
    if bare {
        return which(path).ok();
    }
    None
}

/// Android SDK directories that exist on this machine, most specific first.
#[must_use]
pub fn android_sdk_roots() -> Vec<PathBuf> {
    let mut roots = Vec::new();
    let mut push_root = |path: PathBuf| {
        if path.exists() && !roots.contains(&path) {
            roots.push(path);
        }
    };

    if let Ok(path) = env::var("ANDROID_HOME") {
        push_root(PathBuf::from(path));
    }
    if let Ok(path) = env::var("ANDROID_SDK_ROOT") {
        push_root(PathBuf::from(path));
    }
    if let Ok(home) = env::var("HOME") {
        let home = PathBuf::from(home);
        push_root(home.join("Library/Android/sdk"));
        push_root(home.join("Android/Sdk"));
    }
    if cfg!(target_os = "windows") {
        if let Ok(local) = env::var("LOCALAPPDATA") {
            push_root(PathBuf::from(local).join("Android/Sdk"));
        }
    }
    roots
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_path_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let adb = dir.path().join("adb");
        assert_eq!(find_adb(Some(adb.as_path())), None);

        std::fs::write(&adb, "").unwrap();
        assert_eq!(find_adb(Some(adb.as_path())), Some(adb));
    }

    #[test]
    fn missing_explicit_path_is_not_searched_on_path() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(find_adb(Some(dir.path().join("sh").as_path())), None);
    }

    #[cfg(unix)]
    #[test]
    fn bare_program_name_is_looked_up_on_path() {
        let found = find_flutter(Some(Path::new("sh"))).unwrap();
        assert!(found.is_absolute());
        assert!(found.ends_with("sh"));
        assert_eq!(find_adb(Some(Path::new("flt-definitely-not-installed"))), None);
    }

    #[test]
    fn explicit_flutter_path_wins_over_path_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let flutter = dir.path().join("flutter");
        std::fs::write(&flutter, "").unwrap();
        assert_eq!(find_flutter(Some(flutter.as_path())), Some(flutter));
    }
}
