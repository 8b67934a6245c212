//! Building APKs with `flutter build apk`.

use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};
use tracing::debug;

use super::{
    BuildVariant,
    apk::{build_timestamp, standard_file_name, timestamped_file_name},
};
use crate::{
    error::FltError,
    process::{Invocation, ProcessRunner},
    project::FlutterProject,
};

/// What to build.
#[derive(Debug, Clone)]
pub struct BuildRequest {
    pub variant: BuildVariant,
    pub prefix: String,
    /// Keep Flutter's console output off stdout.
    pub stdout_to_stderr: bool,
}

/// Run `flutter build apk` and rename the output so it never overwrites an earlier build.
///
/// The rename uses `now` for the timestamp, so two builds within the same minute
/// produce the same name.
///
/// # Errors
/// - [`FltError::BuildFailed`] if Flutter exits with a non-zero status.
/// - [`FltError::BuiltApkMissing`] if the expected APK is not where Flutter puts it.
/// - [`FltError::Rename`] if the APK cannot be renamed.
pub async fn build_apk<R, Tz>(
    runner: &R,
    flutter: &Path,
    project: &FlutterProject,
    request: &BuildRequest,
    now: &DateTime<Tz>,
) -> Result<PathBuf, FltError>
where
    R: ProcessRunner,
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let flag = format!("--{}", request.variant);
    let invocation = Invocation::new(flutter)
        .args(["build", "apk", flag.as_str()])
        .current_dir(project.root())
        .stdout_to_stderr(request.stdout_to_stderr);

    runner
        .run_interactive(&invocation)
        .await
        .map_err(FltError::BuildFailed)?;

    let output_dir = project.apk_output_dir();
    let built = output_dir.join(standard_file_name(&request.prefix, request.variant));
    if !built.is_file() {
        return Err(FltError::BuiltApkMissing { path: built });
    }

    let renamed = output_dir.join(timestamped_file_name(
        &request.prefix,
        request.variant,
        &build_timestamp(now),
    ));
    debug!("renaming {} to {}", built.display(), renamed.display());
    tokio::fs::rename(&built, &renamed)
        .await
        .map_err(|source| FltError::Rename {
            from: built,
            to: renamed.clone(),
            source,
        })?;

    Ok(renamed)
}
