//! CLI command implementations.

use std::path::{Path, PathBuf};

use flt_cli::{
    FltError,
    android::{adb::Adb, sdk::find_adb},
    config::Config,
    output::global_output_format,
    process::SystemRunner,
};

pub mod android;
pub mod build;
pub mod devices;
pub mod install;

/// Locate `adb` and make sure it runs.
///
/// `explicit` comes from `--adb` / `FLT_ADB`; otherwise `flt.toml` is consulted, then
/// `PATH` and the Android SDK. In JSON mode interactive installs print to stderr.
async fn connect_adb(
    explicit: Option<PathBuf>,
    config: &Config,
    root: &Path,
    runner: SystemRunner,
) -> Result<Adb<SystemRunner>, FltError> {
    let configured = explicit.or_else(|| config.android.adb.as_ref().map(|path| root.join(path)));
    let program =
        find_adb(configured.as_deref()).ok_or(FltError::AdbUnavailable { source: None })?;
    let adb = Adb::connect(runner, program).await?;
    Ok(adb.stdout_to_stderr(global_output_format().is_json()))
}
