//! `flt android build` command implementation.

use std::path::{Path, PathBuf};

use chrono::Local;
use clap::Args as ClapArgs;
use color_eyre::eyre::Result;

use crate::{header, success};
use flt_cli::{
    FltError,
    android::{
        BuildVariant,
        build::{BuildRequest, build_apk},
        sdk::find_flutter,
    },
    output::{BuildReport, emit_json, global_output_format},
    process::SystemRunner,
    project::FlutterProject,
};

/// Arguments for the build command.
#[derive(ClapArgs, Debug)]
pub struct Args {
    /// Build the release variant (defaults to debug).
    #[arg(short, long)]
    release: bool,

    /// APK name prefix (defaults to "app").
    #[arg(short, long)]
    name: Option<String>,

    /// Path to the flutter executable.
    #[arg(long, env = "FLT_FLUTTER", value_name = "PATH")]
    flutter: Option<PathBuf>,
}

/// Run the build command.
pub async fn run(args: Args, project_dir: &Path) -> Result<()> {
    let project = FlutterProject::open(project_dir)?;
    let variant = BuildVariant::from_release(args.release);
    let prefix = project.name_prefix(args.name.as_deref());

    let configured = args.flutter.or_else(|| {
        project
            .config()
            .android
            .flutter
            .as_ref()
            .map(|path| project.root().join(path))
    });
    let flutter = find_flutter(configured.as_deref()).ok_or(FltError::FlutterUnavailable)?;

    header!("Building Flutter APK ({variant})");

    let request = BuildRequest {
        variant,
        prefix,
        stdout_to_stderr: global_output_format().is_json(),
    };
    let apk = build_apk(
        &SystemRunner::new(),
        &flutter,
        &project,
        &request,
        &Local::now(),
    )
    .await?;

    let shown = apk.strip_prefix(project.root()).unwrap_or(&apk);
    success!("Build complete: {}", shown.display());

    if global_output_format().is_json() {
        emit_json(&BuildReport {
            variant,
            apk: &apk,
        })?;
    }
    Ok(())
}
