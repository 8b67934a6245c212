//! `flt android install` command implementation.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use clap::Args as ClapArgs;
use color_eyre::eyre::{Result, bail};

use super::connect_adb;
use crate::shell::{self, device_label};
use crate::{header, line, note, success, warn};
use flt_cli::{
    FltError,
    android::{
        BuildVariant,
        apk::resolve_apk,
        install::{
            DeviceLabel, InstallObserver, InstallOutcome, InstallTargets, InstallVerdict,
            install_parallel, install_sequential, install_single, select_targets,
        },
    },
    output::{InstallReport, emit_json, global_output_format},
    process::SystemRunner,
    project::FlutterProject,
};

/// Arguments for the install command.
#[derive(ClapArgs, Debug)]
pub struct Args {
    /// Build type to install (debug or release).
    #[arg(default_value = "debug")]
    build_type: String,

    /// Install only on this device id.
    #[arg(short, long)]
    device: Option<String>,

    /// APK file to install instead of searching the build output.
    #[arg(short, long, value_name = "PATH")]
    file: Option<PathBuf>,

    /// APK name prefix (defaults to "app").
    #[arg(short, long)]
    name: Option<String>,

    /// Install on one device at a time, stopping at the first failure.
    #[arg(long, conflicts_with = "device")]
    sequential: bool,

    /// Give up on an adb command after this many seconds.
    #[arg(long, env = "FLT_INSTALL_TIMEOUT", value_name = "SECS")]
    timeout: Option<u64>,

    /// Path to the adb executable.
    #[arg(long, env = "FLT_ADB", value_name = "PATH")]
    adb: Option<PathBuf>,
}

/// Prints parallel install progress as labeled blocks.
#[derive(Debug)]
struct ShellObserver;

impl InstallObserver for ShellObserver {
    fn started(&self, label: DeviceLabel<'_>) {
        line!("{} installing...", device_label(label));
    }

    fn finished(&self, label: DeviceLabel<'_>, outcome: &InstallOutcome) {
        let mut block = device_label(label);
        match &outcome.error {
            None => {
                for output in &outcome.output {
                    block.push_str("\n    ");
                    block.push_str(output);
                }
            }
            Some(error) => {
                block.push(' ');
                block.push_str(&shell::paint(shell::styles::ERROR, "install failed"));
                block.push_str("\n    ");
                block.push_str(error);
            }
        }
        line!("{block}");
    }
}

/// Run the install command.
pub async fn run(args: Args, project_dir: &Path) -> Result<()> {
    let project = FlutterProject::open(project_dir)?;
    let variant: BuildVariant = args.build_type.parse()?;

    let timeout = args
        .timeout
        .map(Duration::from_secs)
        .or_else(|| project.config().android.install_timeout());
    let runner = SystemRunner::new().with_timeout(timeout);
    let adb = connect_adb(args.adb, project.config(), project.root(), runner).await?;

    let apk = locate_apk(&project, variant, args.file, args.name.as_deref())?;

    let spinner = shell::spinner("Checking connected Android devices...");
    let online = adb.online_devices().await;
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
    let targets = select_targets(&online?, args.device.as_deref())?;

    match targets {
        InstallTargets::Single(device) => {
            header!("Installing {} on {device}", apk.display());
            install_single(&adb, &device, &apk).await?;
            success!("Installed on {device}");
        }
        InstallTargets::All(devices) if args.sequential => {
            header!(
                "Installing {} on {} device(s) one at a time",
                apk.display(),
                devices.len()
            );
            install_sequential(&adb, &devices, &apk, |label| {
                line!("{}", device_label(label));
            })
            .await?;
            success!("Installed on all devices");
        }
        InstallTargets::All(devices) => {
            header!(
                "Installing {} on {} device(s) in parallel",
                apk.display(),
                devices.len()
            );
            let summary = install_parallel(&adb, &devices, &apk, &ShellObserver).await;

            if global_output_format().is_json() {
                emit_json(&InstallReport::new(&apk, &summary))?;
            }

            let message = summary.message();
            match summary.verdict() {
                InstallVerdict::AllSucceeded => success!("{message}"),
                InstallVerdict::Partial => warn!("{message}"),
                InstallVerdict::AllFailed => bail!(message),
            }
        }
    }

    Ok(())
}

/// The APK to install: the explicit `--file`, or the resolver's pick.
fn locate_apk(
    project: &FlutterProject,
    variant: BuildVariant,
    file: Option<PathBuf>,
    name: Option<&str>,
) -> Result<PathBuf, FltError> {
    if let Some(file) = file {
        let path = std::path::absolute(&file).unwrap_or(file);
        if !path.is_file() {
            return Err(FltError::ApkFileMissing { path });
        }
        return Ok(path);
    }

    let prefix = project.name_prefix(name);
    let candidate = resolve_apk(&prefix, variant, &project.apk_output_dir())
        .ok_or(FltError::ApkNotFound { variant, prefix })?;
    note!("Found APK: {}", candidate.file_name());
    Ok(candidate.path)
}
