//! `flt android devices` command implementation.

use std::path::{Path, PathBuf};

use clap::Args as ClapArgs;
use color_eyre::eyre::Result;

use super::connect_adb;
use crate::shell::{self, paint, styles};
use crate::{line, success, warn};
use flt_cli::{
    FltError,
    android::adb::DeviceHandle,
    config::Config,
    output::{DevicesReport, emit_json, global_output_format},
    process::SystemRunner,
};

/// Arguments for the devices command.
#[derive(ClapArgs, Debug)]
pub struct Args {
    /// Path to the adb executable.
    #[arg(long, env = "FLT_ADB", value_name = "PATH")]
    adb: Option<PathBuf>,
}

/// Run the devices command.
///
/// Unlike `install`, this lists devices in every state so unauthorized or offline
/// devices are visible.
pub async fn run(args: Args, project_dir: &Path) -> Result<()> {
    let config = Config::load(project_dir)?;

    let spinner = shell::spinner("Checking connected devices...");
    let result = list_devices(args.adb, &config, project_dir).await;
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
    let devices = result?;

    if global_output_format().is_json() {
        emit_json(&DevicesReport { devices: &devices })?;
        return Ok(());
    }

    if devices.is_empty() {
        warn!("No connected Android devices found");
        return Ok(());
    }

    success!("Connected devices:");
    for device in &devices {
        let style = if device.status.is_online() {
            styles::ONLINE
        } else {
            styles::OTHER
        };
        line!(
            "  • {} {}",
            device.id,
            paint(style, format_args!("[{}]", device.status))
        );
    }
    Ok(())
}

async fn list_devices(
    adb: Option<PathBuf>,
    config: &Config,
    project_dir: &Path,
) -> Result<Vec<DeviceHandle>, FltError> {
    let adb = connect_adb(adb, config, project_dir, SystemRunner::new()).await?;
    adb.devices().await
}
