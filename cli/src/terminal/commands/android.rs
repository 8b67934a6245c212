//! `flt android` command group.

use std::path::Path;

use clap::{Args as ClapArgs, Subcommand};
use color_eyre::eyre::Result;

use super::{build, devices, install};

/// Arguments for the android command group.
#[derive(ClapArgs, Debug)]
pub struct Args {
    #[command(subcommand)]
    command: AndroidCommand,
}

#[derive(Subcommand, Debug)]
enum AndroidCommand {
    /// Build a Flutter APK with a timestamped file name.
    #[command(visible_alias = "b")]
    Build(build::Args),

    /// Install an APK on connected Android devices.
    #[command(visible_alias = "i")]
    Install(install::Args),

    /// List connected Android devices.
    #[command(visible_alias = "d")]
    Devices(devices::Args),
}

/// Run an android subcommand against the project in `project_dir`.
pub async fn run(args: Args, project_dir: &Path) -> Result<()> {
    match args.command {
        AndroidCommand::Build(args) => build::run(args, project_dir).await,
        AndroidCommand::Install(args) => install::run(args, project_dir).await,
        AndroidCommand::Devices(args) => devices::run(args, project_dir).await,
    }
}
