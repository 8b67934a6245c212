//! `flt` CLI entry point.

mod commands;
mod shell;

use std::{
    path::PathBuf,
    process::ExitCode,
    sync::atomic::{AtomicBool, Ordering},
    time::Duration,
};

use clap::{Parser, Subcommand};
use color_eyre::{
    config::HookBuilder,
    eyre::{Report, Result},
};
use flt_cli::{
    FltError,
    output::{OutputFormat, set_global_output_format},
    version::FLT_LONG_VERSION,
};
use futures_util::future::{self, Either};
use tracing_subscriber::{EnvFilter, FmtSubscriber, filter::LevelFilter};

use commands::android;

/// Flag to track if Ctrl+C was pressed.
static CANCELLED: AtomicBool = AtomicBool::new(false);

/// Mark the CLI as cancelled (called from Ctrl+C handler).
fn set_cancelled() {
    CANCELLED.store(true, Ordering::SeqCst);
}

/// Check if the CLI was cancelled by Ctrl+C.
fn is_cancelled() -> bool {
    CANCELLED.load(Ordering::SeqCst)
}

/// Flutter toolkit: build and install Android APKs.
#[derive(Parser, Debug)]
#[command(name = "flt", version = FLT_LONG_VERSION, about, long_about = None)]
struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Output in JSON format (machine-readable).
    #[arg(long, global = true)]
    json: bool,

    /// Flutter project directory (defaults to current directory).
    #[arg(short = 'C', long = "project", global = true, default_value = ".")]
    project: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Android build and install commands.
    Android(android::Args),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    shell::init(cli.json);
    set_global_output_format(if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    });

    match run_cli(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) if is_cancelled() => {
            warn!("Interrupted");
            ExitCode::from(130)
        }
        Err(report) => {
            print_report(&report);
            ExitCode::FAILURE
        }
    }
}

fn run_cli(cli: Cli) -> Result<()> {
    let Cli {
        verbose,
        command,
        project,
        ..
    } = cli;

    HookBuilder::default()
        .display_location_section(false)
        .display_env_section(false)
        .install()?;

    init_tracing(verbose);

    ctrlc::set_handler(set_cancelled)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let ctrl_c_future = async {
            // Poll until cancelled
            loop {
                if is_cancelled() {
                    return;
                }
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
        };

        let command = async {
            match command {
                Commands::Android(args) => android::run(args, &project).await,
            }
        };

        let command = std::pin::pin!(command);
        let cancel = std::pin::pin!(ctrl_c_future);

        match future::select(command, cancel).await {
            Either::Left((result, _)) => result,
            // Dropping the command future kills any child processes still running.
            Either::Right(((), _)) => Err(Report::msg("interrupted")),
        }
    })
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// Print a failed command's error chain, followed by remediation notes for known errors.
fn print_report(report: &Report) {
    error!("{report:#}");
    if let Some(err) = report.downcast_ref::<FltError>() {
        for note in err.notes() {
            note!("{note}");
        }
    }
}
