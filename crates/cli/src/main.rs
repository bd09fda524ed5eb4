mod commands;
mod config;
mod report;
mod source;

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::commands::report::ReportArgs;
use crate::report::ReportFormat;

/// Design token dictionary diff.
#[derive(Parser)]
#[command(
    name = "tokendiff",
    version,
    about = "Structural diff and change classification for design token dictionaries"
)]
struct Cli {
    /// Enable debug logging on stderr
    #[arg(long, global = true)]
    debug: bool,

    /// Path to a tokendiff.toml config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two token snapshots and report classified changes
    Report(ReportArgs),

    /// Print per-category change counts for two local snapshots
    Summary {
        /// Original JSON file or directory
        original: PathBuf,
        /// Updated JSON file or directory
        updated: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug);

    match cli.command {
        Commands::Report(args) => {
            commands::report::cmd_report(&args, cli.config.as_deref());
        }
        Commands::Summary { original, updated } => {
            commands::summary::cmd_summary(&original, &updated);
        }
    }
}

/// Log to stderr so stdout carries only the report.
fn init_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("warn,tokendiff=debug,tokendiff_engine=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .without_time()
        .init();
}

pub(crate) fn report_error(msg: &str, format: ReportFormat) {
    match format {
        ReportFormat::Json => {
            eprintln!("{}", report::json_error(msg));
        }
        _ => eprintln!("error: {}", msg),
    }
}
