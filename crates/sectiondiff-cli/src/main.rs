//! sectiondiff CLI
//!
//! Command-line interface for diffing and replaying sectioned snapshots

use clap::{Parser, Subcommand, ValueEnum};
use sectiondiff_core::logging_facility::{init, Profile};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "sectiondiff")]
#[command(about = "sectiondiff - Sectioned collection reconciler", long_about = None)]
struct Cli {
    /// Logging profile (logs go to stderr; off when omitted)
    #[arg(long, global = true, value_enum)]
    log: Option<LogProfile>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogProfile {
    Dev,
    Prod,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Compute the changeset between two snapshot files
    Diff(commands::diff::DiffArgs),
    /// Feed snapshot files in order through the update coordinator
    Replay(commands::replay::ReplayArgs),
}

fn main() {
    let cli = Cli::parse();

    match cli.log {
        Some(LogProfile::Dev) => init(Profile::Development),
        Some(LogProfile::Prod) => init(Profile::Production),
        None => {}
    }

    let result = match cli.command {
        Commands::Diff(args) => commands::diff::execute(args),
        Commands::Replay(args) => commands::replay::execute(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
