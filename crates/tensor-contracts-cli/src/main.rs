use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

/// Top-level CLI argument parser for the `tc` command
#[derive(Parser)]
#[command(
    name = "tc",
    about = "tensor-contracts: check tensor signatures and replay recorded calls",
    version
)]
struct Cli {
    /// Log level (trace, debug, info, warn, error); `RUST_LOG` takes precedence
    #[arg(long, value_name = "LEVEL", global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands for the `tc` CLI
#[derive(Subcommand)]
enum Commands {
    /// Validate every type literal of a signature file
    Validate {
        /// Path to the signature YAML file
        signatures: PathBuf,
    },
    /// Print each function with its canonical argument and return types
    Show {
        /// Path to the signature YAML file
        signatures: PathBuf,
    },
    /// Replay recorded calls against a signature file
    Check {
        /// Path to the signature YAML file
        signatures: PathBuf,
        /// Path to the recorded calls YAML file
        calls: PathBuf,
    },
}

/// Dispatch a parsed CLI subcommand to its handler
fn run_command(command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Validate { signatures } => commands::validate::run(&signatures),
        Commands::Show { signatures } => commands::show::run(&signatures),
        Commands::Check { signatures, calls } => commands::check::run(&signatures, &calls),
    }
}

/// Install the stderr subscriber; `RUST_LOG` wins over `--log-level`
fn setup_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Entry point: parse CLI arguments and run the selected subcommand
fn main() {
    let cli = Cli::parse();
    setup_logging(&cli.log_level);

    if let Err(e) = run_command(cli.command) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
