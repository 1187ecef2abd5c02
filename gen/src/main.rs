//! cosmogen CLI
//!
//! Generates strongly-typed contract bindings from a JSON configuration
//! listing contract schema directories.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use cosmogen_define::CodegenConfig;
use cosmogen_gen::errors::GeneratorError;
use cosmogen_gen::pipeline::{self, RunSummary};
use tracing_subscriber::EnvFilter;

/// cosmogen - transforms contract message schemas into typed Rust clients
#[derive(Parser, Debug)]
#[command(name = "cosmogen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the generation configuration file
    #[arg(short, long, default_value = "cosmogen.json")]
    config: PathBuf,

    /// Override the configured output directory
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Override the configured concurrency limit
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Print generated code without writing files
    #[arg(long)]
    dry_run: bool,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli).await {
        Ok(summary) => {
            if cli.dry_run {
                println!(
                    "{} {} modules rendered, nothing written (dry run)",
                    "✨ all done!".green(),
                    summary.modules
                );
            } else {
                println!(
                    "{} {} modules, {} files, {} shared types",
                    "✨ all done!".green(),
                    summary.modules,
                    summary.files,
                    summary.shared_types
                );
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{} {err}", "error:".red());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<RunSummary, GeneratorError> {
    let mut config = load_config(&cli.config)?;
    if let Some(out) = &cli.out {
        config.out_path = out.clone();
    }
    if let Some(jobs) = cli.jobs {
        config.options.concurrency = jobs;
    }

    let base_dir = cli.config.parent().unwrap_or(Path::new("."));
    pipeline::run(&config, base_dir, cli.dry_run).await
}

fn load_config(path: &Path) -> Result<CodegenConfig, GeneratorError> {
    let content = fs::read_to_string(path).map_err(|e| {
        GeneratorError::Config(format!("failed to read '{}': {e}", path.display()))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        GeneratorError::Config(format!("failed to parse '{}': {e}", path.display()))
    })
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();
}
