//! redgantt CLI - Excel gantt reports from Redmine issue hierarchies
//!
//! Loads a TOML config, queries the tracker, resolves the issue hierarchy
//! and writes a one-sheet XLSX gantt report.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod redmine;
mod run;

use config::Config;

#[derive(Parser)]
#[command(name = "redgantt")]
#[command(author, version, about = "Excel gantt reports from Redmine", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
    config: PathBuf,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Output file name; skips the interactive save prompt
    #[arg(short, long, value_name = "NAME")]
    output: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let mut config = Config::load(&cli.config)
        .with_context(|| format!("loading '{}'", cli.config.display()))?;

    let stdin = std::io::stdin();
    config
        .prompt_credentials(&mut stdin.lock(), &mut std::io::stdout())
        .context("reading credentials")?;

    run::run(&config, cli.output.as_deref())
}
