//! visfab - headless driver for the `vis-fab` element
//!
//! Runs JSON scenarios against an in-memory document, and prints the
//! observed attributes and effective widget configuration.

mod scenario;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use visfab_widgets::FabConfig;

use crate::scenario::{Runner, Scenario};

/// Headless driver for the vis-fab custom element
#[derive(Parser, Debug)]
#[command(name = "visfab")]
#[command(about = "Headless driver for the vis-fab custom element")]
#[command(version)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a scenario file and report failed expectations
    Run {
        /// Scenario JSON file
        scenario: PathBuf,

        /// Widget configuration (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// List the attributes a configured element observes
    Attributes {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print the effective configuration as TOML
    Config {
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Start from the compact variant instead of the full one
        #[arg(long)]
        compact: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Run { scenario, config } => run(&scenario, load_config(config.as_deref(), false)?),
        Commands::Attributes { config } => {
            for name in load_config(config.as_deref(), false)?.observed_attributes() {
                println!("{name}");
            }
            Ok(())
        }
        Commands::Config { config, compact } => {
            print!("{}", load_config(config.as_deref(), compact)?.to_toml()?);
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>, compact: bool) -> Result<FabConfig> {
    match path {
        Some(path) => FabConfig::load(path).with_context(|| format!("Failed to load {}", path.display())),
        None if compact => Ok(FabConfig::compact()),
        None => Ok(FabConfig::full()),
    }
}

fn run(path: &Path, config: FabConfig) -> Result<()> {
    let scenario = Scenario::load(path)?;
    let name = scenario
        .name
        .clone()
        .unwrap_or_else(|| path.display().to_string());

    tracing::info!(scenario = %name, steps = scenario.steps.len(), "running");
    let report = Runner::new(config)?.run(&scenario)?;

    for failure in &report.failures {
        tracing::error!("{failure}");
    }
    if !report.passed() {
        bail!(
            "{name}: {} of {} steps failed",
            report.failures.len(),
            report.steps
        );
    }
    tracing::info!(scenario = %name, steps = report.steps, "passed");
    Ok(())
}
