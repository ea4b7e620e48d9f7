mod aggregate;
mod analysis;
mod chart;
mod config;
mod data;
mod error;
mod ewma;
mod limits;
mod manager;
mod model;
mod stats;

use crate::manager::Manager;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(version, about)]
struct CLI {
    /// Directory holding config.toml, the input data and the outputs.
    #[arg(long)]
    mon_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Write the aggregated series, EWMA and control limits.
    Analyze,

    /// Write the control chart.
    Plot,

    /// Remove generated outputs.
    Clean,
}

fn main() {
    env_logger::Builder::new()
        .format_timestamp_millis()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    if let Err(error) = run_cli() {
        log::error!("{error:#?}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<()> {
    let args = CLI::parse();
    log::info!("{args:#?}");

    let mgr = Manager::new(args.mon_dir).context("failed to construct mgr")?;

    match args.command {
        Command::Analyze => mgr.analyze()?,
        Command::Plot => mgr.plot()?,
        Command::Clean => mgr.clean()?,
    }

    Ok(())
}
