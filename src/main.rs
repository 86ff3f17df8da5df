//! fwpack - packs a web UI into C++ headers for firmware builds.

mod cli;
mod config;
mod logger;
mod manifest;
mod pack;
mod utils;
mod watch;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands, build::build_all};
use config::PackerConfig;

fn main() -> Result<()> {
    watch::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let config = PackerConfig::load(&cli)?;
    let manifest = manifest::firmware();

    match &cli.command {
        Commands::Build { .. } => build_all(&config, &manifest).map(|_| ()),
        Commands::Watch { .. } => watch::watch(&cli, config, &manifest),
    }
}
