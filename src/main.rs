//! lambda7 - static site builder for π-polynomial particle mass formulas.

mod build;
mod cli;
mod config;
mod core;
mod data;
mod formula;
mod freshness;
mod logger;
mod render;
mod utils;
mod watch;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::SiteConfig;

fn main() -> Result<()> {
    // Before any blocking work
    core::state::setup_shutdown_handler()?;

    let cli = Cli::parse();

    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let config = SiteConfig::load(&cli)?;

    match &cli.command {
        Commands::Build { build_args } => cli::build::run(config, build_args.watch),
    }
}
