//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Static site builder for π-polynomial particle mass formulas
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: lambda7.toml)
    #[arg(short = 'C', long, default_value = crate::config::CONFIG_FILE, value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Build the site
    #[command(visible_alias = "b")]
    Build {
        #[command(flatten)]
        build_args: BuildArgs,
    },
}

/// Build command arguments
#[derive(clap::Args, Debug, Clone)]
pub struct BuildArgs {
    /// Keep watching sources and rebuild on change
    #[arg(short, long)]
    pub watch: bool,

    /// Write nothing if any page fails
    #[arg(long)]
    pub strict: bool,

    /// Output directory path (relative to project root)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_build_flags() {
        let cli = Cli::parse_from(["lambda7", "-C", "site/lambda7.toml", "b", "--watch", "-V"]);
        assert_eq!(cli.config, PathBuf::from("site/lambda7.toml"));

        let Commands::Build { build_args } = cli.command;
        assert!(build_args.watch);
        assert!(build_args.verbose);
        assert!(!build_args.strict);
        assert!(build_args.output.is_none());
    }
}
