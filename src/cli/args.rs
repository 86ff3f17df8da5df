//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Pack web UI sources into firmware C++ headers
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: fwpack.toml)
    #[arg(short = 'C', long, default_value = "fwpack.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Generate all headers once
    #[command(visible_alias = "b")]
    Build {
        #[command(flatten)]
        build_args: BuildArgs,
    },

    /// Regenerate all headers whenever a source changes
    #[command(visible_alias = "w")]
    Watch {
        #[command(flatten)]
        build_args: BuildArgs,
    },
}

/// Shared arguments for Build and Watch
#[derive(clap::Args, Debug, Clone, Default)]
pub struct BuildArgs {
    /// UI source directory (relative to project root)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub source: Option<PathBuf>,

    /// Header output directory (relative to project root)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Minify the UI document before compressing it
    #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub minify: Option<bool>,

    /// Fail assets with unknown filter names instead of passing them through
    #[arg(long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub strict_filters: Option<bool>,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long)]
    pub verbose: bool,
}

impl Cli {
    pub fn build_args(&self) -> &BuildArgs {
        match &self.command {
            Commands::Build { build_args } | Commands::Watch { build_args } => build_args,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_build() {
        let cli = Cli::parse_from([
            "fwpack", "-C", "other.toml", "build", "--source", "ui", "-m", "false", "-V",
        ]);
        assert_eq!(cli.config, PathBuf::from("other.toml"));
        assert!(matches!(cli.command, Commands::Build { .. }));
        let args = cli.build_args();
        assert_eq!(args.source, Some(PathBuf::from("ui")));
        assert_eq!(args.minify, Some(false));
        assert_eq!(args.strict_filters, None);
        assert!(args.verbose);
    }

    #[test]
    fn test_parse_watch_flag_without_value() {
        let cli = Cli::parse_from(["fwpack", "watch", "--strict-filters"]);
        assert!(matches!(cli.command, Commands::Watch { .. }));
        assert_eq!(cli.build_args().strict_filters, Some(true));
        assert_eq!(cli.config, PathBuf::from("fwpack.toml"));
    }
}
