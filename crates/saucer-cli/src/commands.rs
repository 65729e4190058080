//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use saucer::Tag;
use std::path::PathBuf;

/// Saucer: run the Swag Labs scenario catalog from the command line
#[derive(Parser, Debug)]
#[command(name = "saucer")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the scenario catalog
    List(ListArgs),

    /// Run scenarios
    Run(RunArgs),

    /// Show the effective configuration
    Config(ConfigArgs),
}

/// Arguments for the list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Only scenarios carrying this tag (auth, inventory, cart, smoke)
    #[arg(short, long, value_parser = parse_tag)]
    pub tag: Vec<Tag>,
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Only scenarios carrying this tag (repeatable)
    #[arg(short, long, value_parser = parse_tag)]
    pub tag: Vec<Tag>,

    /// Only the scenario with this id, e.g. TC_AUTH_01 (repeatable)
    #[arg(long)]
    pub id: Vec<String>,

    /// Configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override base_url from the configuration
    #[arg(long)]
    pub base_url: Option<String>,

    /// Run against the in-process storefront instead of a browser
    #[arg(long)]
    pub offline: bool,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Color argument for CLI
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

fn parse_tag(value: &str) -> Result<Tag, String> {
    value.parse().map_err(|e: saucer::SaucerError| e.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_args() {
        let cli = Cli::parse_from([
            "saucer", "run", "--offline", "--tag", "cart", "--tag", "smoke", "--id", "TC_AUTH_01",
        ]);
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert!(args.offline);
        assert!(!args.json);
        assert_eq!(args.tag, vec![Tag::Cart, Tag::Smoke]);
        assert_eq!(args.id, vec!["TC_AUTH_01"]);
    }

    #[test]
    fn test_global_verbosity_after_subcommand() {
        let cli = Cli::parse_from(["saucer", "list", "-vv"]);
        assert_eq!(cli.verbose, 2);
        assert!(!cli.quiet);
    }

    #[test]
    fn test_unknown_tag_rejected() {
        assert!(Cli::try_parse_from(["saucer", "list", "--tag", "checkout"]).is_err());
    }
}
