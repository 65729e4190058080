//! Saucer CLI: run the Swag Labs scenario catalog
//!
//! ## Usage
//!
//! ```bash
//! saucer list                      # Show the catalog
//! saucer run --offline             # Run everything against the in-process shop
//! saucer run --tag smoke           # Smoke suite in Chromium (feature `browser`)
//! saucer config -c config.yaml     # Print the effective configuration
//! ```

use clap::Parser;
use saucer::{DriverKind, ScenarioFilter};
use saucer_cli::{
    load_run_config, Cli, CliConfig, CliError, CliResult, ColorChoice, Commands, ConfigArgs,
    ListArgs, OutputFormat, Reporter, RunArgs, ScenarioRunner, Verbosity,
};
use std::process::ExitCode;
use std::sync::Arc;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();

    let config = build_config(&cli);
    saucer::init_tracing(config.verbosity.log_level(), false);

    match cli.command {
        Commands::List(args) => run_list(config, &args),
        Commands::Run(args) => run_scenarios(config, args),
        Commands::Config(args) => run_config(&config, &args),
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let verbosity = Verbosity::from_flags(cli.quiet, cli.verbose);
    let color: ColorChoice = cli.color.clone().into();

    CliConfig::new().with_verbosity(verbosity).with_color(color)
}

fn run_list(config: CliConfig, args: &ListArgs) -> CliResult<()> {
    let filter = ScenarioFilter {
        tags: args.tag.clone(),
        ids: Vec::new(),
    };
    ScenarioRunner::new(config).list(&filter)
}

fn run_scenarios(config: CliConfig, args: RunArgs) -> CliResult<()> {
    let run_config = load_run_config(args.config.as_deref(), args.base_url.as_deref())?;
    let kind = if args.offline {
        DriverKind::Offline
    } else {
        DriverKind::Chromium
    };
    let format = if args.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };
    let filter = ScenarioFilter {
        tags: args.tag,
        ids: args.id,
    };

    let runtime = tokio::runtime::Runtime::new()?;
    let runner = ScenarioRunner::new(config);
    runtime
        .block_on(runner.run(kind, Arc::new(run_config), &filter, format))
        .map(|_| ())
}

fn run_config(config: &CliConfig, args: &ConfigArgs) -> CliResult<()> {
    let run_config = load_run_config(args.config.as_deref(), None)?;
    let reporter = Reporter::new(config.color.should_color(), false);
    reporter.raw(&run_config.to_yaml().map_err(CliError::from)?);
    Ok(())
}
