//! Saucer CLI Library
//!
//! Command-line interface for listing and running the Saucer scenario
//! catalog.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)] // Error types are self-documenting

mod commands;
mod config;
mod error;
mod output;
mod runner;

pub use commands::{Cli, ColorArg, Commands, ConfigArgs, ListArgs, RunArgs};
pub use config::{load_run_config, CliConfig, ColorChoice, Verbosity, DEFAULT_CONFIG_FILE};
pub use error::{CliError, CliResult};
pub use output::{OutputFormat, Reporter};
pub use runner::ScenarioRunner;
