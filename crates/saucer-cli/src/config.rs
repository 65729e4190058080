//! CLI configuration

use crate::error::{CliError, CliResult};
use saucer::{Config, DEMO_BASE_URL};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

/// CLI verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Verbosity {
    /// Quiet - minimal output
    Quiet,
    /// Normal - default output
    #[default]
    Normal,
    /// Verbose - extra output
    Verbose,
    /// Debug - maximum output
    Debug,
}

impl Verbosity {
    /// From the `-q` flag and the `-v` count
    #[must_use]
    pub const fn from_flags(quiet: bool, verbose: u8) -> Self {
        if quiet {
            return Self::Quiet;
        }
        match verbose {
            0 => Self::Normal,
            1 => Self::Verbose,
            _ => Self::Debug,
        }
    }

    /// Check if quiet mode
    #[must_use]
    pub const fn is_quiet(self) -> bool {
        matches!(self, Self::Quiet)
    }

    /// Check if verbose or higher
    #[must_use]
    pub const fn is_verbose(self) -> bool {
        matches!(self, Self::Verbose | Self::Debug)
    }

    /// Default `tracing` level for this verbosity
    #[must_use]
    pub const fn log_level(self) -> &'static str {
        match self {
            Self::Quiet => "error",
            Self::Normal => "warn",
            Self::Verbose => "info",
            Self::Debug => "debug",
        }
    }
}

/// Color output choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorChoice {
    /// Always use colors
    Always,
    /// Use colors when output is a terminal
    #[default]
    Auto,
    /// Never use colors
    Never,
}

impl ColorChoice {
    /// Should use colors based on output detection
    #[must_use]
    pub fn should_color(self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => std::io::IsTerminal::is_terminal(&std::io::stdout()),
        }
    }
}

/// CLI configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Verbosity level
    pub verbosity: Verbosity,
    /// Color output choice
    pub color: ColorChoice,
}

impl CliConfig {
    /// Create new default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set verbosity
    #[must_use]
    pub const fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set color choice
    #[must_use]
    pub const fn with_color(mut self, color: ColorChoice) -> Self {
        self.color = color;
        self
    }
}

/// Load the run configuration
///
/// An explicit `path` must exist. Without one, `config.yaml` in the working
/// directory is used when present, and the demo shop defaults otherwise.
/// `base_url` replaces the loaded URL.
pub fn load_run_config(path: Option<&Path>, base_url: Option<&str>) -> CliResult<Config> {
    let mut config = match path {
        Some(path) => {
            if !path.exists() {
                return Err(CliError::config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            Config::load(path)?
        }
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            if default.exists() {
                Config::load(&default)?
            } else {
                tracing::info!("no {DEFAULT_CONFIG_FILE} found, using {DEMO_BASE_URL}");
                Config::new(DEMO_BASE_URL)
            }
        }
    };

    if let Some(url) = base_url {
        let overridden = Config {
            base_url: url.to_string(),
            ..config
        };
        // Round-trip so the override goes through the same validation.
        config = Config::from_yaml(&overridden.to_yaml()?)?;
    }
    Ok(config)
}
