//! Scenario runner behind `saucer list` and `saucer run`

use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::{OutputFormat, Reporter};
use saucer::{run_catalog, CatalogResults, Config, DriverKind, ScenarioFilter};
use std::sync::Arc;

/// Lists and runs catalog scenarios, reporting through a [`Reporter`]
#[derive(Debug)]
pub struct ScenarioRunner {
    config: CliConfig,
    reporter: Reporter,
}

impl ScenarioRunner {
    /// Create a new runner
    #[must_use]
    pub fn new(config: CliConfig) -> Self {
        let reporter = Reporter::new(config.color.should_color(), config.verbosity.is_quiet());
        Self { config, reporter }
    }

    /// Get the CLI configuration
    #[must_use]
    pub const fn config(&self) -> &CliConfig {
        &self.config
    }

    /// Print the scenarios selected by `filter`
    pub fn list(&self, filter: &ScenarioFilter) -> CliResult<()> {
        let selected = filter.select();
        if selected.is_empty() {
            return Err(CliError::invalid_argument("no scenario matches the filter"));
        }
        for scenario in selected {
            self.reporter.scenario(scenario);
        }
        Ok(())
    }

    /// Run the scenarios selected by `filter`
    ///
    /// Returns the results when every scenario passed and a
    /// [`CliError::TestExecution`] otherwise.
    pub async fn run(
        &self,
        kind: DriverKind,
        config: Arc<Config>,
        filter: &ScenarioFilter,
        format: OutputFormat,
    ) -> CliResult<CatalogResults> {
        if filter.select().is_empty() {
            return Err(CliError::invalid_argument("no scenario matches the filter"));
        }
        if kind == DriverKind::Chromium && !cfg!(feature = "browser") {
            return Err(saucer::SaucerError::BrowserNotAvailable.into());
        }

        if format == OutputFormat::Text {
            self.reporter
                .header(&format!("Running scenarios ({kind}) against {}", config.base_url));
        }
        if format == OutputFormat::Text && self.config().verbosity.is_verbose() {
            self.reporter.info(&settings_line(&config));
        }
        tracing::debug!(%kind, base_url = %config.base_url, "catalog run starting");

        let results = run_catalog(kind, config, filter).await;

        match format {
            OutputFormat::Json => self.reporter.raw(&serde_json::to_string_pretty(&results)?),
            OutputFormat::Text => {
                for outcome in &results.outcomes {
                    self.reporter.outcome(outcome);
                }
                self.reporter.summary(&results);
            }
        }

        if results.all_passed() {
            Ok(results)
        } else {
            Err(CliError::test_execution(format!(
                "{} of {} scenarios failed",
                results.failed_count(),
                results.total()
            )))
        }
    }
}

/// Effective run settings, shown with `-v`
fn settings_line(config: &Config) -> String {
    format!(
        "{} headless={} timeout={}ms wait={}s screenshots={}",
        config.browser.as_str(),
        config.headless,
        config.timeout,
        config.wait_time,
        config.screenshots_dir.display()
    )
}
