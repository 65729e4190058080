//! Output formatting for scenario listings and run reports

use console::{style, Term};
use saucer::{CatalogResults, Scenario, ScenarioOutcome};
use serde::{Deserialize, Serialize};

/// Output format for run results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON output
    Json,
}

/// Line-oriented reporter writing to stdout
#[derive(Debug)]
pub struct Reporter {
    term: Term,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new(false, false)
    }
}

impl Reporter {
    /// Create a new reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stdout(),
            use_color,
            quiet,
        }
    }

    fn line(&self, text: &str) {
        let _ = self.term.write_line(text);
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }
        let prefix = if self.use_color {
            style("✓").green().bold().to_string()
        } else {
            "PASS".to_string()
        };
        self.line(&format!("{prefix} {message}"));
    }

    /// Print a failure message
    pub fn failure(&self, message: &str) {
        // Failures show even in quiet mode
        let prefix = if self.use_color {
            style("✗").red().bold().to_string()
        } else {
            "FAIL".to_string()
        };
        self.line(&format!("{prefix} {message}"));
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.quiet {
            return;
        }
        let prefix = if self.use_color {
            style("ℹ").blue().bold().to_string()
        } else {
            "INFO".to_string()
        };
        self.line(&format!("{prefix} {message}"));
    }

    /// Print a section header
    pub fn header(&self, title: &str) {
        if self.quiet {
            return;
        }
        if self.use_color {
            self.line(&style(title).bold().underlined().to_string());
        } else {
            self.line(title);
            self.line(&"=".repeat(title.chars().count()));
        }
    }

    /// Print raw text
    pub fn raw(&self, text: &str) {
        self.line(text.trim_end_matches('\n'));
    }

    /// One catalog row: id, tags, title
    pub fn scenario(&self, scenario: &Scenario) {
        let tags: Vec<&str> = scenario.tags().iter().map(|t| t.as_str()).collect();
        let id = if self.use_color {
            style(scenario.id).cyan().to_string()
        } else {
            scenario.id.to_string()
        };
        self.line(&format!("{id:<12} [{}] {}", tags.join(","), scenario.title));
    }

    /// One run outcome
    pub fn outcome(&self, outcome: &ScenarioOutcome) {
        let label = format!("{} {} ({} ms)", outcome.id, outcome.title, outcome.duration_ms);
        if outcome.passed {
            self.success(&label);
        } else {
            self.failure(&label);
            if let Some(ref error) = outcome.error {
                self.line(&format!("    {error}"));
            }
        }
    }

    /// Closing summary line
    pub fn summary(&self, results: &CatalogResults) {
        let text = format!(
            "{} passed, {} failed, {} total in {} ms",
            results.passed_count(),
            results.failed_count(),
            results.total(),
            results.duration_ms
        );
        if results.all_passed() {
            if self.quiet {
                return;
            }
            if self.use_color {
                self.line(&style(text).green().to_string());
            } else {
                self.line(&text);
            }
        } else if self.use_color {
            self.line(&style(text).red().to_string());
        } else {
            self.line(&text);
        }
    }
}
