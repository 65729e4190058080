//! Subscriber bootstrap for the `tracing` events the crate emits.
//!
//! Page objects log every driver-facing operation at `debug`, session
//! lifecycle and screenshots at `info`, and swallowed teardown problems at
//! `warn`. Nothing is printed until a subscriber is installed.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install a global fmt subscriber at `default_level`
///
/// `RUST_LOG` takes precedence when set. Returns `false` when a global
/// subscriber was already installed.
pub fn init_tracing(default_level: &str, json: bool) -> bool {
    let filter = env_filter(default_level);

    let registry = tracing_subscriber::registry().with(filter);
    let installed = if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()
    };
    installed.is_ok()
}

/// Level used by [`init_test_tracing`] when `RUST_LOG` is unset
pub const TEST_LOG_LEVEL: &str = "warn";

/// Subscriber for tests: captured by the test harness, safe to call repeatedly
///
/// Quiet by default; `RUST_LOG=debug` shows every driver operation.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(TEST_LOG_LEVEL))
        .with_test_writer()
        .try_init();
}

fn env_filter(default_level: &str) -> EnvFilter {
    filter_from(std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref(), default_level)
}

fn filter_from(directives: Option<&str>, default_level: &str) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(default_level))
}
