//! Tracing setup for the `bgcast` binary.
//!
//! Dosing and simulation steps log at DEBUG. Everything is written to stderr:
//! stdout carries only the forecast table or the `--json` document, so it
//! can be piped straight into another tool.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the subscriber at INFO.
///
/// `RUST_LOG=bgcast_core=debug` shows every dosing and simulation decision.
pub fn init() {
    init_with_level("info")
}

/// Install the subscriber with `default_level` as the filter used when
/// RUST_LOG is unset or unparsable.
pub fn init_with_level(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

/// Debug-level output routed through the test harness; safe to call from
/// several tests
#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("debug"))
        .try_init();
}
