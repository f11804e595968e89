//! logging
//!
//! Tracing subscriber setup. Diagnostics go to stderr so stdout stays
//! clean for command output.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter directive.
pub const DEFAULT_FILTER: &str = "argus=warn";

/// Filter directive for `--debug`.
pub const DEBUG_FILTER: &str = "argus=debug";

/// Pick the filter: `--debug` wins, then `RUST_LOG`, then the default.
pub fn filter(debug: bool) -> EnvFilter {
    if debug {
        EnvFilter::new(DEBUG_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

/// Install the global subscriber. Safe to call more than once; later
/// calls are ignored.
pub fn init(debug: bool) {
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(debug)
        .without_time();

    let _ = tracing_subscriber::registry()
        .with(layer)
        .with(filter(debug))
        .try_init();
}
