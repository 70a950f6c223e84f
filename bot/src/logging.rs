//! Tracing setup for the bot.
//!
//! All diagnostics go to stderr so stdout stays reserved for command output
//! (`submitted <url>`, a document path, ...).

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "warn,working_bot=info";

/// Initialize the tracing subscriber.
///
/// Reads `RUST_LOG`; defaults to `info` for this crate and `warn` elsewhere.
///
/// # Example
/// ```bash
/// RUST_LOG=working_bot=debug working-bot rollover --issue 500
/// ```
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
