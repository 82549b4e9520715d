//! Diagnostic logging
//!
//! Change lines own stdout, so diagnostics go to stderr through tracing.
//! `RUST_LOG` overrides the level picked from the flags.

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber
pub fn init(debug: bool) {
    let level = if debug { Level::DEBUG } else { Level::WARN };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_ascii_lowercase()));

    // A second init (tests) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
