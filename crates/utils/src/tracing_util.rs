//! Logging setup for the entrypoint.

use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::prelude::*;

/// Initialize tracing.
///
/// Human-readable output goes to stderr, filtered by `RUST_LOG` and
/// defaulting to warnings.  When running as root, info and above is
/// also sent to the journal if it is reachable.
pub fn initialize_tracing() {
    let journald_layer = rustix::process::getuid()
        .is_root()
        .then(|| tracing_journald::layer().ok())
        .flatten()
        .map(|layer| layer.with_filter(LevelFilter::INFO));

    let format = tracing_subscriber::fmt::format()
        .without_time()
        .with_target(false)
        .compact();

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();

    let fmt_layer = tracing_subscriber::fmt::layer()
        .event_format(format)
        .with_writer(std::io::stderr)
        .with_filter(filter);

    // Option<Layer> is itself a layer, so a missing journal is a no-op
    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(journald_layer)
        .init();
}
