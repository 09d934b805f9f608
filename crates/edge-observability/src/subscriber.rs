//! `tracing` subscriber setup for binaries.

use tracing_subscriber::{fmt, EnvFilter};

use crate::logging::LogFormat;

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "warn,edge_worker=info";

/// Build the env filter, preferring `RUST_LOG`.
pub fn env_filter(verbose: bool) -> EnvFilter {
    let fallback = if verbose {
        "info,edge_worker=debug,edge_cache=debug,edge_data=debug"
    } else {
        DEFAULT_FILTER
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}

/// Install the global subscriber writing to stderr.
///
/// Returns `false` when a subscriber was already installed.
pub fn init_tracing(format: LogFormat, verbose: bool) -> bool {
    let builder = fmt()
        .with_env_filter(env_filter(verbose))
        .with_writer(std::io::stderr)
        .with_target(true);

    let result = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Human => builder.compact().try_init(),
    };
    result.is_ok()
}
