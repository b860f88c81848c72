//! Logging configuration for the query client.
//!
//! Logs go to stderr so that stdout carries only rendered results.

use tracing_subscriber::EnvFilter;

/// Returns the filter used when `RUST_LOG` is not set.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "scout_query=debug,info"
    } else {
        "info"
    }
}

/// Initializes stderr logging.
///
/// `RUST_LOG` takes precedence over the verbosity flag.
pub fn init_stderr_logging(verbose: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose))),
        )
        .with_writer(std::io::stderr)
        .init();
}
