//! Diagnostic logging for the binary.
//!
//! Library code emits `tracing` events; this installs the subscriber that
//! prints them to stderr. User-facing results go through [`crate::ui`].

use std::io;

use tracing_subscriber::{filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset and no `-v` flag is given
pub const DEFAULT_FILTER: &str = "monobump=warn";

/// Filter directive for a `-v` count
pub fn filter_for_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => DEFAULT_FILTER,
        1 => "monobump=info",
        _ => "monobump=debug",
    }
}

/// Install the global subscriber.
///
/// `-v` flags take precedence over `RUST_LOG`; without them `RUST_LOG` is
/// honoured and falls back to [`DEFAULT_FILTER`].
pub fn init(verbose: u8) {
    let env_filter = if verbose > 0 {
        EnvFilter::new(filter_for_verbosity(verbose))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    };

    let layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(io::stderr);

    // A subscriber may already be installed when embedded; keep it.
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(layer)
        .try_init();
}
