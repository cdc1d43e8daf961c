//! Log subscriber setup.
//!
//! Everything goes to stderr so that stdout stays clean for JSON output.

use std::sync::Once;

use tracing_subscriber::EnvFilter;

static INIT_ONCE: Once = Once::new();

/// Install the global `tracing` subscriber. `RUST_LOG` wins over `verbose`.
pub fn init(verbose: bool) {
    INIT_ONCE.call_once(|| {
        let default = if verbose {
            "fixture_extract=debug"
        } else {
            "fixture_extract=info"
        };
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
            )
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    });
}
