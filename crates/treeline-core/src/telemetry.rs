//! Tracing setup for hosts and tests

use tracing_subscriber::EnvFilter;

/// Install a global fmt subscriber
///
/// `RUST_LOG` takes precedence over `default_filter` (e.g. `"treeline=info"`).
/// Returns `false` if a global subscriber was already installed, so it is
/// safe to call from every test.
pub fn init_tracing(default_filter: &str) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
