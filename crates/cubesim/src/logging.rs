//! Tracing setup for binaries and harnesses embedding the simulator

use tracing_subscriber::EnvFilter;

/// Default filter directive for the given debug switch
pub fn default_directive(debug: bool) -> &'static str {
    if debug {
        "cubesim=debug"
    } else {
        "cubesim=info"
    }
}

/// Install a stderr fmt subscriber.
///
/// `RUST_LOG` takes precedence over the debug switch. Returns `false` when a
/// global subscriber was already installed.
pub fn init_tracing(debug: bool) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(debug)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}
