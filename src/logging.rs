//! Tracing subscriber setup shared by the binaries

use tracing_subscriber::EnvFilter;

/// Install a stderr subscriber honouring `RUST_LOG`, else `default_filter`
///
/// Safe to call more than once; later calls are ignored.
pub fn init(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
