use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber.
///
/// The level from config is the baseline; a `RUST_LOG` directive set in the
/// environment takes precedence over it. Repeated calls are no-ops, so tests
/// can call this freely.
pub fn init(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
