use tracing_subscriber::EnvFilter;

/// Installs a `fmt` subscriber writing to stderr, filtered by `RUST_LOG`
/// and falling back to `default_directive`.
///
/// Does nothing if the process already has a global subscriber.
pub fn init_console(default_directive: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
