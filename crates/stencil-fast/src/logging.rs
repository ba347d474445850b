use tracing_subscriber::EnvFilter;

/// Installs the global fmt subscriber. Logs at `info` unless `debug` is set,
/// in which case `RUST_LOG` may override the `debug` default.
pub fn init(debug: bool) {
    let level = if debug { "debug" } else { "info" };

    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    } else {
        EnvFilter::new(level)
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
