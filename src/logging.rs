use tracing_subscriber::EnvFilter;

/// Logs go to stderr, which usually shares the terminal with the progress
/// block, so nothing is logged while a batch is drawing; the coordinator emits
/// its events after `Download Done`. `RUST_LOG` overrides the default of
/// warnings and errors only.
pub fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
