use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initializes console logging for binaries and examples.
pub fn init_logging() {
    let console_layer = fmt::layer().with_target(true).with_writer(std::io::stdout);

    // Respect RUST_LOG if set; otherwise default to verbose for our crate
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("feature_pipeline=debug,info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .init();
}
