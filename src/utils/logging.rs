use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install the stderr `tracing` subscriber. Safe to call from every test.
///
/// Falls back to `info` when `RUST_LOG` is unset or invalid.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

        // A subscriber installed by another harness in the same process wins.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    });
}
