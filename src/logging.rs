use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `PAPER_LOG=paperlib=debug`
pub const LOG_ENV: &str = "PAPER_LOG";

/// Install the stderr subscriber used by the binaries. Defaults to `warn`.
/// Safe to call more than once; later calls are no-ops.
pub fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
