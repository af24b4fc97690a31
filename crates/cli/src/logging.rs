use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber. Logs go to stderr.
///
/// `RUST_LOG` wins when set; otherwise `info`, or `warn` with `--quiet`.
pub fn init_tracing(quiet: bool) {
    let default_level = if quiet { "warn" } else { "info" };
    let filter =
        EnvFilter::try_from_env("RUST_LOG").unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
