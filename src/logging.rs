use tracing_subscriber::{EnvFilter, fmt};

pub const LOG_ENV: &str = "REPOSTITCH_LOG";

/// Installs a stderr subscriber.
///
/// `REPOSTITCH_LOG` (then `RUST_LOG`) overrides `default_level`. The interactive
/// UI passes `"off"` since it owns the terminal.
pub fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    // A second init (e.g. from tests) is harmless.
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}
