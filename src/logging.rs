//! Console logging.
//!
//! `RUST_LOG` wins when set; otherwise `info`, or `debug` with `--verbose`.

use tracing_subscriber::EnvFilter;

pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // a second initialisation (e.g. from tests) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_thread_names(true)
        .with_target(false)
        .try_init();
}
