//! Log subscriber setup shared by the command-line tools.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install a stderr `fmt` subscriber.
///
/// `RUST_LOG` takes precedence; otherwise the level is `debug` when `verbose`
/// is set and `info` when not. Calling it twice is harmless.
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init()
        .ok();
}
