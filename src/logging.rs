//! Tracing setup for the CLI and native hosts.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Verbosity names accepted on the command line.
pub const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Installs the global subscriber.
///
/// `RUST_LOG` wins when set; otherwise `default_level` applies to this crate
/// and everything else logs at `warn`. Calling it twice is harmless.
pub fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,djvlaunch_core={default_level},djvlaunch={default_level}")));

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}
