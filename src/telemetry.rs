//! Logging setup shared by every binary.

use std::io::{self, IsTerminal};
use std::sync::Once;

use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Installs the stderr subscriber. Later calls are ignored.
///
/// `RUST_LOG` overrides the default filter. `quiet` disables logging even
/// when `verbose` is also set.
pub fn init(verbose: bool, quiet: bool) {
    if quiet {
        return;
    }

    INIT.call_once(|| {
        let default_level = if verbose { "debug" } else { "warn" };
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("llmkit={default_level}")));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .with_ansi(io::stderr().is_terminal())
            .with_target(false)
            .try_init();
    });
}
