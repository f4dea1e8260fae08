//! Log output for the CLI.

use tracing_subscriber::EnvFilter;

use crate::constants::LOG_ENV;

/// Install the stderr subscriber. The filter comes from `VAJOURNAL_LOG`
/// (e.g. `vajournal_core=debug`) and defaults to warnings only.
pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
