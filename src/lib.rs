pub mod config;
pub mod models;
pub mod db;
pub mod crypto;
pub mod pipeline;

use tracing_subscriber::EnvFilter;

/// Initialize tracing for binaries and integration tests.
///
/// Safe to call more than once — later calls are no-ops. Library users that
/// already install their own subscriber should skip this.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init();
}
