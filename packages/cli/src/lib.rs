// ABOUTME: Server bootstrap and link administration for the otr binary
// ABOUTME: Wires configuration, storage, and the API router together

pub mod error;
pub mod links;
pub mod server;

use tracing_subscriber::EnvFilter;

use otr_config::constants::{DEFAULT_LOG_FILTER, RUST_LOG};

pub use error::{CliError, CliResult};
pub use links::{LinkAdmin, ListedLink};
pub use server::run_server;

/// Structured logging to stderr, filtered by `RUST_LOG`
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(RUST_LOG).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}
