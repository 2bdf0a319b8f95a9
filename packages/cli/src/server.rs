// ABOUTME: HTTP server startup for the otr binary
// ABOUTME: Opens the database, builds application state from config, and serves until Ctrl-C

use tokio::net::TcpListener;
use tracing::{info, warn};

use otr_api::{create_router, ApiConfig, AppState};
use otr_security::AdminSecret;
use otr_storage::init_pool;

use crate::error::CliResult;

pub async fn run_server(config: ApiConfig) -> CliResult<()> {
    let pool = init_pool(&config.database_path).await?;
    let links = config.registration_url()?;
    let registration_page = links.page();

    let mut state = AppState::new(pool, links).with_dev_mode(config.dev_mode);
    match &config.admin_token {
        Some(token) => state = state.with_admin_secret(AdminSecret::new(token)),
        None if config.dev_mode => {
            warn!("Development mode active, admin endpoints are unauthenticated")
        }
        None => warn!("OTR_ADMIN_TOKEN is not set, admin endpoints will refuse all requests"),
    }

    let app = create_router(state);
    let addr = config.socket_addr();
    let listener = TcpListener::bind(addr).await?;

    info!(
        address = %addr,
        registration_page = %registration_page,
        database = %config.database_path.display(),
        "Server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            // Without a signal handler the server runs until killed
            warn!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    }
}
