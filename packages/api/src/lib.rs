// ABOUTME: HTTP API layer for OTR
// ABOUTME: Admin link endpoints, the registration gate middleware, and the registration form handlers

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub mod admin_handlers;
pub mod config;
pub mod error;
pub mod health;
pub mod middleware;
pub mod registration_handlers;
pub mod response;
pub mod state;

pub use config::{ApiConfig, ConfigError};
pub use error::{ApiResult, AppError};
pub use response::ApiResponse;
pub use state::AppState;

/// Build the full application router.
///
/// Admin routes live under `/api/admin` behind the admin token check; the
/// registration page is mounted at the configured registration path behind
/// the registration gate.
pub fn create_router(state: AppState) -> Router {
    let admin_router = Router::new()
        .route(
            "/registration-links",
            get(admin_handlers::list_links).post(admin_handlers::generate_link),
        )
        .route(
            "/registration-links/purge",
            post(admin_handlers::purge_links),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::admin_token::admin_token_middleware,
        ));

    let registration_path = state.gate.links().path().to_string();
    let registration_router = Router::new()
        .route(
            &registration_path,
            get(registration_handlers::registration_form)
                .post(registration_handlers::complete_registration),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::registration_gate::registration_gate_middleware,
        ));

    Router::new()
        .route("/api/health", get(health::health_check))
        .nest("/api/admin", admin_router)
        .merge(registration_router)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
