// ABOUTME: Admin token authentication middleware for the link issuance endpoints
// ABOUTME: Compares the X-Admin-Token header against the configured admin secret

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use crate::error::AppError;
use crate::state::AppState;

/// Header name for the admin token
pub const ADMIN_TOKEN_HEADER: &str = "X-Admin-Token";

/// Admin token validation middleware
pub async fn admin_token_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = request.uri().path().to_string();

    // Skip authentication in development mode
    if state.dev_mode {
        debug!(path = %path, "Development mode active, skipping admin token validation");
        return Ok(next.run(request).await);
    }

    let Some(secret) = state.admin_secret.as_ref() else {
        warn!(path = %path, "Admin request refused, no admin token configured");
        return Err(AppError::unauthorized("Admin access is not configured"));
    };

    // Extract token from header
    let token = request
        .headers()
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok());

    let token = match token {
        Some(t) => t,
        None => {
            warn!(path = %path, "Missing admin token");
            return Err(AppError::unauthorized(
                "Admin token required. Please include X-Admin-Token header.",
            ));
        }
    };

    if !secret.verify(token) {
        warn!(path = %path, "Invalid admin token provided");
        return Err(AppError::unauthorized("Invalid admin token"));
    }

    debug!(path = %path, "Admin token validated successfully");
    Ok(next.run(request).await)
}
