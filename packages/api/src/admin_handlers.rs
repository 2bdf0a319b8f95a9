// ABOUTME: HTTP request handlers for registration link administration
// ABOUTME: Issue new single-use links, list outstanding ones, and purge stale tokens

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use otr_core::Token;
use otr_gate::RegistrationUrl;

use crate::error::{ApiResult, AppError};
use crate::response::ApiResponse;
use crate::state::AppState;

/// Purge window accepted by the API; anything larger is almost certainly a typo
pub const MAX_PURGE_DAYS: u32 = 36_500;

/// A registration link as returned to administrators
#[derive(Debug, Serialize)]
pub struct LinkResponse {
    pub url: String,
    pub token: String,
    pub issued_at: DateTime<Utc>,
}

impl LinkResponse {
    fn new(links: &RegistrationUrl, token: Token) -> Self {
        Self {
            url: links.with_token(&token.value),
            token: token.value,
            issued_at: token.issued_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LinkListResponse {
    pub count: usize,
    pub links: Vec<LinkResponse>,
}

/// Request body for purging old tokens
#[derive(Debug, Deserialize)]
pub struct PurgeRequest {
    pub older_than_days: u32,
}

#[derive(Debug, Serialize)]
pub struct PurgeResponse {
    pub removed: u64,
    pub cutoff: DateTime<Utc>,
}

/// Mint a token and return its shareable URL
pub async fn generate_link(
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<LinkResponse>>> {
    let link = state.gate.issue_link().await?;

    Ok(Json(ApiResponse::success(LinkResponse {
        url: link.url,
        token: link.token.value,
        issued_at: link.token.issued_at,
    })))
}

/// Outstanding links, newest first
pub async fn list_links(
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<LinkListResponse>>> {
    let tokens = state.token_store.list().await?;
    let links: Vec<LinkResponse> = tokens
        .into_iter()
        .map(|token| LinkResponse::new(state.gate.links(), token))
        .collect();

    info!(count = links.len(), "Listed outstanding registration links");

    Ok(Json(ApiResponse::success(LinkListResponse {
        count: links.len(),
        links,
    })))
}

/// Delete tokens issued more than `older_than_days` days ago
pub async fn purge_links(
    State(state): State<AppState>,
    payload: Result<Json<PurgeRequest>, JsonRejection>,
) -> ApiResult<Json<ApiResponse<PurgeResponse>>> {
    let Json(request) = payload?;

    if request.older_than_days > MAX_PURGE_DAYS {
        return Err(AppError::validation(format!(
            "older_than_days must be at most {}",
            MAX_PURGE_DAYS
        )));
    }

    let cutoff = Utc::now() - Duration::days(i64::from(request.older_than_days));
    let removed = state.token_store.purge_issued_before(cutoff).await?;

    info!(
        removed,
        older_than_days = request.older_than_days,
        "Purged registration tokens"
    );

    Ok(Json(ApiResponse::success(PurgeResponse { removed, cutoff })))
}
