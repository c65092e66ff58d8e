use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::{store::StoreError, AppState};

// ── Health ────────────────────────────────────────────────────────────────────

pub async fn health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

// ── Create ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequest {
    /// The payload to protect.
    pub secret: String,
    /// Number of successful reads allowed.
    pub expire_after_views: i32,
    /// Minutes until expiry; 0 means no practical expiry.
    #[serde(default)]
    pub expire_after: i64,
}

pub async fn create_secret(
    State(state): State<AppState>,
    body: Result<Json<CreateRequest>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => {
            return (
                rejection.status(),
                Json(json!({"error": rejection.body_text()})),
            )
                .into_response();
        }
    };

    match state
        .store
        .create_secret(&body.secret, body.expire_after_views, body.expire_after)
    {
        Ok(secret) => {
            info!(
                hash = %secret.handle,
                views = body.expire_after_views,
                ttl_minutes = body.expire_after,
                "audit: secret.create"
            );
            (StatusCode::CREATED, Json(secret)).into_response()
        }
        Err(e) => store_error(e),
    }
}

// ── Read ──────────────────────────────────────────────────────────────────────

pub async fn read_secret(State(state): State<AppState>, Path(hash): Path<String>) -> Response {
    match state.store.read_secret(&hash) {
        Ok(secret) => {
            info!(
                hash = %hash,
                remaining_views = secret.remaining_views,
                "audit: secret.read"
            );
            Json(secret).into_response()
        }
        Err(e) => store_error(e),
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Map a store failure onto an HTTP status with a JSON error body.
fn store_error(e: StoreError) -> Response {
    let status = match e {
        StoreError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
        StoreError::NotFound => StatusCode::NOT_FOUND,
        StoreError::Expired | StoreError::ViewsExhausted => StatusCode::GONE,
        StoreError::IdentifierGeneration(ref reason) => {
            tracing::error!(error = %reason, "internal error");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "internal server error"})),
            )
                .into_response();
        }
    };
    (status, Json(json!({"error": e.to_string()}))).into_response()
}
