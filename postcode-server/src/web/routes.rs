//! HTTP route handlers.

use axum::body::Bytes;
use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, warn};

use crate::resolver::{ResolveError, resolve};

use super::dto::*;
use super::state::AppState;

/// Body returned to anything other than a POST.
const USAGE: &str =
    "Please make a post request with postcodes in a JSON list and Authorization header set\n";

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(usage).post(lookup))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// The lookup endpoint only accepts POST.
async fn usage() -> (StatusCode, &'static str) {
    (StatusCode::METHOD_NOT_ALLOWED, USAGE)
}

/// Health check endpoint.
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        resident_shard: state.store.resident_shard().map(|s| s.number()),
        shard_loads: state.store.load_count(),
    })
}

/// Check the `Authorization: Token <token>` header.
///
/// Only one leading `Token ` is stripped; a header that repeats the prefix
/// or carries it mid-value is rejected.
fn authorized(headers: &HeaderMap, expected: &str) -> bool {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let token = value.strip_prefix("Token ").unwrap_or(value);
    token == expected
}

/// Look up a JSON list of postcodes.
///
/// The body is parsed regardless of content type.
async fn lookup(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<LookupResponse>, AppError> {
    if !authorized(&headers, &state.auth_token) {
        return Err(AppError::Forbidden);
    }

    let body: serde_json::Value = serde_json::from_slice(&body).map_err(|e| {
        debug!("invalid JSON body: {e}");
        AppError::InvalidJson
    })?;
    let postcodes = postcode_list(body).ok_or(AppError::NotAList)?;

    // Shard loads block on disk; keep them off the async workers.
    let store = state.store.clone();
    let lookup = tokio::task::spawn_blocking(move || resolve(&store, &postcodes))
        .await
        .map_err(|e| AppError::Internal {
            message: format!("lookup task failed: {e}"),
        })??;

    Ok(Json(lookup))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    /// Missing or wrong token
    Forbidden,
    /// Body isn't JSON
    InvalidJson,
    /// Body is JSON but not a list of strings
    NotAList,
    /// Storage is broken; detail is logged, not returned
    Internal { message: String },
}

impl From<ResolveError> for AppError {
    fn from(e: ResolveError) -> Self {
        AppError::Internal {
            message: e.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::Forbidden => (StatusCode::FORBIDDEN, "Please insert coin\n"),
            AppError::InvalidJson => (
                StatusCode::BAD_REQUEST,
                "Invalid JSON, please check your syntax\n",
            ),
            AppError::NotAList => (
                StatusCode::BAD_REQUEST,
                "The JSON you submit should be a simple list of postcodes\n",
            ),
            AppError::Internal { message } => {
                error!("[500] {message}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Postcode data is unavailable, please try again later\n",
                )
            }
        };

        if status.is_client_error() {
            warn!("[{status}] {}", body.trim_end());
        }

        (status, body).into_response()
    }
}
