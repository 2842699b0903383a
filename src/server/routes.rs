//! HTTP endpoints
//!
//! - `GET /` - Health check, always `{"status":"ok"}`
//! - `GET /users` - User list proxied from the upstream service
//!
//! Every response carries `content-type: application/json`.

use crate::upstream::UserSource;
use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

use super::middleware::json_content_type;

/// Body of the health check
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct HealthStatus {
    pub status: String,
}

/// Body written when the upstream call fails
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ErrorPayload {
    pub err: String,
}

#[derive(Clone)]
pub struct AppState {
    users: Arc<dyn UserSource>,
}

/// Health check handler
async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok".to_string(),
    })
}

/// User listing handler
///
/// Upstream failures are reported in the body; the status stays 200.
async fn list_users(State(state): State<AppState>) -> Response {
    match state.users.fetch_users().await {
        Ok(users) => Json(users).into_response(),
        Err(e) => {
            warn!(error = %e, "Failed to fetch users from upstream");
            Json(ErrorPayload { err: e.to_string() }).into_response()
        }
    }
}

/// Build the application router
///
/// Routes are GET-only; `/users/` is served like `/users`.
pub fn build_router(users: Arc<dyn UserSource>) -> Router {
    let state = AppState { users };

    Router::new()
        .route("/", get(health))
        .route("/users", get(list_users))
        .route("/users/", get(list_users))
        .fallback(|| async { StatusCode::NOT_FOUND })
        .layer(middleware::from_fn(json_content_type))
        .with_state(state)
}
