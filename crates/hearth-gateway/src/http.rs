//! HTTP API layer
//!
//! Thin axum front for the commander: one action endpoint, a
//! read-only directory listing, and a health probe. Outcomes map onto
//! status codes — 400 validation, 502 device-reported failure, 504
//! timeout, 503 transport down.

use std::future::Future;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::GatewayError;
use crate::orchestrator::Commander;

/// Shared state for HTTP handlers
#[derive(Clone)]
struct AppState {
    commander: Arc<Commander>,
}

/// Request body for the action endpoint
#[derive(Debug, Deserialize)]
pub struct ActionRequest {
    pub action: String,
    /// Optional argument; ON/OFF style actions carry none
    #[serde(default)]
    pub value: Option<i64>,
}

/// Build the API router
pub fn build_router(commander: Arc<Commander>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/devices", get(list_devices))
        .route("/api/v1/devices/:room/:device/action", post(device_action))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(AppState { commander })
}

/// Bind and serve until `shutdown` resolves
pub async fn serve(
    bind: &str,
    commander: Arc<Commander>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("HTTP API listening on {}", bind);

    axum::serve(listener, build_router(commander))
        .with_graceful_shutdown(shutdown)
        .await
}

// HTTP Handlers

async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn list_devices(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.commander.directory().clone())
}

async fn device_action(
    State(state): State<AppState>,
    Path((room, device)): Path<(String, String)>,
    Json(req): Json<ActionRequest>,
) -> Response {
    match state
        .commander
        .execute(&room, &device, &req.action, req.value)
        .await
    {
        Ok(reply) => Json(json!({
            "status": "success",
            "confirmed_result": reply,
        }))
        .into_response(),
        Err(e) => error_response(e),
    }
}

fn error_response(err: GatewayError) -> Response {
    let status = match &err {
        GatewayError::Validation(_) => StatusCode::BAD_REQUEST,
        GatewayError::DeviceReported { .. } => StatusCode::BAD_GATEWAY,
        GatewayError::GatewayTimeout => StatusCode::GATEWAY_TIMEOUT,
        GatewayError::Transport(_) => StatusCode::SERVICE_UNAVAILABLE,
        GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (status, Json(json!({ "detail": err.to_string() }))).into_response()
}
