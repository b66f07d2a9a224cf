//! HTTP surface of the gateway.
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/query` | `{"message": "..."}` in, envelope out |
//! | `GET` | `/health` | Liveness and version |
//!
//! Body parsing failures are answered with the same error envelope as
//! pipeline failures, so every response carries either `rows` or `error`.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post}
};
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::{
    error::{AppResult, PipelineError, server_error},
    gateway::Gateway,
    output::{ResponseEnvelope, format_response},
    types::UserRequest
};

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status:  &'static str,
    pub version: &'static str
}

impl IntoResponse for ResponseEnvelope {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.body)).into_response()
    }
}

/// Create the router for the gateway
pub fn create_router(gateway: Arc<Gateway>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/query", post(handle_query))
        .layer(TraceLayer::new_for_http())
        .with_state(gateway)
}

/// Bind `addr` and serve until the process stops
pub async fn serve(gateway: Gateway, addr: &str) -> AppResult<()> {
    let router = create_router(Arc::new(gateway));
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| server_error(format!("Failed to bind to {}: {}", addr, e)))?;
    tracing::info!("Gateway listening on {}", addr);
    tracing::info!("   POST /query   - Answer a natural-language question");
    tracing::info!("   GET  /health  - Health check");
    axum::serve(listener, router)
        .await
        .map_err(|e| server_error(format!("Server error: {}", e)))
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status:  "ok",
        version: env!("CARGO_PKG_VERSION")
    })
}

async fn handle_query(
    State(gateway): State<Arc<Gateway>>,
    payload: Result<Json<UserRequest>, JsonRejection>
) -> ResponseEnvelope {
    match payload {
        Ok(Json(request)) => gateway.handle(request).await,
        Err(rejection) => {
            tracing::warn!(error = %rejection.body_text(), "invalid request body");
            format_response(Err(PipelineError::InvalidRequest(String::from(
                "expected a JSON object with a \"message\" string"
            ))))
        }
    }
}
