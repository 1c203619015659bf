// Copyright 2026 Drawbridge Contributors
// SPDX-License-Identifier: Apache-2.0

//! HTTP boundary.
//!
//! One read endpoint, no parameters, no business logic: consult the query
//! service and hand its answer back as JSON. Adapter-level failures never
//! surface here — they are already null fields by the time a result
//! exists — so the only error response is the 502 for a defect that
//! escaped reconciliation.

use crate::service::{QueryService, ServiceError};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

pub struct AppState {
    pub service: QueryService,
}

/// Build the axum Router with all endpoints.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/ny/latest", get(latest))
        .layer(cors)
        .with_state(state)
}

/// Serve the API on the given port until the process exits.
pub async fn serve(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = router(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    info!("listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> Json<Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn latest(State(state): State<Arc<AppState>>) -> Response {
    match state.service.latest().await {
        Ok(result) => Json(result).into_response(),
        Err(err) => err.into_response(),
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        // Full detail to the log, minimal detail to the caller.
        error!(error = %self, "query failed past the absorption boundary");
        let body = Json(serde_json::json!({
            "error": "upstream failed",
            "detail": self.to_string(),
        }));
        (StatusCode::BAD_GATEWAY, body).into_response()
    }
}
