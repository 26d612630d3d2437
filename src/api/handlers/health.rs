//! Health, readiness and metrics handlers

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use tracing::error;

use crate::server::AppState;

/// Response for the basic health check endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall health status
    pub status: &'static str,
    /// Service name
    pub service: &'static str,
    /// Service version
    pub version: &'static str,
    /// Timestamp of health check
    pub timestamp: String,
}

/// Response for the readiness endpoint
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub status: &'static str,
    pub anchor_enabled: bool,
    pub claims: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// GET / - Liveness banner.
pub async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "Backend running!" }))
}

/// GET /health - Process is up.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "agri-anchor",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// GET /ready - Ready only when proofs can be anchored and the claim
/// store answers.
pub async fn readiness_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<ReadinessResponse>) {
    let anchor = state.anchor.status();

    let (claims, reason) = match state.claims.count().await {
        Ok(claims) => (claims, anchor.reason),
        Err(e) => {
            error!(error = %e, "Claim store unavailable");
            (0, Some(format!("claim store unavailable: {}", e)))
        }
    };

    let ready = anchor.enabled && reason.is_none();
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(ReadinessResponse {
            status: if ready { "ready" } else { "not_ready" },
            anchor_enabled: anchor.enabled,
            claims,
            reason,
        }),
    )
}

/// GET /metrics - Prometheus text exposition.
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.to_prometheus().await,
    )
}
