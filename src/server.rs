//! HTTP server bootstrap for Agri Anchor.
//!
//! This module wires together:
//! - configuration
//! - the anchor service and claim store
//! - the Axum router

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{HeaderValue, Method};
use axum::routing::get;
use axum::Router;
use tower_http::cors::AllowOrigin;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::anchor::AnchorService;
use crate::api::handlers::{health_check, metrics, readiness_check, root};
use crate::infra::{ClaimStore, InMemoryClaimStore};
use crate::metrics::MetricsRegistry;
use crate::telemetry::{init_telemetry, TelemetryConfig};

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server listen address.
    pub listen_addr: SocketAddr,
    /// Allowed CORS origins (`*` or a comma-separated list); unset disables CORS.
    pub cors_allow_origins: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(5000);

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let listen_addr: SocketAddr = format!("{host}:{port}")
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid listen address {host}:{port}: {e}"))?;

        let cors_allow_origins = std::env::var("CORS_ALLOW_ORIGINS")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        Ok(Self {
            listen_addr,
            cors_allow_origins,
        })
    }
}

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub anchor: Arc<AnchorService>,
    pub claims: Arc<dyn ClaimStore>,
    pub metrics: Arc<MetricsRegistry>,
}

impl AppState {
    pub fn new(anchor: Arc<AnchorService>, claims: Arc<dyn ClaimStore>) -> Self {
        Self {
            anchor,
            claims,
            metrics: Arc::new(MetricsRegistry::new()),
        }
    }
}

/// Start the HTTP server.
pub async fn run() -> anyhow::Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            return Err(e.into());
        }
    }

    let telemetry = TelemetryConfig::from_env();
    init_telemetry(&telemetry)?;

    info!(
        "Starting {} v{}",
        telemetry.service_name, telemetry.service_version
    );

    // Load configuration
    let config = Config::from_env()?;
    info!("Configuration loaded");
    info!("  Listen address: {}", config.listen_addr);

    // Initialize services
    let metrics = Arc::new(MetricsRegistry::new());
    let anchor = Arc::new(
        AnchorService::from_env()
            .await
            .with_metrics(metrics.clone()),
    );
    if !anchor.is_enabled() {
        warn!("Proof anchoring is DISABLED; claim filing and /api/store-proof will return 503");
    }

    let state = AppState {
        anchor,
        claims: Arc::new(InMemoryClaimStore::new()),
        metrics,
    };

    // Build router
    let mut app = build_router(state);
    if let Some(origins) = &config.cors_allow_origins {
        app = app.layer(cors_layer(origins)?);
    }

    // Start server
    info!("Starting HTTP server on {}", config.listen_addr);
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;

    info!("Agri Anchor is ready to accept connections");
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the full application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/metrics", get(metrics))
        .nest("/api", crate::api::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &str) -> anyhow::Result<CorsLayer> {
    let allow_origin = if origins == "*" {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = origins
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<HeaderValue>()
                    .map_err(|e| anyhow::anyhow!("Invalid CORS origin {s:?}: {e}"))
            })
            .collect::<anyhow::Result<_>>()?;
        AllowOrigin::list(origins)
    };

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([axum::http::header::CONTENT_TYPE]))
}
