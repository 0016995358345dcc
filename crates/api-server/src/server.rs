//! API server: axum router, middleware, Swagger UI, and the metrics
//! exporter.

use axum::routing::{get, post};
use axum::Router;
use mailpulse_core::config::AppConfig;
use parking_lot::RwLock;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::cache::SnapshotCache;
use crate::rest::{self, AppState, Dataset};
use crate::swagger::ApiDoc;

/// HTTP server for the dashboard API.
pub struct ApiServer {
    config: AppConfig,
    state: AppState,
}

impl ApiServer {
    pub fn new(config: AppConfig, dataset: Dataset) -> Self {
        let state = AppState {
            dataset: Arc::new(RwLock::new(dataset)),
            cache: Arc::new(SnapshotCache::new(config.dashboard.snapshot_cache_entries)),
            start_time: Instant::now(),
        };
        Self { config, state }
    }

    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    pub fn router(&self) -> Router {
        Router::new()
            .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
            // Ingestion
            .route("/v1/records", post(rest::handle_ingest))
            // Dashboard reads
            .route("/v1/dashboard/snapshot", get(rest::handle_snapshot))
            .route("/v1/dashboard/trend", get(rest::handle_trend))
            .route("/v1/dashboard/series", get(rest::handle_series))
            .route("/v1/dashboard/compare", get(rest::handle_compare))
            .route("/v1/dashboard/breakdown", get(rest::handle_breakdown))
            .route("/v1/flows", get(rest::handle_flows))
            // Operational endpoints
            .route("/health", get(rest::health_check))
            .route("/ready", get(rest::readiness))
            .route("/live", get(rest::liveness))
            // Middleware
            .layer(CompressionLayer::new())
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Start the HTTP server (blocks until shutdown).
    pub async fn start_http(&self) -> anyhow::Result<()> {
        let app = self.router();

        let addr = SocketAddr::new(self.config.api.host.parse()?, self.config.api.http_port);
        info!(addr = %addr, "Starting HTTP server");

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }

    /// Start the Prometheus exporter on a separate port.
    pub async fn start_metrics(&self) -> anyhow::Result<()> {
        let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
        let handle = builder
            .with_http_listener(SocketAddr::new(
                self.config.api.host.parse()?,
                self.config.metrics.port,
            ))
            .install_recorder()?;

        info!(port = self.config.metrics.port, "Metrics exporter started");

        // Keep the handle alive
        std::mem::forget(handle);
        Ok(())
    }
}
