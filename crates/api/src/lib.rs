//! Car Price API Server
//!
//! REST API serving price estimates, listing search and dataset statistics.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use data_validator::{ValidationConfig, Validator};
use dataset::CarRepository;
use inference_engine::PredictorConfig;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use serde::Serialize;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn, Level};

mod config;
mod error;
mod routes;
mod service;

pub use crate::config::ServiceConfig;
pub use crate::error::ApiError;
pub use crate::service::{Estimate, ModelStatus, PriceService, PriceSource, ServiceError};

/// Application state shared across handlers
pub struct AppState {
    /// Current model and fallback
    pub service: Arc<PriceService>,
    /// Listings, read-only after startup
    pub repository: CarRepository,
    pub validator: Validator,
    pub config: ServiceConfig,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
    /// Prometheus exporter, when installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create new application state
    pub fn new(service: Arc<PriceService>, repository: CarRepository, config: ServiceConfig) -> Self {
        Self {
            service,
            repository,
            validator: Validator::new(ValidationConfig::default()),
            config,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: u64,
    pub version: String,
    pub uptime_seconds: u64,
    pub model: ModelStatus,
    pub dataset_records: usize,
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/health", get(health_handler))
        .route("/api/predict", post(routes::predict::predict))
        .route("/api/similar_cars", get(routes::cars::similar_cars))
        .route("/api/brands", get(routes::cars::brands))
        .route("/api/models", get(routes::cars::models))
        .route("/api/dashboard", get(routes::dashboard::dashboard))
        .route("/api/admin/retrain", post(routes::admin::retrain))
        .route("/api/admin/reload", post(routes::admin::reload))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let model = state.service.status().await;
    let status = if model.loaded { "healthy" } else { "degraded" };

    Json(HealthResponse {
        status: status.to_string(),
        timestamp,
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        model,
        dataset_records: state.repository.len(),
    })
}

/// Prometheus text exposition
async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::NOT_FOUND, "metrics exporter not installed".to_string()),
    }
}

/// Initialize logging. Returns false if a global subscriber was already set.
pub fn init_logging(level: &str) -> bool {
    let level = level.parse::<Level>().unwrap_or(Level::INFO);
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(true)
        .try_init()
        .is_ok()
}

/// Build state from configuration: dataset, model (if any) and metrics
pub async fn build_state(config: ServiceConfig) -> AppState {
    let repository = match CarRepository::from_csv(&config.data_path) {
        Ok(repository) => {
            info!(
                "Car data loaded from {}: {} records",
                config.data_path.display(),
                repository.len()
            );
            repository
        }
        Err(e) => {
            warn!("Car data not loaded from {}: {}", config.data_path.display(), e);
            CarRepository::default()
        }
    };

    let service = Arc::new(PriceService::new(
        config.model_path.clone(),
        PredictorConfig::default(),
    ));
    if let Err(e) = service.reload().await {
        warn!("{}; serving fallback estimates until a model is trained", e);
    }

    let state = AppState::new(service, repository, config);
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => state.with_metrics(handle),
        Err(e) => {
            warn!("Prometheus recorder not installed: {}", e);
            state
        }
    }
}

/// Run the server
pub async fn run_server(config: ServiceConfig) -> anyhow::Result<()> {
    let addr = config.bind_addr.clone();
    let state = Arc::new(build_state(config).await);
    let app = create_router(state);

    info!("Starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
