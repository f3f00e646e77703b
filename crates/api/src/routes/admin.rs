//! Model Administration Routes

use axum::{extract::State, Json};
use inference_engine::TrainingReport;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::error::ApiError;
use crate::service::ModelStatus;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct RetrainResponse {
    pub status: &'static str,
    pub metrics: TrainingReport,
    pub model: ModelStatus,
}

/// Retrain on the loaded dataset, persist, and swap the new model in
pub async fn retrain(State(state): State<Arc<AppState>>) -> Result<Json<RetrainResponse>, ApiError> {
    if state.repository.is_empty() {
        return Err(ApiError::DataNotLoaded);
    }

    info!("Retraining on {} records", state.repository.len());
    let metrics = state
        .service
        .retrain(state.repository.records().to_vec())
        .await?;

    Ok(Json(RetrainResponse {
        status: "retrained",
        metrics,
        model: state.service.status().await,
    }))
}

/// Reload the model artifact from disk; the current model stays on failure
pub async fn reload(State(state): State<Arc<AppState>>) -> Result<Json<ModelStatus>, ApiError> {
    let status = state.service.reload().await?;
    Ok(Json(status))
}
