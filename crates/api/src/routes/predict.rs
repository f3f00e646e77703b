//! Prediction Routes

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use dataset::CarFeatures;
use data_validator::RawCarFeatures;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use crate::error::ApiError;
use crate::service::PriceSource;
use crate::AppState;

/// Response for the predict endpoint
#[derive(Debug, Serialize)]
pub struct PredictResponse {
    /// Rounded to the nearest whole unit
    pub predicted_price: i64,
    pub source: PriceSource,
    pub car_features: CarFeatures,
}

/// Estimate the price of one car
pub async fn predict(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let Json(body) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    debug!("Prediction request: {}", body);

    let raw = RawCarFeatures::from_json(body)?;
    let features = state.validator.validate(&raw)?;
    let estimate = state.service.estimate(&features).await;

    Ok(Json(PredictResponse {
        predicted_price: estimate.price.round() as i64,
        source: estimate.source,
        car_features: features,
    }))
}
