//! Dashboard Routes

use axum::{extract::State, Json};
use dataset::{CategoryCount, DatasetStats};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use crate::error::ApiError;
use crate::AppState;

/// Brands shown in the dashboard ranking
const TOP_BRANDS: usize = 10;

/// Typical pricing weights, served until a trained model provides its own
const DEFAULT_FEATURE_IMPORTANCE: [(&str, f64); 7] = [
    ("year", 0.25),
    ("brand", 0.20),
    ("mileage", 0.18),
    ("engine_size", 0.15),
    ("horsepower", 0.12),
    ("fuel_type", 0.06),
    ("transmission", 0.04),
];

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub stats: DatasetStats,
    pub feature_importance: BTreeMap<String, f64>,
    /// `model` when the importances come from the loaded model
    pub feature_importance_source: &'static str,
    pub fuel_counts: BTreeMap<String, usize>,
    pub transmission_counts: BTreeMap<String, usize>,
    /// Most listed first
    pub top_brands: Vec<CategoryCount>,
    pub year_range: Option<(i32, i32)>,
}

fn count_map(counts: Vec<CategoryCount>) -> BTreeMap<String, usize> {
    counts.into_iter().map(|c| (c.name, c.count)).collect()
}

/// Dataset statistics and model insight
pub async fn dashboard(State(state): State<Arc<AppState>>) -> Result<Json<DashboardResponse>, ApiError> {
    let repository = &state.repository;
    let stats = repository.stats().ok_or(ApiError::DataNotLoaded)?;

    let (feature_importance, feature_importance_source) = match state.service.feature_importance().await {
        Some(importance) => (importance, "model"),
        None => (
            DEFAULT_FEATURE_IMPORTANCE
                .iter()
                .map(|(name, v)| (name.to_string(), *v))
                .collect(),
            "default",
        ),
    };

    debug!("Dashboard: {} cars, avg price {}", stats.total_cars, stats.avg_price);

    Ok(Json(DashboardResponse {
        stats,
        feature_importance,
        feature_importance_source,
        fuel_counts: count_map(repository.fuel_counts()),
        transmission_counts: count_map(repository.transmission_counts()),
        top_brands: repository.top_brands(TOP_BRANDS),
        year_range: repository.year_range(),
    }))
}
