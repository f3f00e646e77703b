//! Car Listing Routes

use axum::{
    extract::{Query, State},
    Json,
};
use dataset::{CarRecord, SimilarCarsQuery};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::ApiError;
use crate::AppState;

/// Query parameters for the similar-cars endpoint
#[derive(Debug, Deserialize)]
pub struct SimilarCarsParams {
    pub brand: Option<String>,
    pub model: Option<String>,
    pub fuel_type: Option<String>,
    pub transmission: Option<String>,
    pub limit: Option<usize>,
}

/// One listing in a similar-cars response
#[derive(Debug, Serialize)]
pub struct CarListing {
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub price: i64,
    pub mileage: u32,
    pub fuel_type: String,
    pub transmission: String,
    pub engine_size: f64,
    pub horsepower: u32,
}

impl From<CarRecord> for CarListing {
    fn from(record: CarRecord) -> Self {
        let f = record.features;
        Self {
            brand: f.brand,
            model: f.model,
            year: f.year,
            price: record.price as i64,
            mileage: f.mileage,
            fuel_type: f.fuel_type,
            transmission: f.transmission,
            engine_size: f.engine_size,
            horsepower: f.horsepower,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SimilarCarsResponse {
    pub cars: Vec<CarListing>,
}

/// Listings matching the filters, newest first then cheapest
pub async fn similar_cars(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SimilarCarsParams>,
) -> Result<Json<SimilarCarsResponse>, ApiError> {
    if state.repository.is_empty() {
        return Err(ApiError::DataNotLoaded);
    }

    let limit = params
        .limit
        .unwrap_or(state.config.similar_cars_limit)
        .min(state.config.max_similar_cars);
    let query = SimilarCarsQuery {
        brand: params.brand,
        model: params.model,
        fuel_type: params.fuel_type,
        transmission: params.transmission,
        limit,
    };

    let cars = state
        .repository
        .similar(&query)
        .into_iter()
        .map(CarListing::from)
        .collect();
    Ok(Json(SimilarCarsResponse { cars }))
}

#[derive(Debug, Serialize)]
pub struct BrandsResponse {
    pub brands: Vec<String>,
}

/// Sorted unique brands
pub async fn brands(State(state): State<Arc<AppState>>) -> Result<Json<BrandsResponse>, ApiError> {
    if state.repository.is_empty() {
        return Err(ApiError::DataNotLoaded);
    }
    Ok(Json(BrandsResponse {
        brands: state.repository.brands(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct ModelsParams {
    pub brand: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub models: Vec<String>,
}

/// Sorted unique models of one brand
pub async fn models(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ModelsParams>,
) -> Result<Json<ModelsResponse>, ApiError> {
    let brand = params
        .brand
        .filter(|b| !b.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Brand parameter required".to_string()))?;
    if state.repository.is_empty() {
        return Err(ApiError::DataNotLoaded);
    }
    Ok(Json(ModelsResponse {
        models: state.repository.models_for(&brand),
    }))
}
