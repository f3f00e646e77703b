//! Car Listing Dataset
//!
//! Typed car records, CSV loading, an in-memory repository with descriptive
//! statistics, and a seeded synthetic data generator.

mod loader;
mod repository;
mod synthetic;

pub use loader::{load_csv, write_csv};
pub use repository::{CarRepository, CategoryCount, DatasetStats, SimilarCarsQuery};
pub use synthetic::SyntheticGenerator;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Attributes describing a single car, without a price label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarFeatures {
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub mileage: u32,
    pub fuel_type: String,
    pub transmission: String,
    pub engine_size: f64,
    pub horsepower: u32,
}

/// A labelled training row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarRecord {
    #[serde(flatten)]
    pub features: CarFeatures,
    pub price: f64,
}

impl CarRecord {
    /// Create a record from features and a price label
    pub fn new(features: CarFeatures, price: f64) -> Self {
        Self { features, price }
    }

    /// Price and engine size are both finite numbers
    pub fn is_finite(&self) -> bool {
        self.price.is_finite() && self.features.engine_size.is_finite()
    }
}

/// Dataset errors
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Dataset is empty")]
    Empty,
}
