//! Feature Vector Layout

use serde::{Deserialize, Serialize};

/// Number of features in the vector
pub const FEATURE_DIMENSION: usize = 8;

/// Column names in vector order
pub const FEATURE_NAMES: [&str; FEATURE_DIMENSION] = [
    "brand",
    "model",
    "year",
    "mileage",
    "fuel_type",
    "transmission",
    "engine_size",
    "horsepower",
];

/// Numeric columns, standardised with the fitted mean and deviation
pub const NUMERIC_FEATURES: [&str; 4] = ["year", "mileage", "engine_size", "horsepower"];

/// Encoded feature vector for model input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Raw feature values in [`FEATURE_NAMES`] order
    pub values: Vec<f64>,
}

impl FeatureVector {
    /// Value of a named column
    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_NAMES
            .iter()
            .position(|n| *n == name)
            .and_then(|i| self.values.get(i).copied())
    }
}

impl Default for FeatureVector {
    fn default() -> Self {
        Self {
            values: vec![0.0; FEATURE_DIMENSION],
        }
    }
}
