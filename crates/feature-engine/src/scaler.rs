//! Standard Scaling of Numeric Columns

use crate::features::NUMERIC_FEATURES;
use crate::statistics::StatisticalFeatures;
use dataset::CarFeatures;
use serde::{Deserialize, Serialize};

/// Fitted location and scale of one numeric column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnScale {
    pub name: String,
    pub mean: f64,
    /// Never zero: constant columns are stored with a unit scale
    pub std_dev: f64,
}

impl ColumnScale {
    fn from_values(name: &str, values: &[f64]) -> Self {
        let stats = StatisticalFeatures::compute(values);
        let std_dev = if stats.std_dev > 0.0 { stats.std_dev } else { 1.0 };
        Self {
            name: name.to_string(),
            mean: stats.mean,
            std_dev,
        }
    }

    /// Z-score of a raw value
    pub fn scale(&self, value: f64) -> f64 {
        (value - self.mean) / self.std_dev
    }
}

/// Z-score scaler over the numeric columns, in [`NUMERIC_FEATURES`] order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub columns: Vec<ColumnScale>,
}

impl StandardScaler {
    /// Fit per-column mean and population standard deviation
    pub fn fit(records: &[&CarFeatures]) -> Self {
        let columns = vec![
            ColumnScale::from_values(NUMERIC_FEATURES[0], &StatisticalFeatures::extract_year(records)),
            ColumnScale::from_values(NUMERIC_FEATURES[1], &StatisticalFeatures::extract_mileage(records)),
            ColumnScale::from_values(NUMERIC_FEATURES[2], &StatisticalFeatures::extract_engine_size(records)),
            ColumnScale::from_values(NUMERIC_FEATURES[3], &StatisticalFeatures::extract_horsepower(records)),
        ];
        Self { columns }
    }

    /// Scaled numeric values of one record: year, mileage, engine size, horsepower
    pub fn transform(&self, features: &CarFeatures) -> [f64; 4] {
        [
            self.columns[0].scale(features.year as f64),
            self.columns[1].scale(features.mileage as f64),
            self.columns[2].scale(features.engine_size),
            self.columns[3].scale(features.horsepower as f64),
        ]
    }
}
