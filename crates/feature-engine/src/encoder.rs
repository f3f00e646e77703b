//! Feature Encoder

use crate::category::{CategoryEncoder, UNKNOWN_CODE};
use crate::features::{FeatureVector, FEATURE_DIMENSION, NUMERIC_FEATURES};
use crate::scaler::StandardScaler;
use crate::EncodeError;
use dataset::CarFeatures;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Everything learned while fitting: category codes and numeric scaling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncoderState {
    pub brand: CategoryEncoder,
    pub model: CategoryEncoder,
    pub fuel_type: CategoryEncoder,
    pub transmission: CategoryEncoder,
    pub scaler: StandardScaler,
}

/// Fitted, immutable encoder from car attributes to model input.
///
/// Deserialisation goes through [`FeatureEncoder::from_state`], so a stored
/// encoder with the wrong shape is rejected rather than half-loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "EncoderState", into = "EncoderState")]
pub struct FeatureEncoder {
    state: EncoderState,
}

impl FeatureEncoder {
    /// Fit category codes and numeric scaling on training records
    pub fn fit<'a>(records: impl IntoIterator<Item = &'a CarFeatures>) -> Result<Self, EncodeError> {
        let records: Vec<&CarFeatures> = records.into_iter().collect();
        if records.is_empty() {
            return Err(EncodeError::EmptyInput);
        }

        let state = EncoderState {
            brand: CategoryEncoder::fit(records.iter().map(|r| r.brand.as_str())),
            model: CategoryEncoder::fit(records.iter().map(|r| r.model.as_str())),
            fuel_type: CategoryEncoder::fit(records.iter().map(|r| r.fuel_type.as_str())),
            transmission: CategoryEncoder::fit(records.iter().map(|r| r.transmission.as_str())),
            scaler: StandardScaler::fit(&records),
        };

        info!(
            "Fitted feature encoder on {} records: {} brands, {} models, {} fuel types, {} transmissions",
            records.len(),
            state.brand.len(),
            state.model.len(),
            state.fuel_type.len(),
            state.transmission.len()
        );

        Ok(Self { state })
    }

    /// Rebuild an encoder from stored state
    pub fn from_state(state: EncoderState) -> Result<Self, EncodeError> {
        if state.scaler.columns.len() != NUMERIC_FEATURES.len() {
            return Err(EncodeError::DimensionMismatch {
                what: "scaled columns",
                expected: NUMERIC_FEATURES.len(),
                actual: state.scaler.columns.len(),
            });
        }
        Ok(Self { state })
    }

    /// Encode one record. Unseen categories map to the unknown code.
    pub fn transform(&self, features: &CarFeatures) -> FeatureVector {
        let [year, mileage, engine_size, horsepower] = self.state.scaler.transform(features);

        let values = vec![
            Self::encode_category("brand", &self.state.brand, &features.brand),
            Self::encode_category("model", &self.state.model, &features.model),
            year,
            mileage,
            Self::encode_category("fuel_type", &self.state.fuel_type, &features.fuel_type),
            Self::encode_category("transmission", &self.state.transmission, &features.transmission),
            engine_size,
            horsepower,
        ];
        debug_assert_eq!(values.len(), FEATURE_DIMENSION);

        FeatureVector { values }
    }

    /// Encode many records
    pub fn transform_batch<'a>(&self, records: impl IntoIterator<Item = &'a CarFeatures>) -> Vec<FeatureVector> {
        records.into_iter().map(|r| self.transform(r)).collect()
    }

    /// Fitted state
    pub fn state(&self) -> &EncoderState {
        &self.state
    }

    /// Known labels of a categorical column in code order, `None` for other columns
    pub fn categories(&self, column: &str) -> Option<Vec<&str>> {
        let encoder = match column {
            "brand" => &self.state.brand,
            "model" => &self.state.model,
            "fuel_type" => &self.state.fuel_type,
            "transmission" => &self.state.transmission,
            _ => return None,
        };
        Some(encoder.labels().collect())
    }

    /// Output width
    pub fn dimension(&self) -> usize {
        FEATURE_DIMENSION
    }

    fn encode_category(column: &str, encoder: &CategoryEncoder, label: &str) -> f64 {
        match encoder.code(label) {
            Some(code) => code as f64,
            None => {
                debug!("Unseen {} '{}', using unknown code", column, label);
                UNKNOWN_CODE as f64
            }
        }
    }
}

impl TryFrom<EncoderState> for FeatureEncoder {
    type Error = EncodeError;

    fn try_from(state: EncoderState) -> Result<Self, Self::Error> {
        Self::from_state(state)
    }
}

impl From<FeatureEncoder> for EncoderState {
    fn from(encoder: FeatureEncoder) -> Self {
        encoder.state
    }
}
