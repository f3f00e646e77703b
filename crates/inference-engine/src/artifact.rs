//! Model Artifact
//!
//! The unit of persistence: encoder, forest and training metadata travel
//! together so a restored model can never pair with a foreign encoder.

use crate::forest::RandomForest;
use crate::EstimatorError;
use chrono::{DateTime, Utc};
use feature_engine::{FeatureEncoder, FEATURE_NAMES};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Bumped whenever the serialized layout changes
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// Held-out evaluation of a training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    /// Mean absolute error on the test partition
    pub mae: f64,
    pub r_squared: f64,
    /// `r_squared * 100`
    pub accuracy_percent: f64,
    pub train_rows: usize,
    pub test_rows: usize,
}

/// Trained model bundle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub model_id: Uuid,
    pub trained_at: DateTime<Utc>,
    pub encoder: FeatureEncoder,
    pub forest: RandomForest,
    pub feature_importance: BTreeMap<String, f64>,
    pub report: TrainingReport,
}

impl ModelArtifact {
    /// Bundle a freshly trained encoder and forest
    pub fn new(encoder: FeatureEncoder, forest: RandomForest, report: TrainingReport) -> Self {
        let feature_importance = FEATURE_NAMES
            .iter()
            .zip(forest.feature_importances())
            .map(|(name, &imp)| (name.to_string(), imp))
            .collect();

        Self {
            format_version: ARTIFACT_FORMAT_VERSION,
            model_id: Uuid::new_v4(),
            trained_at: Utc::now(),
            encoder,
            forest,
            feature_importance,
            report,
        }
    }

    /// Serialize to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, EstimatorError> {
        postcard::to_allocvec(self).map_err(|e| EstimatorError::Serialization(e.to_string()))
    }

    /// Deserialize and validate
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, EstimatorError> {
        let artifact: Self =
            postcard::from_bytes(bytes).map_err(|e| EstimatorError::Serialization(e.to_string()))?;
        artifact.validate()?;
        Ok(artifact)
    }

    /// Check that the bundle is internally consistent
    pub fn validate(&self) -> Result<(), EstimatorError> {
        if self.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(EstimatorError::CorruptArtifact(format!(
                "format version {} (expected {})",
                self.format_version, ARTIFACT_FORMAT_VERSION
            )));
        }
        if !self.forest.is_consistent() {
            return Err(EstimatorError::CorruptArtifact(
                "forest structure is inconsistent".to_string(),
            ));
        }
        if self.forest.n_features() != self.encoder.dimension() {
            return Err(EstimatorError::CorruptArtifact(format!(
                "forest expects {} features, encoder produces {}",
                self.forest.n_features(),
                self.encoder.dimension()
            )));
        }
        let names_match = self.feature_importance.len() == FEATURE_NAMES.len()
            && FEATURE_NAMES
                .iter()
                .all(|name| self.feature_importance.contains_key(*name));
        if !names_match {
            return Err(EstimatorError::CorruptArtifact(
                "feature importance does not cover the feature schema".to_string(),
            ));
        }
        Ok(())
    }
}
