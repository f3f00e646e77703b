//! Price Estimation Engine
//!
//! Random forest regression over encoded car features: training with a
//! held-out evaluation, prediction, and all-or-nothing artifact persistence.

mod artifact;
mod forest;
mod metrics;
mod predictor;
mod split;
mod tree;

pub use artifact::{ModelArtifact, TrainingReport, ARTIFACT_FORMAT_VERSION};
pub use forest::{ForestConfig, RandomForest};
pub use metrics::{mean_absolute_error, r2_score};
pub use predictor::{PredictorConfig, PricePredictor, MIN_TRAINING_ROWS};
pub use split::train_test_split;
pub use tree::{RegressionTree, TreeConfig, TreeNode};

use feature_engine::EncodeError;
use storage::StorageError;
use thiserror::Error;

/// Errors from training, prediction and persistence
#[derive(Debug, Error)]
pub enum EstimatorError {
    #[error("Model not trained. Please train or load a model first.")]
    ModelNotTrained,
    #[error("Insufficient training data: need at least {required} records, got {actual}")]
    InsufficientData { required: usize, actual: usize },
    #[error("Invalid training data: {0}")]
    InvalidTrainingData(String),
    #[error("Feature encoding failed: {0}")]
    Encode(#[from] EncodeError),
    #[error("Artifact storage failed: {0}")]
    Storage(#[from] StorageError),
    #[error("Artifact serialization failed: {0}")]
    Serialization(String),
    #[error("Corrupt model artifact: {0}")]
    CorruptArtifact(String),
}
