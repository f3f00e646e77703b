//! Feature Engineering Engine
//!
//! Maps car attributes to the fixed-width numeric vector consumed by the
//! price models: ordinal codes for categorical attributes, z-scores for
//! numeric ones.

mod category;
mod encoder;
mod features;
mod scaler;
mod statistics;

pub use category::{CategoryEncoder, UNKNOWN_CODE};
pub use encoder::{EncoderState, FeatureEncoder};
pub use features::{FeatureVector, FEATURE_DIMENSION, FEATURE_NAMES, NUMERIC_FEATURES};
pub use scaler::{ColumnScale, StandardScaler};
pub use statistics::StatisticalFeatures;

use thiserror::Error;

/// Errors during feature encoding
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodeError {
    #[error("Cannot fit encoder on an empty record set")]
    EmptyInput,
    #[error("Invalid encoder state: expected {expected} {what}, got {actual}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
}
