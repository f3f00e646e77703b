//! Request Validation
//!
//! Turns loosely-typed car attributes into a validated [`dataset::CarFeatures`],
//! rejecting missing attributes and out-of-range values before they reach the
//! feature encoder.

mod error;
mod validator;

pub use error::ValidationError;
pub use validator::{RawCarFeatures, ValidationConfig, Validator, REQUIRED_FIELDS};
