//! Rule-Based Fallback Pricing
//!
//! Heuristic car price used when no trained model is available. The result
//! depends only on the car and a jitter factor.

mod rules;

pub use rules::{BrandTier, FallbackEstimator, FallbackRules};
