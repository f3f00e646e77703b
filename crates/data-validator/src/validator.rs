//! Car Attribute Validator

use crate::error::ValidationError;
use dataset::CarFeatures;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Attributes every request must carry, in the order they are checked
pub const REQUIRED_FIELDS: [&str; 8] = [
    "brand",
    "model",
    "year",
    "mileage",
    "fuel_type",
    "transmission",
    "engine_size",
    "horsepower",
];

/// Car attributes as received over the wire, every field optional
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawCarFeatures {
    pub brand: Option<String>,
    pub model: Option<String>,
    pub year: Option<f64>,
    pub mileage: Option<f64>,
    pub fuel_type: Option<String>,
    pub transmission: Option<String>,
    pub engine_size: Option<f64>,
    pub horsepower: Option<f64>,
}

impl RawCarFeatures {
    /// Parse from an arbitrary JSON value
    pub fn from_json(value: serde_json::Value) -> Result<Self, ValidationError> {
        if !value.is_object() {
            return Err(ValidationError::InvalidFormat(
                "expected a JSON object".to_string(),
            ));
        }
        serde_json::from_value(value).map_err(|e| ValidationError::InvalidFormat(e.to_string()))
    }
}

impl From<&CarFeatures> for RawCarFeatures {
    fn from(f: &CarFeatures) -> Self {
        Self {
            brand: Some(f.brand.clone()),
            model: Some(f.model.clone()),
            year: Some(f.year as f64),
            mileage: Some(f.mileage as f64),
            fuel_type: Some(f.fuel_type.clone()),
            transmission: Some(f.transmission.clone()),
            engine_size: Some(f.engine_size),
            horsepower: Some(f.horsepower as f64),
        }
    }
}

/// Validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Model year valid range
    pub year_range: (f64, f64),
    /// Odometer valid range (km)
    pub mileage_range: (f64, f64),
    /// Engine displacement valid range (litres, 0 for electric)
    pub engine_size_range: (f64, f64),
    /// Power valid range (hp)
    pub horsepower_range: (f64, f64),
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            year_range: (1900.0, 2100.0),
            mileage_range: (0.0, 2_000_000.0),
            engine_size_range: (0.0, 10.0),
            horsepower_range: (0.0, 2000.0),
        }
    }
}

/// Validator for incoming car attributes
#[derive(Debug, Clone)]
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    /// Create a new validator with given config
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Check presence of every required field, then ranges, and build the
    /// typed record. The first failure is returned.
    pub fn validate(&self, raw: &RawCarFeatures) -> Result<CarFeatures, ValidationError> {
        let brand = Self::required_text("brand", &raw.brand)?;
        let model = Self::required_text("model", &raw.model)?;
        let year = Self::required_number("year", raw.year)?;
        let mileage = Self::required_number("mileage", raw.mileage)?;
        let fuel_type = Self::required_text("fuel_type", &raw.fuel_type)?;
        let transmission = Self::required_text("transmission", &raw.transmission)?;
        let engine_size = Self::required_number("engine_size", raw.engine_size)?;
        let horsepower = Self::required_number("horsepower", raw.horsepower)?;

        self.validate_range("year", year, self.config.year_range)?;
        self.validate_range("mileage", mileage, self.config.mileage_range)?;
        self.validate_range("engine_size", engine_size, self.config.engine_size_range)?;
        self.validate_range("horsepower", horsepower, self.config.horsepower_range)?;

        let features = CarFeatures {
            brand,
            model,
            year: Self::whole("year", year)? as i32,
            mileage: Self::whole("mileage", mileage)? as u32,
            fuel_type,
            transmission,
            engine_size,
            horsepower: Self::whole("horsepower", horsepower)? as u32,
        };
        debug!("Validated car features: {:?}", features);
        Ok(features)
    }

    /// Validate a single value against a range
    pub fn validate_range(
        &self,
        field: &'static str,
        value: f64,
        range: (f64, f64),
    ) -> Result<(), ValidationError> {
        if !value.is_finite() || value < range.0 || value > range.1 {
            Err(ValidationError::OutOfRange {
                field,
                value,
                min: range.0,
                max: range.1,
            })
        } else {
            Ok(())
        }
    }

    fn required_text(field: &'static str, value: &Option<String>) -> Result<String, ValidationError> {
        match value.as_deref().map(str::trim) {
            Some(v) if !v.is_empty() => Ok(v.to_string()),
            _ => Err(ValidationError::MissingField(field)),
        }
    }

    fn required_number(field: &'static str, value: Option<f64>) -> Result<f64, ValidationError> {
        value.ok_or(ValidationError::MissingField(field))
    }

    fn whole(field: &'static str, value: f64) -> Result<f64, ValidationError> {
        if value.fract() != 0.0 {
            return Err(ValidationError::InvalidFormat(format!(
                "{} must be a whole number, got {}",
                field, value
            )));
        }
        Ok(value)
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn camry() -> serde_json::Value {
        json!({
            "brand": "Toyota",
            "model": "Camry",
            "year": 2022,
            "mileage": 35000,
            "fuel_type": "Petrol",
            "transmission": "Automatic",
            "engine_size": 2.5,
            "horsepower": 203
        })
    }

    #[test]
    fn test_valid_request() {
        let raw = RawCarFeatures::from_json(camry()).unwrap();
        let features = Validator::default().validate(&raw).unwrap();
        assert_eq!(features.brand, "Toyota");
        assert_eq!(features.year, 2022);
        assert_eq!(features.mileage, 35_000);
        assert_eq!(features.horsepower, 203);
        assert_eq!(features.engine_size, 2.5);
    }

    #[test]
    fn test_each_missing_field_is_named() {
        let validator = Validator::default();
        for field in REQUIRED_FIELDS {
            let mut body = camry();
            body.as_object_mut().unwrap().remove(field);
            let raw = RawCarFeatures::from_json(body).unwrap();
            let err = validator.validate(&raw).unwrap_err();
            assert_eq!(err, ValidationError::MissingField(field));
            assert_eq!(err.to_string(), format!("Missing field: {}", field));
        }
    }

    #[test]
    fn test_blank_text_counts_as_missing() {
        let mut body = camry();
        body["transmission"] = json!("   ");
        let raw = RawCarFeatures::from_json(body).unwrap();
        assert_eq!(
            Validator::default().validate(&raw).unwrap_err(),
            ValidationError::MissingField("transmission")
        );
    }

    #[test]
    fn test_wrong_type_is_invalid_format() {
        let mut body = camry();
        body["year"] = json!("twenty-twenty");
        assert!(matches!(
            RawCarFeatures::from_json(body),
            Err(ValidationError::InvalidFormat(_))
        ));
        assert!(matches!(
            RawCarFeatures::from_json(json!([1, 2, 3])),
            Err(ValidationError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_out_of_range() {
        let mut body = camry();
        body["mileage"] = json!(-5);
        let raw = RawCarFeatures::from_json(body).unwrap();
        let err = Validator::default().validate(&raw).unwrap_err();
        assert_eq!(err.field(), Some("mileage"));
        assert!(matches!(err, ValidationError::OutOfRange { .. }));
    }

    #[test]
    fn test_fractional_year_rejected() {
        let mut body = camry();
        body["year"] = json!(2021.5);
        let raw = RawCarFeatures::from_json(body).unwrap();
        assert!(matches!(
            Validator::default().validate(&raw),
            Err(ValidationError::InvalidFormat(_))
        ));
    }

    proptest! {
        #[test]
        fn prop_typed_record_round_trips(
            year in 1990i32..2030,
            mileage in 0u32..500_000,
            hp in 1u32..1500,
            engine_tenths in 0u32..80,
        ) {
            let features = CarFeatures {
                brand: "Honda".to_string(),
                model: "City".to_string(),
                year,
                mileage,
                fuel_type: "Petrol".to_string(),
                transmission: "Manual".to_string(),
                engine_size: engine_tenths as f64 / 10.0,
                horsepower: hp,
            };
            let raw = RawCarFeatures::from(&features);
            prop_assert_eq!(Validator::default().validate(&raw).unwrap(), features);
        }
    }
}
