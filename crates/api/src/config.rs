//! Service Configuration
//!
//! Built-in defaults, then an optional TOML file, then `CAR_PRICE__*`
//! environment variables (for example `CAR_PRICE__BIND_ADDR=127.0.0.1:8080`).

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "car-price";

/// Environment variable prefix
pub const ENV_PREFIX: &str = "CAR_PRICE";

/// Runtime configuration of the price service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Socket address the HTTP server binds to
    pub bind_addr: String,
    /// CSV dataset backing the listing endpoints and retraining
    pub data_path: PathBuf,
    /// Model artifact location
    pub model_path: PathBuf,
    /// trace, debug, info, warn or error
    pub log_level: String,
    /// Default result count of the similar-cars search
    pub similar_cars_limit: usize,
    /// Upper bound on a requested similar-cars limit
    pub max_similar_cars: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:5000".to_string(),
            data_path: PathBuf::from("car_data.csv"),
            model_path: PathBuf::from("car_price_model.bin"),
            log_level: "info".to_string(),
            similar_cars_limit: 20,
            max_similar_cars: 500,
        }
    }
}

impl ServiceConfig {
    /// Load configuration. An explicit `path` must exist; without one the
    /// default `car-price.toml` is used when present.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        Config::builder()
            .add_source(Config::try_from(&Self::default())?)
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.similar_cars_limit, 20);
        assert_eq!(config.log_level, "info");
        assert!(config.similar_cars_limit <= config.max_similar_cars);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("service.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "bind_addr = \"127.0.0.1:9000\"").unwrap();
        writeln!(file, "similar_cars_limit = 5").unwrap();

        let config = ServiceConfig::load(Some(&path)).unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:9000");
        assert_eq!(config.similar_cars_limit, 5);
        // Untouched keys keep their defaults
        assert_eq!(config.model_path, PathBuf::from("car_price_model.bin"));
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ServiceConfig::load(Some(&dir.path().join("absent.toml"))).is_err());
    }
}
