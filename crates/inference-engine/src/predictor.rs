//! Price Predictor
//!
//! Train, evaluate, predict, and persist the car price model.

use crate::artifact::{ModelArtifact, TrainingReport};
use crate::forest::{ForestConfig, RandomForest};
use crate::metrics::{mean_absolute_error, r2_score};
use crate::split::train_test_split;
use crate::EstimatorError;
use chrono::{DateTime, Utc};
use dataset::{CarFeatures, CarRecord};
use feature_engine::FeatureEncoder;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;
use storage::{ArtifactStore, FsArtifactStore};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Minimum rows needed to hold out a test partition
pub const MIN_TRAINING_ROWS: usize = 2;

/// Training configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictorConfig {
    pub forest: ForestConfig,
    /// Share of rows held out for evaluation
    pub test_ratio: f64,
    /// Seed for the train/test shuffle
    pub split_seed: u64,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            forest: ForestConfig::default(),
            test_ratio: 0.2,
            split_seed: 42,
        }
    }
}

/// Car price predictor. Untrained until [`train`](Self::train) or
/// [`load`](Self::load) succeeds.
#[derive(Debug, Clone, Default)]
pub struct PricePredictor {
    config: PredictorConfig,
    artifact: Option<ModelArtifact>,
}

impl PricePredictor {
    pub fn new(config: PredictorConfig) -> Self {
        Self {
            config,
            artifact: None,
        }
    }

    /// Fit encoder and forest on a seeded training partition and evaluate on
    /// the held-out rows. Replaces any previous model only on success.
    pub fn train(&mut self, records: &[CarRecord]) -> Result<TrainingReport, EstimatorError> {
        if records.len() < MIN_TRAINING_ROWS {
            return Err(EstimatorError::InsufficientData {
                required: MIN_TRAINING_ROWS,
                actual: records.len(),
            });
        }

        if let Some(pos) = records.iter().position(|r| !r.is_finite()) {
            return Err(EstimatorError::InvalidTrainingData(format!(
                "record {} has a non-finite price or engine size",
                pos
            )));
        }

        let start = Instant::now();
        let (train_idx, test_idx) =
            train_test_split(records.len(), self.config.test_ratio, self.config.split_seed);
        let train: Vec<&CarRecord> = train_idx.iter().map(|&i| &records[i]).collect();
        let test: Vec<&CarRecord> = test_idx.iter().map(|&i| &records[i]).collect();

        info!(
            "Training price model on {} rows ({} held out, {} trees)",
            train.len(),
            test.len(),
            self.config.forest.n_trees
        );

        // Encoder sees the training partition only
        let encoder = FeatureEncoder::fit(train.iter().map(|r| &r.features))?;
        let x_train: Vec<Vec<f64>> = encoder
            .transform_batch(train.iter().map(|r| &r.features))
            .into_iter()
            .map(|v| v.values)
            .collect();
        let y_train: Vec<f64> = train.iter().map(|r| r.price).collect();

        let mut forest = RandomForest::new(self.config.forest.clone());
        forest.fit(&x_train, &y_train)?;

        let y_test: Vec<f64> = test.iter().map(|r| r.price).collect();
        let x_test: Vec<Vec<f64>> = encoder
            .transform_batch(test.iter().map(|r| &r.features))
            .into_iter()
            .map(|v| v.values)
            .collect();
        let y_pred = forest.predict(&x_test);

        let r_squared = r2_score(&y_test, &y_pred);
        let report = TrainingReport {
            mae: mean_absolute_error(&y_test, &y_pred),
            r_squared,
            accuracy_percent: r_squared * 100.0,
            train_rows: train.len(),
            test_rows: test.len(),
        };

        let artifact = ModelArtifact::new(encoder, forest, report.clone());
        info!(
            "Trained model {} in {:.1}s: MAE {:.2}, R² {:.4}, accuracy {:.2}%",
            artifact.model_id,
            start.elapsed().as_secs_f64(),
            report.mae,
            report.r_squared,
            report.accuracy_percent
        );
        self.artifact = Some(artifact);

        Ok(report)
    }

    /// Predict the price of one car. Never negative.
    pub fn predict(&self, features: &CarFeatures) -> Result<f64, EstimatorError> {
        let artifact = self.artifact.as_ref().ok_or(EstimatorError::ModelNotTrained)?;
        let vector = artifact.encoder.transform(features);
        let price = artifact.forest.predict_one(&vector.values).max(0.0);
        debug!("Predicted {:.0} for {} {} {}", price, features.year, features.brand, features.model);
        Ok(price)
    }

    pub fn is_trained(&self) -> bool {
        self.artifact.is_some()
    }

    /// `(mae, r_squared, accuracy_percent)` of the current model
    pub fn metrics(&self) -> Option<(f64, f64, f64)> {
        self.report()
            .map(|r| (r.mae, r.r_squared, r.accuracy_percent))
    }

    pub fn report(&self) -> Option<&TrainingReport> {
        self.artifact.as_ref().map(|a| &a.report)
    }

    pub fn model_id(&self) -> Option<Uuid> {
        self.artifact.as_ref().map(|a| a.model_id)
    }

    pub fn trained_at(&self) -> Option<DateTime<Utc>> {
        self.artifact.as_ref().map(|a| a.trained_at)
    }

    pub fn artifact(&self) -> Option<&ModelArtifact> {
        self.artifact.as_ref()
    }

    /// Feature name to normalized importance
    pub fn feature_importance(&self) -> Option<&BTreeMap<String, f64>> {
        self.artifact.as_ref().map(|a| &a.feature_importance)
    }

    /// Feature importances, most important first
    pub fn importance_ranking(&self) -> Vec<(String, f64)> {
        let mut ranking: Vec<(String, f64)> = self
            .feature_importance()
            .map(|m| m.iter().map(|(k, v)| (k.clone(), *v)).collect())
            .unwrap_or_default();
        ranking.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranking
    }

    /// Persist the model to a file path
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), EstimatorError> {
        let (store, key) = FsArtifactStore::locate(path)?;
        self.save_to(&store, &key)
    }

    /// Persist the model under `key` in any artifact store
    pub fn save_to(&self, store: &dyn ArtifactStore, key: &str) -> Result<(), EstimatorError> {
        let artifact = self.artifact.as_ref().ok_or(EstimatorError::ModelNotTrained)?;
        let bytes = artifact.to_bytes()?;
        store.put(key, &bytes)?;
        info!("Saved model {} as {}", artifact.model_id, key);
        Ok(())
    }

    /// Restore a model from a file path. Returns false, leaving the current
    /// model in place, if anything about the artifact is wrong.
    pub fn load(&mut self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        match FsArtifactStore::locate(path) {
            Ok((store, key)) => self.load_from(&store, &key),
            Err(e) => {
                warn!("Cannot load model from {}: {}", path.display(), e);
                false
            }
        }
    }

    /// Restore a model from any artifact store
    pub fn load_from(&mut self, store: &dyn ArtifactStore, key: &str) -> bool {
        let loaded = store
            .get(key)
            .map_err(EstimatorError::from)
            .and_then(|bytes| ModelArtifact::from_bytes(&bytes));

        match loaded {
            Ok(artifact) => {
                info!(
                    "Loaded model {} (trained {}, {} trees)",
                    artifact.model_id,
                    artifact.trained_at,
                    artifact.forest.n_trees()
                );
                self.artifact = Some(artifact);
                true
            }
            Err(e) => {
                warn!("Model artifact {} not loaded: {}", key, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dataset::SyntheticGenerator;
    use proptest::prelude::*;
    use std::sync::OnceLock;
    use storage::MemoryArtifactStore;
    use tempfile::tempdir;

    fn quick_config() -> PredictorConfig {
        PredictorConfig {
            forest: ForestConfig {
                n_trees: 8,
                max_depth: 10,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn trained() -> &'static PricePredictor {
        static PREDICTOR: OnceLock<PricePredictor> = OnceLock::new();
        PREDICTOR.get_or_init(|| {
            let records = SyntheticGenerator::new(42).generate(400);
            let mut predictor = PricePredictor::new(quick_config());
            predictor.train(&records).unwrap();
            predictor
        })
    }

    fn camry() -> CarFeatures {
        CarFeatures {
            brand: "Toyota".to_string(),
            model: "Camry".to_string(),
            year: 2022,
            mileage: 15_000,
            fuel_type: "Petrol".to_string(),
            transmission: "Automatic".to_string(),
            engine_size: 2.5,
            horsepower: 203,
        }
    }

    #[test]
    fn test_untrained_predict_fails() {
        let predictor = PricePredictor::default();
        assert!(!predictor.is_trained());
        assert!(matches!(
            predictor.predict(&camry()),
            Err(EstimatorError::ModelNotTrained)
        ));
        assert!(predictor.metrics().is_none());
        assert!(predictor.importance_ranking().is_empty());
    }

    #[test]
    fn test_insufficient_data() {
        let records = SyntheticGenerator::new(1).generate(1);
        let mut predictor = PricePredictor::new(quick_config());
        assert!(matches!(
            predictor.train(&records),
            Err(EstimatorError::InsufficientData { required: 2, actual: 1 })
        ));
        assert!(!predictor.is_trained());
    }

    #[test]
    fn test_non_finite_records_rejected() {
        let mut records = SyntheticGenerator::new(5).generate(50);
        records[17].price = f64::NAN;
        let mut predictor = PricePredictor::new(quick_config());
        assert!(matches!(
            predictor.train(&records),
            Err(EstimatorError::InvalidTrainingData(_))
        ));
        assert!(!predictor.is_trained());

        records[17].price = 1_000_000.0;
        records[3].features.engine_size = f64::INFINITY;
        assert!(matches!(
            predictor.train(&records),
            Err(EstimatorError::InvalidTrainingData(_))
        ));

        records[3].features.engine_size = 1.5;
        let report = predictor.train(&records).unwrap();
        assert!(report.mae.is_finite() && report.r_squared.is_finite());
    }

    #[test]
    fn test_two_rows_train() {
        let records = SyntheticGenerator::new(3).generate(2);
        let mut predictor = PricePredictor::new(quick_config());
        let report = predictor.train(&records).unwrap();
        assert_eq!((report.train_rows, report.test_rows), (1, 1));
        assert!(predictor.predict(&camry()).unwrap() >= 0.0);
    }

    #[test]
    fn test_train_reports_metrics() {
        let predictor = trained();
        let report = predictor.report().unwrap();
        assert_eq!(report.train_rows + report.test_rows, 400);
        assert_eq!(report.test_rows, 80);
        assert_eq!(report.accuracy_percent, report.r_squared * 100.0);

        let (mae, r2, accuracy) = predictor.metrics().unwrap();
        assert_eq!(mae, report.mae);
        assert_eq!(r2, report.r_squared);
        assert_eq!(accuracy, report.accuracy_percent);
    }

    #[test]
    fn test_importance_ranking_sorted() {
        let ranking = trained().importance_ranking();
        assert_eq!(ranking.len(), 8);
        assert!(ranking.windows(2).all(|w| w[0].1 >= w[1].1));
        let sum: f64 = ranking.iter().map(|(_, v)| v).sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_unseen_category_still_predicts() {
        let mut query = camry();
        query.brand = "Lada".to_string();
        query.model = "Niva".to_string();
        query.fuel_type = "Hydrogen".to_string();
        let price = trained().predict(&query).unwrap();
        assert!(price.is_finite());
        assert!(price >= 0.0);
    }

    #[test]
    fn test_save_load_identical_predictions() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.bin");
        let original = trained();
        original.save(&path).unwrap();

        let mut restored = PricePredictor::default();
        assert!(restored.load(&path));
        assert_eq!(restored.model_id(), original.model_id());

        for record in SyntheticGenerator::new(99).generate(25) {
            let a = original.predict(&record.features).unwrap();
            let b = restored.predict(&record.features).unwrap();
            assert_eq!(a.to_bits(), b.to_bits());
        }
    }

    #[test]
    fn test_load_missing_or_corrupt() {
        let dir = tempdir().unwrap();
        let mut predictor = PricePredictor::default();
        assert!(!predictor.load(dir.path().join("absent.bin")));

        let corrupt = dir.path().join("corrupt.bin");
        std::fs::write(&corrupt, b"\x01\x02garbage").unwrap();
        assert!(!predictor.load(&corrupt));
        assert!(!predictor.is_trained());
    }

    #[test]
    fn test_failed_load_keeps_current_model() {
        let store = MemoryArtifactStore::new();
        store.put("bad", b"garbage").unwrap();

        let mut predictor = trained().clone();
        let id = predictor.model_id();
        assert!(!predictor.load_from(&store, "bad"));
        assert_eq!(predictor.model_id(), id);
        assert!(predictor.is_trained());
    }

    #[test]
    fn test_save_untrained_fails() {
        let store = MemoryArtifactStore::new();
        let predictor = PricePredictor::default();
        assert!(matches!(
            predictor.save_to(&store, "model"),
            Err(EstimatorError::ModelNotTrained)
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryArtifactStore::new();
        trained().save_to(&store, "model").unwrap();
        let mut restored = PricePredictor::default();
        assert!(restored.load_from(&store, "model"));
        assert_eq!(
            restored.predict(&camry()).unwrap().to_bits(),
            trained().predict(&camry()).unwrap().to_bits()
        );
    }

    #[test]
    fn test_synthetic_dataset_quality() {
        let records = SyntheticGenerator::new(42).generate(5000);
        let mean_price = records.iter().map(|r| r.price).sum::<f64>() / records.len() as f64;

        let mut predictor = PricePredictor::new(PredictorConfig {
            forest: ForestConfig {
                n_trees: 20,
                ..Default::default()
            },
            ..Default::default()
        });
        let report = predictor.train(&records).unwrap();
        assert!(report.r_squared > 0.0, "R² {}", report.r_squared);
        assert!(report.mae < 0.5 * mean_price, "MAE {} vs mean {}", report.mae, mean_price);

        let query = CarFeatures {
            brand: "Toyota".to_string(),
            model: "Camry".to_string(),
            year: 2022,
            mileage: 35000,
            fuel_type: "Petrol".to_string(),
            transmission: "Automatic".to_string(),
            engine_size: 2.5,
            horsepower: 203,
        };
        let price = predictor.predict(&query).unwrap();
        assert!(price.is_finite() && price > 0.0);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_prediction_non_negative(
            year in 1990i32..2030,
            mileage in 0u32..500_000,
            engine in 0.5f64..6.0,
            hp in 40u32..800,
            automatic in any::<bool>(),
        ) {
            let query = CarFeatures {
                year,
                mileage,
                engine_size: engine,
                horsepower: hp,
                transmission: if automatic { "Automatic" } else { "Manual" }.to_string(),
                ..camry()
            };
            let price = trained().predict(&query).unwrap();
            prop_assert!(price >= 0.0);
            prop_assert!(price.is_finite());
        }
    }
}
