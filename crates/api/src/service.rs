//! Price Service
//!
//! Owns the current predictor and swaps it wholesale on retrain or reload.
//! Readers clone the `Arc` and predict without holding the lock.

use dataset::{CarFeatures, CarRecord};
use fallback::FallbackEstimator;
use inference_engine::{EstimatorError, PredictorConfig, PricePredictor, TrainingReport};
use metrics::{counter, histogram};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

/// Where an estimate came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceSource {
    Model,
    Fallback,
}

impl PriceSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceSource::Model => "model",
            PriceSource::Fallback => "fallback",
        }
    }
}

/// A served price estimate
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Estimate {
    pub price: f64,
    pub source: PriceSource,
}

/// Snapshot of the loaded model for health and admin responses
#[derive(Debug, Clone, Serialize)]
pub struct ModelStatus {
    pub loaded: bool,
    pub model_id: Option<String>,
    pub trained_at: Option<String>,
    pub metrics: Option<TrainingReport>,
}

/// Errors from model lifecycle operations
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Estimator(#[from] EstimatorError),
    #[error("Training task failed: {0}")]
    Task(String),
    #[error("Model artifact at {0} could not be loaded")]
    LoadFailed(String),
}

pub struct PriceService {
    predictor: RwLock<Option<Arc<PricePredictor>>>,
    /// Held across disk write and swap so the file always holds the served model
    update: Mutex<()>,
    fallback: FallbackEstimator,
    predictor_config: PredictorConfig,
    model_path: PathBuf,
}

impl PriceService {
    pub fn new(model_path: impl Into<PathBuf>, predictor_config: PredictorConfig) -> Self {
        Self {
            predictor: RwLock::new(None),
            update: Mutex::new(()),
            fallback: FallbackEstimator::default(),
            predictor_config,
            model_path: model_path.into(),
        }
    }

    /// Current predictor, if any
    pub async fn current(&self) -> Option<Arc<PricePredictor>> {
        self.predictor.read().await.clone()
    }

    /// Replace the current predictor
    pub async fn install(&self, predictor: PricePredictor) {
        let model_id = predictor.model_id();
        *self.predictor.write().await = Some(Arc::new(predictor));
        info!("Installed model {:?}", model_id);
    }

    /// Estimate a price with the trained model, or the fallback heuristic when
    /// no model is loaded
    pub async fn estimate(&self, features: &CarFeatures) -> Estimate {
        let start = Instant::now();

        let estimate = match self.current().await {
            Some(predictor) => match predictor.predict(features) {
                Ok(price) => Estimate {
                    price,
                    source: PriceSource::Model,
                },
                Err(e) => {
                    warn!("Model prediction failed, using fallback: {}", e);
                    self.fallback_estimate(features)
                }
            },
            None => self.fallback_estimate(features),
        };

        counter!("price_predictions_total", "source" => estimate.source.as_str()).increment(1);
        histogram!("price_prediction_seconds").record(start.elapsed().as_secs_f64());
        estimate
    }

    fn fallback_estimate(&self, features: &CarFeatures) -> Estimate {
        let price = self.fallback.estimate(features, &mut rand::thread_rng());
        Estimate {
            price,
            source: PriceSource::Fallback,
        }
    }

    /// Load the artifact from `model_path`; the current model is kept on failure
    pub async fn reload(&self) -> Result<ModelStatus, ServiceError> {
        let _update = self.update.lock().await;
        let path = self.model_path.clone();
        let config = self.predictor_config.clone();

        let predictor = tokio::task::spawn_blocking(move || {
            let mut predictor = PricePredictor::new(config);
            predictor.load(&path).then_some(predictor)
        })
        .await
        .map_err(|e| ServiceError::Task(e.to_string()))?
        .ok_or_else(|| ServiceError::LoadFailed(self.model_path.display().to_string()))?;

        self.install(predictor).await;
        Ok(self.status().await)
    }

    /// Train on `records`, persist to `model_path`, then swap the new model in.
    /// Nothing is swapped if training or saving fails.
    pub async fn retrain(&self, records: Vec<CarRecord>) -> Result<TrainingReport, ServiceError> {
        let _update = self.update.lock().await;
        let path = self.model_path.clone();
        let config = self.predictor_config.clone();

        let (predictor, report) = tokio::task::spawn_blocking(move || {
            let mut predictor = PricePredictor::new(config);
            let report = predictor.train(&records)?;
            predictor.save(&path)?;
            Ok::<_, EstimatorError>((predictor, report))
        })
        .await
        .map_err(|e| ServiceError::Task(e.to_string()))??;

        counter!("model_retrains_total").increment(1);
        self.install(predictor).await;
        Ok(report)
    }

    /// Importances of the loaded model
    pub async fn feature_importance(&self) -> Option<BTreeMap<String, f64>> {
        self.current()
            .await
            .and_then(|p| p.feature_importance().cloned())
    }

    pub async fn status(&self) -> ModelStatus {
        match self.current().await {
            Some(predictor) => ModelStatus {
                loaded: true,
                model_id: predictor.model_id().map(|id| id.to_string()),
                trained_at: predictor.trained_at().map(|t| t.to_rfc3339()),
                metrics: predictor.report().cloned(),
            },
            None => ModelStatus {
                loaded: false,
                model_id: None,
                trained_at: None,
                metrics: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dataset::SyntheticGenerator;
    use inference_engine::ForestConfig;

    fn quick_config() -> PredictorConfig {
        PredictorConfig {
            forest: ForestConfig {
                n_trees: 5,
                max_depth: 8,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn swift() -> CarFeatures {
        CarFeatures {
            brand: "Maruti".to_string(),
            model: "Swift".to_string(),
            year: 2019,
            mileage: 42_000,
            fuel_type: "Petrol".to_string(),
            transmission: "Manual".to_string(),
            engine_size: 1.2,
            horsepower: 89,
        }
    }

    #[tokio::test]
    async fn test_fallback_without_model() {
        let dir = tempfile::tempdir().unwrap();
        let service = PriceService::new(dir.path().join("model.bin"), quick_config());

        let estimate = service.estimate(&swift()).await;
        assert_eq!(estimate.source, PriceSource::Fallback);
        assert!(estimate.price >= 300_000.0);
        assert!(!service.status().await.loaded);
    }

    #[tokio::test]
    async fn test_retrain_swaps_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.bin");
        let service = PriceService::new(&path, quick_config());

        let records = SyntheticGenerator::new(42).generate(200);
        let report = service.retrain(records).await.unwrap();
        assert_eq!(report.train_rows + report.test_rows, 200);
        assert!(path.is_file());

        let estimate = service.estimate(&swift()).await;
        assert_eq!(estimate.source, PriceSource::Model);
        assert!(estimate.price >= 0.0);
        assert_eq!(service.feature_importance().await.map(|m| m.len()), Some(8));

        // A second service picks the same model up from disk
        let other = PriceService::new(&path, quick_config());
        let status = other.reload().await.unwrap();
        assert!(status.loaded);
        assert_eq!(status.model_id, service.status().await.model_id);
        assert_eq!(other.estimate(&swift()).await.price, estimate.price);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_retrains_persist_served_model() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.bin");
        let service = Arc::new(PriceService::new(&path, quick_config()));

        let a = tokio::spawn({
            let service = service.clone();
            async move { service.retrain(SyntheticGenerator::new(7).generate(300)).await }
        });
        let b = tokio::spawn({
            let service = service.clone();
            async move { service.retrain(SyntheticGenerator::new(8).generate(120)).await }
        });
        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();

        // The artifact on disk is the one being served
        let served = service.status().await.model_id;
        let mut on_disk = PricePredictor::default();
        assert!(on_disk.load(&path));
        assert_eq!(on_disk.model_id().map(|id| id.to_string()), served);
        assert_eq!(on_disk.predict(&swift()).unwrap(), service.estimate(&swift()).await.price);
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_model() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.bin");
        let service = PriceService::new(&path, quick_config());
        service
            .retrain(SyntheticGenerator::new(1).generate(100))
            .await
            .unwrap();
        let before = service.status().await.model_id;

        std::fs::write(&path, b"corrupted").unwrap();
        assert!(matches!(service.reload().await, Err(ServiceError::LoadFailed(_))));
        assert_eq!(service.status().await.model_id, before);
    }

    #[tokio::test]
    async fn test_retrain_with_too_few_rows() {
        let dir = tempfile::tempdir().unwrap();
        let service = PriceService::new(dir.path().join("model.bin"), quick_config());
        let result = service.retrain(SyntheticGenerator::new(1).generate(1)).await;
        assert!(matches!(
            result,
            Err(ServiceError::Estimator(EstimatorError::InsufficientData { .. }))
        ));
        assert!(!service.status().await.loaded);
    }
}
