//! Random Forest Regressor
//!
//! Bagged ensemble of [`RegressionTree`]s. Trees are grown sequentially from a
//! single seeded generator, so a given configuration and dataset always yield
//! the same forest.

use crate::tree::{RegressionTree, TreeConfig};
use crate::EstimatorError;
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Random forest configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    /// Number of trees
    pub n_trees: usize,
    /// Maximum depth of each tree
    pub max_depth: usize,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    /// Max features per split (None = all)
    pub max_features: Option<usize>,
    /// Use bootstrap sampling
    pub bootstrap: bool,
    /// Random seed
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: 15,
            min_samples_split: 5,
            min_samples_leaf: 2,
            max_features: None,
            bootstrap: true,
            seed: 42,
        }
    }
}

/// Random forest regressor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    config: ForestConfig,
    trees: Vec<RegressionTree>,
    n_features: usize,
    feature_importances: Vec<f64>,
}

impl RandomForest {
    pub fn new(config: ForestConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            n_features: 0,
            feature_importances: Vec::new(),
        }
    }

    /// Fit the forest on row-major features
    pub fn fit(&mut self, features: &[Vec<f64>], labels: &[f64]) -> Result<(), EstimatorError> {
        let n_samples = features.len();
        if n_samples == 0 {
            return Err(EstimatorError::InsufficientData {
                required: 1,
                actual: 0,
            });
        }
        if labels.len() != n_samples {
            return Err(EstimatorError::InvalidTrainingData(format!(
                "{} feature rows but {} labels",
                n_samples,
                labels.len()
            )));
        }
        let n_features = features[0].len();
        if n_features == 0 || features.iter().any(|row| row.len() != n_features) {
            return Err(EstimatorError::InvalidTrainingData(
                "feature rows must share a non-zero width".to_string(),
            ));
        }
        if self.config.n_trees == 0 {
            return Err(EstimatorError::InvalidTrainingData(
                "forest needs at least one tree".to_string(),
            ));
        }

        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let mut trees = Vec::with_capacity(self.config.n_trees);

        for i in 0..self.config.n_trees {
            let indices: Vec<usize> = if self.config.bootstrap {
                (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect()
            } else {
                (0..n_samples).collect()
            };

            let tree_config = TreeConfig {
                max_depth: self.config.max_depth,
                min_samples_split: self.config.min_samples_split,
                min_samples_leaf: self.config.min_samples_leaf,
                max_features: self.config.max_features,
                seed: rng.gen(),
            };

            let mut tree = RegressionTree::new(tree_config);
            tree.fit(features, labels, &indices);
            debug!(
                "Grew tree {}/{} ({} leaves)",
                i + 1,
                self.config.n_trees,
                tree.root().map_or(0, |r| r.n_leaves())
            );
            trees.push(tree);
        }

        self.feature_importances = Self::average_importances(&trees, n_features);
        self.trees = trees;
        self.n_features = n_features;
        Ok(())
    }

    fn average_importances(trees: &[RegressionTree], n_features: usize) -> Vec<f64> {
        let mut importances = vec![0.0; n_features];
        for tree in trees {
            for (acc, &imp) in importances.iter_mut().zip(tree.feature_importances()) {
                *acc += imp;
            }
        }

        let sum: f64 = importances.iter().sum();
        if sum > 0.0 {
            for imp in &mut importances {
                *imp /= sum;
            }
        }
        importances
    }

    /// Mean of the tree predictions for one sample
    pub fn predict_one(&self, features: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.trees.iter().map(|t| t.predict_one(features)).sum();
        sum / self.trees.len() as f64
    }

    /// Predict for many samples
    pub fn predict(&self, features: &[Vec<f64>]) -> Vec<f64> {
        features.iter().map(|x| self.predict_one(x)).collect()
    }

    /// Averaged, normalized impurity-based importances
    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Structural sanity check for forests restored from storage
    pub fn is_consistent(&self) -> bool {
        !self.trees.is_empty()
            && self.feature_importances.len() == self.n_features
            && self
                .trees
                .iter()
                .all(|t| t.n_features() == self.n_features && t.is_consistent())
    }
}
