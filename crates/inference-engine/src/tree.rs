//! Regression Tree
//!
//! CART regression tree grown on squared error. Candidate thresholds are the
//! midpoints between consecutive distinct values of a feature; each feature is
//! scanned once per node over its sorted values with running sums.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// Regression tree configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Maximum depth of tree
    pub max_depth: usize,
    /// Minimum samples required to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf node
    pub min_samples_leaf: usize,
    /// Maximum features to consider for split (None = all)
    pub max_features: Option<usize>,
    /// Random seed for feature sub-sampling
    pub seed: u64,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: 15,
            min_samples_split: 5,
            min_samples_leaf: 2,
            max_features: None,
            seed: 42,
        }
    }
}

/// Tree node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TreeNode {
    Leaf {
        /// Mean label of the samples reaching this leaf
        value: f64,
        n_samples: usize,
    },
    Split {
        feature: usize,
        /// Samples with `x[feature] <= threshold` go left
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

impl TreeNode {
    /// Walk the tree for one sample
    pub fn predict(&self, features: &[f64]) -> f64 {
        let mut node = self;
        loop {
            match node {
                TreeNode::Leaf { value, .. } => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let x = features.get(*feature).copied().unwrap_or(f64::NAN);
                    node = if x <= *threshold { left } else { right };
                }
            }
        }
    }

    pub fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    pub fn n_leaves(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Split { left, right, .. } => left.n_leaves() + right.n_leaves(),
        }
    }

    fn max_feature_index(&self) -> Option<usize> {
        match self {
            TreeNode::Leaf { .. } => None,
            TreeNode::Split {
                feature, left, right, ..
            } => [Some(*feature), left.max_feature_index(), right.max_feature_index()]
                .into_iter()
                .flatten()
                .max(),
        }
    }
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    gain: f64,
}

/// Regression tree model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    config: TreeConfig,
    root: Option<TreeNode>,
    n_features: usize,
    feature_importances: Vec<f64>,
}

impl RegressionTree {
    /// Create a new, unfitted tree
    pub fn new(config: TreeConfig) -> Self {
        Self {
            config,
            root: None,
            n_features: 0,
            feature_importances: Vec::new(),
        }
    }

    /// Grow the tree on the rows of `features` selected by `indices`.
    ///
    /// `indices` may repeat rows (bootstrap samples).
    pub fn fit(&mut self, features: &[Vec<f64>], labels: &[f64], indices: &[usize]) {
        self.n_features = features.first().map(|row| row.len()).unwrap_or(0);
        self.feature_importances = vec![0.0; self.n_features];

        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let root = self.build(features, labels, indices.to_vec(), 0, &mut rng);
        self.root = Some(root);

        // Normalize feature importances
        let sum: f64 = self.feature_importances.iter().sum();
        if sum > 0.0 {
            for imp in &mut self.feature_importances {
                *imp /= sum;
            }
        }
    }

    fn build(
        &mut self,
        features: &[Vec<f64>],
        labels: &[f64],
        indices: Vec<usize>,
        depth: usize,
        rng: &mut StdRng,
    ) -> TreeNode {
        let n = indices.len();
        let mean = if n == 0 {
            0.0
        } else {
            indices.iter().map(|&i| labels[i]).sum::<f64>() / n as f64
        };
        let sse: f64 = indices.iter().map(|&i| (labels[i] - mean).powi(2)).sum();

        // Check stopping conditions
        if depth >= self.config.max_depth
            || n < self.config.min_samples_split
            || n < 2 * self.config.min_samples_leaf.max(1)
            || sse <= f64::EPSILON * n as f64
        {
            return TreeNode::Leaf { value: mean, n_samples: n };
        }

        let Some(best) = self.find_best_split(features, labels, &indices, mean, sse, rng) else {
            return TreeNode::Leaf { value: mean, n_samples: n };
        };

        let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| features[i][best.feature] <= best.threshold);
        if left_idx.is_empty() || right_idx.is_empty() {
            return TreeNode::Leaf { value: mean, n_samples: n };
        }

        // Update feature importance (weighted impurity decrease)
        self.feature_importances[best.feature] += best.gain;

        let left = self.build(features, labels, left_idx, depth + 1, rng);
        let right = self.build(features, labels, right_idx, depth + 1, rng);

        TreeNode::Split {
            feature: best.feature,
            threshold: best.threshold,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Find the split with the largest reduction in squared error
    fn find_best_split(
        &self,
        features: &[Vec<f64>],
        labels: &[f64],
        indices: &[usize],
        mean: f64,
        parent_sse: f64,
        rng: &mut StdRng,
    ) -> Option<BestSplit> {
        let n = indices.len();
        let min_leaf = self.config.min_samples_leaf.max(1);
        let max_features = self
            .config
            .max_features
            .unwrap_or(self.n_features)
            .clamp(1, self.n_features.max(1));

        // Select features to consider
        let mut feature_indices: Vec<usize> = (0..self.n_features).collect();
        feature_indices.shuffle(rng);
        feature_indices.truncate(max_features);

        let mut best: Option<BestSplit> = None;
        let mut sorted = indices.to_vec();

        for &feature in &feature_indices {
            sorted.sort_by(|&a, &b| features[a][feature].total_cmp(&features[b][feature]));

            // Labels centred on the node mean keep the running sums small
            let total: f64 = sorted.iter().map(|&i| labels[i] - mean).sum();
            let total_sq: f64 = sorted.iter().map(|&i| (labels[i] - mean).powi(2)).sum();

            let mut left_sum = 0.0;
            let mut left_sq = 0.0;

            for pos in 0..n - 1 {
                let y = labels[sorted[pos]] - mean;
                left_sum += y;
                left_sq += y * y;

                let n_left = pos + 1;
                let n_right = n - n_left;
                if n_left < min_leaf {
                    continue;
                }
                if n_right < min_leaf {
                    break;
                }

                let value = features[sorted[pos]][feature];
                let next = features[sorted[pos + 1]][feature];
                if value == next {
                    continue;
                }

                let right_sum = total - left_sum;
                let right_sq = total_sq - left_sq;
                let left_sse = (left_sq - left_sum * left_sum / n_left as f64).max(0.0);
                let right_sse = (right_sq - right_sum * right_sum / n_right as f64).max(0.0);
                let gain = parent_sse - left_sse - right_sse;

                if gain > best.as_ref().map_or(0.0, |b| b.gain) {
                    best = Some(BestSplit {
                        feature,
                        threshold: value + (next - value) / 2.0,
                        gain,
                    });
                }
            }
        }

        best
    }

    /// Predict for a single sample
    pub fn predict_one(&self, features: &[f64]) -> f64 {
        match &self.root {
            Some(node) => node.predict(features),
            None => 0.0,
        }
    }

    /// Normalized feature importances
    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn root(&self) -> Option<&TreeNode> {
        self.root.as_ref()
    }

    /// Structural sanity check for trees restored from storage
    pub fn is_consistent(&self) -> bool {
        match &self.root {
            None => false,
            Some(root) => {
                self.feature_importances.len() == self.n_features
                    && root.max_feature_index().map_or(true, |f| f < self.n_features)
            }
        }
    }
}
