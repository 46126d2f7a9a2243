//! CART decision tree used by the forest backend
//!
//! Classification only, gini impurity, midpoint thresholds. When
//! `max_features` is set, each split considers a fresh random subset of
//! candidate features drawn from the tree's seeded RNG.

use crate::error::{Result, SpambenchError};
use ndarray::{Array1, Array2};
use rand::seq::index::sample;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Decision tree node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    /// Leaf with the majority class and positive-class fraction
    Leaf {
        value: f64,
        positive_fraction: f64,
        n_samples: usize,
    },
    /// Internal split node
    Split {
        feature_idx: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
        n_samples: usize,
    },
}

/// CART classifier tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    root: Option<TreeNode>,
    /// Maximum depth (unlimited when None)
    pub max_depth: Option<usize>,
    /// Minimum samples to attempt a split
    pub min_samples_split: usize,
    /// Minimum samples in each leaf
    pub min_samples_leaf: usize,
    /// Candidate features per split (all when None)
    pub max_features: Option<usize>,
    /// Seed for the per-split feature subsets
    pub random_state: u64,
    n_features: usize,
    feature_importances: Option<Array1<f64>>,
}

impl Default for DecisionTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionTree {
    pub fn new() -> Self {
        Self {
            root: None,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            random_state: 42,
            n_features: 0,
            feature_importances: None,
        }
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples;
        self
    }

    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = Some(max_features);
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    /// Fit the tree. `y` must be 0/1 coded.
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        let n_samples = x.nrows();
        let n_features = x.ncols();

        if n_samples != y.len() {
            return Err(SpambenchError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if n_samples == 0 {
            return Err(SpambenchError::ValidationError(
                "cannot fit a tree on zero samples".to_string(),
            ));
        }

        self.n_features = n_features;

        let mut rng = ChaCha8Rng::seed_from_u64(self.random_state);
        let mut importances = vec![0.0; n_features];
        let indices: Vec<usize> = (0..n_samples).collect();
        self.root = Some(self.build_tree(x, y, &indices, 0, &mut importances, &mut rng));

        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            for imp in &mut importances {
                *imp /= total;
            }
        }
        self.feature_importances = Some(Array1::from_vec(importances));

        Ok(self)
    }

    fn build_tree(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
        depth: usize,
        importances: &mut [f64],
        rng: &mut ChaCha8Rng,
    ) -> TreeNode {
        let n_samples = indices.len();
        let positives = indices.iter().filter(|&&i| y[i] > 0.5).count();

        let should_stop = n_samples < self.min_samples_split
            || self.max_depth.is_some_and(|d| depth >= d)
            || positives == 0
            || positives == n_samples;

        if should_stop {
            return Self::leaf(positives, n_samples);
        }

        let Some((best_feature, best_threshold, best_gain)) =
            self.find_best_split(x, y, indices, rng)
        else {
            return Self::leaf(positives, n_samples);
        };

        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| x[[i, best_feature]] <= best_threshold);

        if left_indices.len() < self.min_samples_leaf
            || right_indices.len() < self.min_samples_leaf
        {
            return Self::leaf(positives, n_samples);
        }

        importances[best_feature] += n_samples as f64 * best_gain;

        let left = Box::new(self.build_tree(x, y, &left_indices, depth + 1, importances, rng));
        let right = Box::new(self.build_tree(x, y, &right_indices, depth + 1, importances, rng));

        TreeNode::Split {
            feature_idx: best_feature,
            threshold: best_threshold,
            left,
            right,
            n_samples,
        }
    }

    fn leaf(positives: usize, n_samples: usize) -> TreeNode {
        let fraction = positives as f64 / n_samples.max(1) as f64;
        TreeNode::Leaf {
            value: if fraction >= 0.5 { 1.0 } else { 0.0 },
            positive_fraction: fraction,
            n_samples,
        }
    }

    /// Scan candidate features for the split with the largest gini gain
    fn find_best_split(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
        rng: &mut ChaCha8Rng,
    ) -> Option<(usize, f64, f64)> {
        let n_features = x.ncols();
        let candidates: Vec<usize> = match self.max_features {
            Some(m) if m < n_features => {
                let mut picked = sample(rng, n_features, m).into_vec();
                picked.sort_unstable();
                picked
            }
            _ => (0..n_features).collect(),
        };

        let n = indices.len();
        let total_pos = indices.iter().filter(|&&i| y[i] > 0.5).count();
        let parent_impurity = Self::gini(total_pos, n);

        let mut best: Option<(usize, f64, f64)> = None;

        for &feature_idx in &candidates {
            // Sort samples by this feature so each midpoint is scanned once
            let mut order: Vec<usize> = indices.to_vec();
            order.sort_by(|&a, &b| {
                x[[a, feature_idx]]
                    .partial_cmp(&x[[b, feature_idx]])
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

            let mut left_count = 0usize;
            let mut left_pos = 0usize;

            for w in 0..n - 1 {
                let idx = order[w];
                left_count += 1;
                if y[idx] > 0.5 {
                    left_pos += 1;
                }

                let lo = x[[order[w], feature_idx]];
                let hi = x[[order[w + 1], feature_idx]];
                if lo == hi {
                    continue;
                }

                let right_count = n - left_count;
                if left_count < self.min_samples_leaf || right_count < self.min_samples_leaf {
                    continue;
                }

                let right_pos = total_pos - left_pos;
                let weighted = (left_count as f64 * Self::gini(left_pos, left_count)
                    + right_count as f64 * Self::gini(right_pos, right_count))
                    / n as f64;
                let gain = parent_impurity - weighted;

                if gain > 0.0 && best.map_or(true, |(_, _, g)| gain > g) {
                    best = Some((feature_idx, (lo + hi) / 2.0, gain));
                }
            }
        }

        best
    }

    fn gini(positives: usize, count: usize) -> f64 {
        if count == 0 {
            return 0.0;
        }
        let p = positives as f64 / count as f64;
        2.0 * p * (1.0 - p)
    }

    /// Predict class labels
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        self.traverse(x, |leaf| match leaf {
            TreeNode::Leaf { value, .. } => *value,
            _ => unreachable!(),
        })
    }

    /// Predict the positive-class fraction of each row's leaf
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        self.traverse(x, |leaf| match leaf {
            TreeNode::Leaf {
                positive_fraction, ..
            } => *positive_fraction,
            _ => unreachable!(),
        })
    }

    fn traverse<F: Fn(&TreeNode) -> f64>(&self, x: &Array2<f64>, extract: F) -> Result<Array1<f64>> {
        let root = self.root.as_ref().ok_or(SpambenchError::ModelNotFitted)?;

        if x.ncols() != self.n_features {
            return Err(SpambenchError::ColumnMismatch {
                expected: self.n_features,
                actual: x.ncols(),
            });
        }

        let values: Vec<f64> = (0..x.nrows())
            .map(|i| {
                let mut node = root;
                loop {
                    match node {
                        TreeNode::Leaf { .. } => return extract(node),
                        TreeNode::Split {
                            feature_idx,
                            threshold,
                            left,
                            right,
                            ..
                        } => {
                            node = if x[[i, *feature_idx]] <= *threshold {
                                left
                            } else {
                                right
                            };
                        }
                    }
                }
            })
            .collect();

        Ok(Array1::from_vec(values))
    }

    /// Normalized impurity-decrease importances
    pub fn feature_importances(&self) -> Option<&Array1<f64>> {
        self.feature_importances.as_ref()
    }

    pub fn depth(&self) -> usize {
        fn node_depth(node: &TreeNode) -> usize {
            match node {
                TreeNode::Leaf { .. } => 1,
                TreeNode::Split { left, right, .. } => 1 + node_depth(left).max(node_depth(right)),
            }
        }
        self.root.as_ref().map_or(0, node_depth)
    }
}
