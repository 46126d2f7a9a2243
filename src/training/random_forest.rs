//! Random forest backend
//!
//! Bagged CART trees with per-split random feature subsets. Probabilities are
//! the fraction of trees voting for the positive class; importances average
//! the per-tree impurity decreases.

use crate::error::{Result, SpambenchError};
use crate::training::classifier::Classifier;
use crate::training::decision_tree::DecisionTree;
use ndarray::{Array1, Array2, Axis};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Hyperparameters for the forest backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    /// Ensemble size
    pub n_estimators: usize,
    /// Candidate features per split
    pub max_features: usize,
    /// Minimum samples per leaf
    pub min_samples_leaf: usize,
    /// Base seed; tree i uses `seed + i`
    pub random_state: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 300,
            max_features: 6,
            min_samples_leaf: 1,
            random_state: 42,
        }
    }
}

/// Bagged tree-ensemble classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    params: ForestParams,
    trees: Vec<DecisionTree>,
    feature_importances: Option<Array1<f64>>,
    n_features: usize,
}

impl RandomForest {
    pub fn new(params: ForestParams) -> Self {
        Self {
            params,
            trees: Vec::new(),
            feature_importances: None,
            n_features: 0,
        }
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    fn aggregate_importances(&mut self) {
        if self.trees.is_empty() {
            return;
        }

        let mut total = vec![0.0; self.n_features];
        for tree in &self.trees {
            if let Some(imp) = tree.feature_importances() {
                for (acc, &v) in total.iter_mut().zip(imp.iter()) {
                    *acc += v;
                }
            }
        }

        let sum: f64 = total.iter().sum();
        if sum > 0.0 {
            for v in &mut total {
                *v /= sum;
            }
        }
        self.feature_importances = Some(Array1::from_vec(total));
    }
}

impl Classifier for RandomForest {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        let n_samples = x.nrows();
        if n_samples != y.len() {
            return Err(SpambenchError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if self.params.n_estimators == 0 {
            return Err(SpambenchError::InvalidParameter {
                name: "n_estimators".to_string(),
                value: "0".to_string(),
                reason: "forest needs at least one tree".to_string(),
            });
        }

        self.n_features = x.ncols();
        let params = self.params.clone();

        let trees: Result<Vec<DecisionTree>> = (0..params.n_estimators)
            .into_par_iter()
            .map(|tree_idx| {
                let seed = params.random_state.wrapping_add(tree_idx as u64);
                let mut rng = ChaCha8Rng::seed_from_u64(seed);

                // Bootstrap sample with replacement
                let sample_indices: Vec<usize> = (0..n_samples)
                    .map(|_| (rng.next_u64() % n_samples as u64) as usize)
                    .collect();

                let x_boot = x.select(Axis(0), &sample_indices);
                let y_boot =
                    Array1::from_iter(sample_indices.iter().map(|&i| y[i]));

                let mut tree = DecisionTree::new()
                    .with_max_features(params.max_features)
                    .with_min_samples_leaf(params.min_samples_leaf)
                    .with_random_state(seed);
                tree.fit(&x_boot, &y_boot)?;
                Ok(tree)
            })
            .collect();

        self.trees = trees?;
        self.aggregate_importances();
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let proba = self.predict_proba(x)?;
        Ok(proba.mapv(|p| if p >= 0.5 { 1.0 } else { 0.0 }))
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if self.trees.is_empty() {
            return Err(SpambenchError::ModelNotFitted);
        }

        let votes: Result<Vec<Array1<f64>>> = self
            .trees
            .par_iter()
            .map(|tree| tree.predict(x))
            .collect();
        let votes = votes?;

        let n_trees = votes.len() as f64;
        let mut proba = Array1::zeros(x.nrows());
        for tree_votes in &votes {
            proba += tree_votes;
        }
        proba /= n_trees;
        Ok(proba)
    }

    fn feature_importances(&self) -> Option<Array1<f64>> {
        self.feature_importances.clone()
    }
}
