//! Stratified k-fold cross-validation

use crate::error::{Result, SpambenchError};
use ndarray::Array1;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Resampling protocol shared by every model in one run
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CvSpec {
    /// Number of folds
    pub folds: usize,
    /// Seed for the per-class shuffle
    pub seed: u64,
}

impl Default for CvSpec {
    fn default() -> Self {
        Self {
            folds: 5,
            seed: crate::config::DEFAULT_SEED,
        }
    }
}

/// One train/validation split of the training partition
#[derive(Debug, Clone)]
pub struct CvSplit {
    pub train_indices: Vec<usize>,
    pub validation_indices: Vec<usize>,
    pub fold_idx: usize,
}

/// Generate stratified folds: samples of each class are shuffled with a
/// seeded RNG and dealt round-robin across folds, so every fold tracks the
/// class proportions of the whole vector.
pub fn stratified_k_fold(y: &Array1<f64>, spec: &CvSpec) -> Result<Vec<CvSplit>> {
    if spec.folds < 2 {
        return Err(SpambenchError::ValidationError(format!(
            "cv_folds must be at least 2, got {}",
            spec.folds
        )));
    }

    let mut class_indices: Vec<(i64, Vec<usize>)> = Vec::new();
    for (idx, &val) in y.iter().enumerate() {
        let class = val.round() as i64;
        match class_indices.iter_mut().find(|(c, _)| *c == class) {
            Some((_, v)) => v.push(idx),
            None => class_indices.push((class, vec![idx])),
        }
    }
    class_indices.sort_by_key(|(c, _)| *c);

    for (class, indices) in &class_indices {
        if indices.len() < spec.folds {
            return Err(SpambenchError::ValidationError(format!(
                "class {} has {} rows, fewer than {} folds",
                class,
                indices.len(),
                spec.folds
            )));
        }
    }

    let mut rng = ChaCha8Rng::seed_from_u64(spec.seed);
    let mut folds: Vec<Vec<usize>> = vec![Vec::new(); spec.folds];
    for (_, mut indices) in class_indices {
        indices.shuffle(&mut rng);
        for (i, idx) in indices.into_iter().enumerate() {
            folds[i % spec.folds].push(idx);
        }
    }

    let splits = (0..spec.folds)
        .map(|fold_idx| {
            let validation_indices = folds[fold_idx].clone();
            let train_indices: Vec<usize> = folds
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != fold_idx)
                .flat_map(|(_, f)| f.iter().copied())
                .collect();
            CvSplit {
                train_indices,
                validation_indices,
                fold_idx,
            }
        })
        .collect();

    Ok(splits)
}
