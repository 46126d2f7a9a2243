//! Stratified train/holdout partitioning

use crate::data::dataset::{Dataset, Label};
use crate::error::{Result, SpambenchError};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

/// A disjoint train/holdout partition of one Dataset.
///
/// The row-index sets union to the full dataset and never intersect; class
/// proportions in `train` track the full dataset (stratified sampling).
#[derive(Debug, Clone)]
pub struct Split {
    pub train: Dataset,
    pub holdout: Dataset,
    pub train_indices: Vec<usize>,
    pub holdout_indices: Vec<usize>,
}

/// Sample each class independently at `fraction` into the training partition.
///
/// Identical (dataset, fraction, seed) always reproduces the identical
/// row-index assignment. The per-class train count is `round(fraction * n_c)`,
/// clamped so both partitions keep at least one row of the class.
pub fn stratified_split(dataset: &Dataset, fraction: f64, seed: u64) -> Result<Split> {
    if !(fraction > 0.0 && fraction < 1.0) {
        return Err(SpambenchError::InvalidSplit(format!(
            "split fraction must be in (0, 1), got {}",
            fraction
        )));
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut train_indices: Vec<usize> = Vec::new();
    let mut holdout_indices: Vec<usize> = Vec::new();

    // Fixed class order keeps RNG consumption deterministic
    for class in [Label::NotSpam, Label::Spam] {
        let mut class_rows: Vec<usize> = dataset
            .labels()
            .iter()
            .enumerate()
            .filter(|(_, &l)| l == class)
            .map(|(i, _)| i)
            .collect();

        if class_rows.len() < 2 {
            return Err(SpambenchError::InvalidSplit(format!(
                "class {} has {} rows, need at least 2 to stratify",
                class,
                class_rows.len()
            )));
        }

        class_rows.shuffle(&mut rng);

        let n_train = ((fraction * class_rows.len() as f64).round() as usize)
            .clamp(1, class_rows.len() - 1);

        train_indices.extend_from_slice(&class_rows[..n_train]);
        holdout_indices.extend_from_slice(&class_rows[n_train..]);
    }

    train_indices.sort_unstable();
    holdout_indices.sort_unstable();

    let train = dataset.select_rows(&train_indices)?;
    let holdout = dataset.select_rows(&holdout_indices)?;

    info!(
        train_rows = train.n_rows(),
        holdout_rows = holdout.n_rows(),
        fraction,
        seed,
        "stratified split"
    );

    Ok(Split {
        train,
        holdout,
        train_indices,
        holdout_indices,
    })
}
