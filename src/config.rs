//! Harness configuration

use serde::{Deserialize, Serialize};

/// Default random seed for reproducible runs
pub const DEFAULT_SEED: u64 = 2025;

/// Configuration for one benchmark run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Fraction of each class sampled into the training partition, in (0, 1)
    pub split_fraction: f64,
    /// Seed for the partitioner and every cross-validation shuffle
    pub random_seed: u64,
    /// Number of cross-validation folds
    pub cv_folds: usize,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            split_fraction: 0.8,
            random_seed: DEFAULT_SEED,
            cv_folds: 5,
        }
    }
}

impl HarnessConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_split_fraction(mut self, fraction: f64) -> Self {
        self.split_fraction = fraction;
        self
    }

    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = seed;
        self
    }

    pub fn with_cv_folds(mut self, folds: usize) -> Self {
        self.cv_folds = folds;
        self
    }
}
