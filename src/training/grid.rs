//! Model registry entries and hyperparameter grids

use crate::training::classifier::Classifier;
use crate::training::logistic::{LogisticParams, LogisticRegression};
use crate::training::random_forest::{ForestParams, RandomForest};
use crate::training::svm::{Kernel, SvmClassifier, SvmParams};
use serde::{Deserialize, Serialize};

/// Finite, ordered hyperparameter grid for one model family. Grid order is
/// part of the contract: ties in selection break toward the lowest index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ModelGrid {
    Logistic(Vec<LogisticParams>),
    RandomForest(Vec<ForestParams>),
    RbfSvm(Vec<SvmParams>),
}

impl ModelGrid {
    /// Number of grid points
    pub fn len(&self) -> usize {
        match self {
            ModelGrid::Logistic(g) => g.len(),
            ModelGrid::RandomForest(g) => g.len(),
            ModelGrid::RbfSvm(g) => g.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fresh unfitted classifier for grid point `index`
    pub fn build(&self, index: usize) -> Option<Box<dyn Classifier>> {
        match self {
            ModelGrid::Logistic(g) => g
                .get(index)
                .map(|p| Box::new(LogisticRegression::new(p.clone())) as Box<dyn Classifier>),
            ModelGrid::RandomForest(g) => g
                .get(index)
                .map(|p| Box::new(RandomForest::new(p.clone())) as Box<dyn Classifier>),
            ModelGrid::RbfSvm(g) => g
                .get(index)
                .map(|p| Box::new(SvmClassifier::new(p.clone())) as Box<dyn Classifier>),
        }
    }

    /// Human-readable description of grid point `index`
    pub fn describe(&self, index: usize) -> String {
        match self {
            ModelGrid::Logistic(g) => g
                .get(index)
                .map(|p| format!("l2_penalty={}", p.l2_penalty))
                .unwrap_or_default(),
            ModelGrid::RandomForest(g) => g
                .get(index)
                .map(|p| {
                    format!(
                        "n_estimators={}, max_features={}",
                        p.n_estimators, p.max_features
                    )
                })
                .unwrap_or_default(),
            ModelGrid::RbfSvm(g) => g
                .get(index)
                .map(|p| match p.kernel {
                    Kernel::Rbf { gamma } => format!("C={}, gamma={}", p.c, gamma),
                    Kernel::Linear => format!("C={}, kernel=linear", p.c),
                })
                .unwrap_or_default(),
        }
    }
}

/// One registered model: a name and its grid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSpec {
    pub name: String,
    pub grid: ModelGrid,
}

impl ModelSpec {
    pub fn new(name: impl Into<String>, grid: ModelGrid) -> Self {
        Self {
            name: name.into(),
            grid,
        }
    }
}

/// The standard three-family registry: logistic regression (single grid
/// point), a 300-tree forest over mtry {6, 12, 18}, and an RBF SVM over
/// C {0.5, 1, 2} with gamma fixed at 1/n_features.
pub fn default_registry(n_features: usize, seed: u64) -> Vec<ModelSpec> {
    let gamma = 1.0 / n_features as f64;

    vec![
        ModelSpec::new(
            "logistic",
            ModelGrid::Logistic(vec![LogisticParams::default()]),
        ),
        ModelSpec::new(
            "random_forest",
            ModelGrid::RandomForest(
                [6, 12, 18]
                    .into_iter()
                    .map(|max_features| ForestParams {
                        n_estimators: 300,
                        max_features,
                        min_samples_leaf: 1,
                        random_state: seed,
                    })
                    .collect(),
            ),
        ),
        ModelSpec::new(
            "rbf_svm",
            ModelGrid::RbfSvm(
                [0.5, 1.0, 2.0]
                    .into_iter()
                    .map(|c| SvmParams {
                        c,
                        kernel: Kernel::Rbf { gamma },
                        random_state: seed,
                        ..Default::default()
                    })
                    .collect(),
            ),
        ),
    ]
}
