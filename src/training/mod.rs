//! Model training: classifier backends, resampling, and grid search

pub mod classifier;
pub mod cross_validation;
pub mod decision_tree;
pub mod grid;
pub mod logistic;
pub mod random_forest;
pub mod svm;
pub mod trainer;

pub use classifier::Classifier;
pub use cross_validation::{stratified_k_fold, CvSpec, CvSplit};
pub use grid::{default_registry, ModelGrid, ModelSpec};
pub use logistic::{LogisticParams, LogisticRegression};
pub use random_forest::{ForestParams, RandomForest};
pub use svm::{Kernel, SvmClassifier, SvmParams};
pub use trainer::{train, FoldMetrics, GridPointSummary, ResampleResult};
