//! # spambench
//!
//! Benchmark harness for binary spam classification over the spambase
//! feature table. One run loads and deduplicates the data file, makes a
//! stratified train/holdout split, standardizes features with statistics
//! fitted on the training partition only, tunes each registered model by
//! stratified cross-validation, and scores every tuned model on the holdout.
//!
//! ```no_run
//! use spambench::config::HarnessConfig;
//! use spambench::training::default_registry;
//!
//! let config = HarnessConfig::default();
//! let registry = default_registry(spambench::data::schema::N_FEATURES, config.random_seed);
//! let output = spambench::pipeline::run(&config, "spambase.data", registry)?;
//! println!("{}", spambench::evaluation::render_text(&output.results));
//! # Ok::<(), spambench::error::SpambenchError>(())
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod evaluation;
pub mod pipeline;
pub mod preprocessing;
pub mod training;

pub use error::{Result, SpambenchError};

/// Commonly used types
pub mod prelude {
    pub use crate::config::HarnessConfig;
    pub use crate::data::{stratified_split, Dataset, DatasetLoader, Label, LoadReport};
    pub use crate::error::{Result, SpambenchError};
    pub use crate::evaluation::{
        BenchmarkResults, ConfusionMatrix, EvaluationHarness, EvaluationReport, ModelOutcome,
    };
    pub use crate::preprocessing::StandardScaler;
    pub use crate::training::{
        default_registry, Classifier, CvSpec, ModelGrid, ModelSpec, ResampleResult,
    };
}
