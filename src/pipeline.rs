//! End-to-end benchmark pipeline
//!
//! Load, stratified split, scaler fit on the training partition only, then
//! the evaluation harness. Every stage takes its inputs explicitly so the
//! leakage boundary is visible in the call chain.

use crate::config::HarnessConfig;
use crate::data::{stratified_split, DatasetLoader, LoadReport};
use crate::error::Result;
use crate::evaluation::{BenchmarkResults, EvaluationHarness};
use crate::preprocessing::StandardScaler;
use crate::training::{CvSpec, ModelSpec};
use std::path::Path;
use tracing::info;

/// Outcome of a full run, with the load and split bookkeeping attached
#[derive(Debug)]
pub struct PipelineOutput {
    pub results: BenchmarkResults,
    pub load_report: LoadReport,
    pub train_rows: usize,
    pub holdout_rows: usize,
}

/// Run the whole benchmark over the file at `path` with the given registry.
pub fn run<P: AsRef<Path>>(
    config: &HarnessConfig,
    path: P,
    registry: Vec<ModelSpec>,
) -> Result<PipelineOutput> {
    let (dataset, load_report) = DatasetLoader::new().load(path)?;

    let split = stratified_split(&dataset, config.split_fraction, config.random_seed)?;
    let (train_not_spam, train_spam) = split.train.class_counts();
    info!(
        train_rows = split.train.n_rows(),
        holdout_rows = split.holdout.n_rows(),
        train_not_spam,
        train_spam,
        "partitioned"
    );

    // Standardization statistics come from the training partition alone
    let scaler = StandardScaler::fit(split.train.features())?;

    let cv = CvSpec {
        folds: config.cv_folds,
        seed: config.random_seed,
    };
    let harness = EvaluationHarness::new(registry, cv);
    let results = harness.run(&split.train, &split.holdout, &scaler)?;

    Ok(PipelineOutput {
        results,
        load_report,
        train_rows: split.train.n_rows(),
        holdout_rows: split.holdout.n_rows(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::{LogisticParams, ModelGrid};
    use std::io::Write;

    fn synthetic_file(n_per_class: usize) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for i in 0..n_per_class {
            // Jitter grows with i so no two rows are ever byte-identical
            let jitter = i as f64 * 0.01;
            let mut fields: Vec<String> =
                (0..57).map(|j| format!("{:.3}", jitter + j as f64 * 0.001)).collect();
            fields.push("0".to_string());
            writeln!(file, "{}", fields.join(",")).unwrap();

            let mut fields: Vec<String> =
                (0..57).map(|j| format!("{:.3}", 3.0 + jitter + j as f64 * 0.001)).collect();
            fields.push("1".to_string());
            writeln!(file, "{}", fields.join(",")).unwrap();
        }
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_pipeline_end_to_end() {
        let file = synthetic_file(40);
        let config = HarnessConfig::default();
        let registry = vec![ModelSpec::new(
            "logistic",
            ModelGrid::Logistic(vec![LogisticParams::default()]),
        )];

        let output = run(&config, file.path(), registry).unwrap();
        assert_eq!(output.load_report.rows_read, 80);
        assert_eq!(output.load_report.duplicates_removed, 0);
        assert_eq!(output.load_report.rows_kept, 80);
        assert_eq!(output.train_rows + output.holdout_rows, 80);
        assert_eq!(output.results.outcomes.len(), 1);
        let report = output.results.outcomes[0].report().unwrap();
        assert!(report.auc > 0.95, "auc {}", report.auc);
    }

    #[test]
    fn test_pipeline_deterministic() {
        let file = synthetic_file(40);
        let config = HarnessConfig::default();
        let registry = || {
            vec![ModelSpec::new(
                "logistic",
                ModelGrid::Logistic(vec![LogisticParams::default()]),
            )]
        };

        let a = run(&config, file.path(), registry()).unwrap();
        let b = run(&config, file.path(), registry()).unwrap();
        let ra = a.results.outcomes[0].report().unwrap();
        let rb = b.results.outcomes[0].report().unwrap();
        assert_eq!(ra.confusion, rb.confusion);
        assert_eq!(ra.auc, rb.auc);
    }
}
