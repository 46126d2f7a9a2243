//! Holdout evaluation harness
//!
//! Runs every registered model through grid-search CV on the training
//! partition, scores the winners on the holdout, and keeps per-model
//! failures isolated so one broken family never hides the others.

use crate::data::Dataset;
use crate::error::{Result, SpambenchError};
use crate::evaluation::metrics::{roc_curve, ConfusionMatrix, RocCurve};
use crate::preprocessing::StandardScaler;
use crate::training::{train, CvSpec, ModelSpec, ResampleResult};
use ndarray::Array1;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Holdout scorecard for one successfully trained model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub model: String,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub specificity: f64,
    pub f1: f64,
    pub auc: f64,
    pub confusion: ConfusionMatrix,
    pub roc: RocCurve,
    /// (feature name, importance) sorted descending, for models that expose it
    pub feature_importances: Option<Vec<(String, f64)>>,
}

/// Terminal state of one model family in a run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ModelOutcome {
    Evaluated { report: EvaluationReport },
    Failed { model: String, reason: String },
}

impl ModelOutcome {
    pub fn model_name(&self) -> &str {
        match self {
            ModelOutcome::Evaluated { report } => &report.model,
            ModelOutcome::Failed { model, .. } => model,
        }
    }

    pub fn report(&self) -> Option<&EvaluationReport> {
        match self {
            ModelOutcome::Evaluated { report } => Some(report),
            ModelOutcome::Failed { .. } => None,
        }
    }
}

/// Everything a run produces: one outcome per registered model plus the
/// resampling records behind each successful one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkResults {
    pub outcomes: Vec<ModelOutcome>,
    pub resamples: Vec<ResampleResult>,
}

impl BenchmarkResults {
    pub fn n_failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, ModelOutcome::Failed { .. }))
            .count()
    }
}

/// Trains and scores a fixed model registry under one resampling protocol
pub struct EvaluationHarness {
    registry: Vec<ModelSpec>,
    cv: CvSpec,
}

impl EvaluationHarness {
    pub fn new(registry: Vec<ModelSpec>, cv: CvSpec) -> Self {
        Self { registry, cv }
    }

    /// Train every registered model on the (scaled) training partition and
    /// score it on the (scaled) holdout. `TrainingFailed` from one model is
    /// recorded as a `Failed` outcome; any other error aborts the run.
    pub fn run(
        &self,
        train_set: &Dataset,
        holdout: &Dataset,
        scaler: &StandardScaler,
    ) -> Result<BenchmarkResults> {
        let x_train = scaler.transform(train_set.features())?;
        let y_train = train_set.label_array();
        let x_holdout = scaler.transform(holdout.features())?;
        let y_holdout = holdout.label_array();

        // Models are independent given the shared scaled partitions; the
        // indexed collect keeps outcomes in registry order.
        let per_model: Result<Vec<(ModelOutcome, Option<ResampleResult>)>> = self
            .registry
            .par_iter()
            .map(|spec| {
                info!(model = %spec.name, grid_points = spec.grid.len(), "training");
                match train(spec, &x_train, &y_train, &self.cv) {
                    Ok((model, resample)) => {
                        let report = score_holdout(
                            &spec.name,
                            model.as_ref(),
                            &x_holdout,
                            &y_holdout,
                            holdout.feature_names(),
                        )?;
                        info!(
                            model = %spec.name,
                            auc = report.auc,
                            accuracy = report.accuracy,
                            "holdout scored"
                        );
                        Ok((ModelOutcome::Evaluated { report }, Some(resample)))
                    }
                    Err(SpambenchError::TrainingFailed { model, reason }) => {
                        warn!(model = %model, reason = %reason, "model failed, continuing");
                        Ok((ModelOutcome::Failed { model, reason }, None))
                    }
                    Err(other) => Err(other),
                }
            })
            .collect();

        let mut outcomes = Vec::with_capacity(self.registry.len());
        let mut resamples = Vec::new();
        for (outcome, resample) in per_model? {
            outcomes.push(outcome);
            resamples.extend(resample);
        }

        Ok(BenchmarkResults { outcomes, resamples })
    }
}

fn score_holdout(
    name: &str,
    model: &dyn crate::training::Classifier,
    x: &ndarray::Array2<f64>,
    y: &Array1<f64>,
    feature_names: &[String],
) -> Result<EvaluationReport> {
    let scores = model.predict_proba(x)?;
    let predictions = model.predict(x)?;

    let confusion = ConfusionMatrix::from_labels(y, &predictions)?;
    let roc = roc_curve(y, &scores)?;

    let feature_importances = model.feature_importances().map(|imp| {
        let mut named: Vec<(String, f64)> = feature_names
            .iter()
            .cloned()
            .zip(imp.iter().copied())
            .collect();
        named.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        named
    });

    Ok(EvaluationReport {
        model: name.to_string(),
        accuracy: confusion.accuracy(),
        precision: confusion.precision(),
        recall: confusion.recall(),
        specificity: confusion.specificity(),
        f1: confusion.f1(),
        auc: roc.auc(),
        confusion,
        roc,
        feature_importances,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Label;
    use crate::training::{LogisticParams, ModelGrid};
    use ndarray::Array2;

    fn blob_dataset(n_per_class: usize, offset: f64) -> Dataset {
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for i in 0..n_per_class {
            let jitter = (i % 9) as f64 * 0.1;
            rows.extend_from_slice(&[offset + jitter, offset + jitter + 0.2]);
            labels.push(Label::NotSpam);
            rows.extend_from_slice(&[offset + 4.0 + jitter, offset + 4.3 + jitter]);
            labels.push(Label::Spam);
        }
        Dataset::new(
            Array2::from_shape_vec((2 * n_per_class, 2), rows).unwrap(),
            labels,
            vec!["f0".into(), "f1".into()],
        )
        .unwrap()
    }

    fn logistic_only() -> Vec<ModelSpec> {
        vec![ModelSpec::new(
            "logistic",
            ModelGrid::Logistic(vec![LogisticParams::default()]),
        )]
    }

    #[test]
    fn test_run_scores_holdout() {
        let train_set = blob_dataset(30, 0.0);
        let holdout = blob_dataset(10, 0.05);
        let scaler = StandardScaler::fit(train_set.features()).unwrap();

        let harness = EvaluationHarness::new(logistic_only(), CvSpec { folds: 5, seed: 42 });
        let results = harness.run(&train_set, &holdout, &scaler).unwrap();

        assert_eq!(results.outcomes.len(), 1);
        assert_eq!(results.n_failed(), 0);
        let report = results.outcomes[0].report().unwrap();
        assert!(report.auc > 0.95, "auc {}", report.auc);
        assert_eq!(report.confusion.total(), holdout.n_rows());
    }

    #[test]
    fn test_failed_model_does_not_hide_others() {
        let train_set = blob_dataset(30, 0.0);
        let holdout = blob_dataset(10, 0.0);
        let scaler = StandardScaler::fit(train_set.features()).unwrap();

        let registry = vec![
            ModelSpec::new("broken", ModelGrid::Logistic(vec![])),
            ModelSpec::new(
                "logistic",
                ModelGrid::Logistic(vec![LogisticParams::default()]),
            ),
        ];
        let harness = EvaluationHarness::new(registry, CvSpec { folds: 5, seed: 42 });
        let results = harness.run(&train_set, &holdout, &scaler).unwrap();

        assert_eq!(results.outcomes.len(), 2);
        assert_eq!(results.n_failed(), 1);
        assert!(matches!(
            results.outcomes[0],
            ModelOutcome::Failed { ref model, .. } if model == "broken"
        ));
        assert!(results.outcomes[1].report().is_some());
        assert_eq!(results.resamples.len(), 1);
    }

    #[test]
    fn test_importances_sorted_descending() {
        use crate::training::ForestParams;

        let train_set = blob_dataset(30, 0.0);
        let holdout = blob_dataset(10, 0.0);
        let scaler = StandardScaler::fit(train_set.features()).unwrap();

        let registry = vec![ModelSpec::new(
            "random_forest",
            ModelGrid::RandomForest(vec![ForestParams {
                n_estimators: 15,
                max_features: 1,
                min_samples_leaf: 1,
                random_state: 42,
            }]),
        )];
        let harness = EvaluationHarness::new(registry, CvSpec { folds: 5, seed: 42 });
        let results = harness.run(&train_set, &holdout, &scaler).unwrap();

        let report = results.outcomes[0].report().unwrap();
        let importances = report.feature_importances.as_ref().unwrap();
        assert_eq!(importances.len(), 2);
        assert!(importances[0].1 >= importances[1].1);
    }
}
