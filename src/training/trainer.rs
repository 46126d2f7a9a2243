//! Grid-search cross-validation trainer
//!
//! Every grid point of a model is scored on the same stratified folds.
//! Selection is by mean AUC, then mean sensitivity, then lowest grid index.
//! The winner is refit on the full training partition.

use crate::error::{Result, SpambenchError};
use crate::evaluation::metrics::{roc_curve, ConfusionMatrix};
use crate::training::classifier::Classifier;
use crate::training::cross_validation::{stratified_k_fold, CvSpec, CvSplit};
use crate::training::grid::ModelSpec;
use ndarray::{Array1, Array2, Axis};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Validation metrics for one fold of one grid point
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FoldMetrics {
    pub fold: usize,
    pub auc: f64,
    pub sensitivity: f64,
    pub specificity: f64,
}

/// Aggregated cross-validation outcome for one grid point
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridPointSummary {
    pub index: usize,
    pub description: String,
    pub mean_auc: f64,
    pub mean_sensitivity: f64,
    pub mean_specificity: f64,
    /// Folds whose fit or scoring failed. Any entry disqualifies the point.
    pub failed_folds: Vec<usize>,
}

impl GridPointSummary {
    pub fn is_valid(&self) -> bool {
        self.failed_folds.is_empty()
    }
}

/// Full resampling record for one model family
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResampleResult {
    pub model: String,
    /// Per-fold metrics of the selected grid point
    pub fold_metrics: Vec<FoldMetrics>,
    pub grid_summary: Vec<GridPointSummary>,
    pub selected_index: usize,
}

/// Fit one grid point on a fold's training rows and score its validation rows
fn score_fold(
    spec: &ModelSpec,
    point: usize,
    x: &Array2<f64>,
    y: &Array1<f64>,
    split: &CvSplit,
) -> Result<FoldMetrics> {
    let x_train = x.select(Axis(0), &split.train_indices);
    let y_train = Array1::from_iter(split.train_indices.iter().map(|&i| y[i]));
    let x_val = x.select(Axis(0), &split.validation_indices);
    let y_val = Array1::from_iter(split.validation_indices.iter().map(|&i| y[i]));

    let mut model = spec
        .grid
        .build(point)
        .ok_or_else(|| SpambenchError::ValidationError(format!(
            "grid point {} out of range for '{}'",
            point, spec.name
        )))?;
    model.fit(&x_train, &y_train)?;

    let scores = model.predict_proba(&x_val)?;
    let predictions = model.predict(&x_val)?;

    let auc = roc_curve(&y_val, &scores)?.auc();
    let confusion = ConfusionMatrix::from_labels(&y_val, &predictions)?;

    Ok(FoldMetrics {
        fold: split.fold_idx,
        auc,
        sensitivity: confusion.recall(),
        specificity: confusion.specificity(),
    })
}

fn summarize(
    spec: &ModelSpec,
    point: usize,
    folds: &[std::result::Result<FoldMetrics, String>],
) -> GridPointSummary {
    let ok: Vec<&FoldMetrics> = folds.iter().filter_map(|f| f.as_ref().ok()).collect();
    let failed_folds: Vec<usize> = folds
        .iter()
        .enumerate()
        .filter(|(_, f)| f.is_err())
        .map(|(i, _)| i)
        .collect();

    let mean = |extract: fn(&FoldMetrics) -> f64| -> f64 {
        if ok.is_empty() {
            f64::NAN
        } else {
            ok.iter().map(|m| extract(m)).sum::<f64>() / ok.len() as f64
        }
    };

    GridPointSummary {
        index: point,
        description: spec.grid.describe(point),
        mean_auc: mean(|m| m.auc),
        mean_sensitivity: mean(|m| m.sensitivity),
        mean_specificity: mean(|m| m.specificity),
        failed_folds,
    }
}

/// Run the grid search for one model and refit the winner on all of `x`/`y`.
///
/// A grid point only competes if every fold succeeded. If no point survives,
/// the whole model fails with `TrainingFailed`.
pub fn train(
    spec: &ModelSpec,
    x: &Array2<f64>,
    y: &Array1<f64>,
    cv: &CvSpec,
) -> Result<(Box<dyn Classifier>, ResampleResult)> {
    if spec.grid.is_empty() {
        return Err(SpambenchError::TrainingFailed {
            model: spec.name.clone(),
            reason: "empty hyperparameter grid".to_string(),
        });
    }

    let splits = stratified_k_fold(y, cv).map_err(|e| SpambenchError::TrainingFailed {
        model: spec.name.clone(),
        reason: e.to_string(),
    })?;

    let mut grid_summary = Vec::with_capacity(spec.grid.len());
    let mut per_point_folds: Vec<Vec<std::result::Result<FoldMetrics, String>>> =
        Vec::with_capacity(spec.grid.len());

    for point in 0..spec.grid.len() {
        let folds: Vec<std::result::Result<FoldMetrics, String>> = splits
            .par_iter()
            .map(|split| score_fold(spec, point, x, y, split).map_err(|e| e.to_string()))
            .collect();

        let summary = summarize(spec, point, &folds);
        debug!(
            model = %spec.name,
            point,
            description = %summary.description,
            mean_auc = summary.mean_auc,
            failed = summary.failed_folds.len(),
            "grid point evaluated"
        );
        grid_summary.push(summary);
        per_point_folds.push(folds);
    }

    // Ascending index order makes max_by keep the earliest point on exact ties
    let selected_index = grid_summary
        .iter()
        .filter(|s| s.is_valid())
        .max_by(|a, b| {
            a.mean_auc
                .partial_cmp(&b.mean_auc)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(
                    a.mean_sensitivity
                        .partial_cmp(&b.mean_sensitivity)
                        .unwrap_or(std::cmp::Ordering::Equal),
                )
                .then(b.index.cmp(&a.index))
        })
        .map(|s| s.index)
        .ok_or_else(|| {
            let detail = grid_summary
                .iter()
                .map(|s| format!("{} ({} failed folds)", s.description, s.failed_folds.len()))
                .collect::<Vec<_>>()
                .join("; ");
            SpambenchError::TrainingFailed {
                model: spec.name.clone(),
                reason: format!("no grid point produced a valid fit on all folds: {}", detail),
            }
        })?;

    let fold_metrics: Vec<FoldMetrics> = per_point_folds[selected_index]
        .iter()
        .filter_map(|f| f.as_ref().ok().copied())
        .collect();

    info!(
        model = %spec.name,
        selected = %grid_summary[selected_index].description,
        mean_auc = grid_summary[selected_index].mean_auc,
        "grid search complete, refitting on full training partition"
    );

    let mut winner = spec
        .grid
        .build(selected_index)
        .ok_or_else(|| SpambenchError::TrainingFailed {
            model: spec.name.clone(),
            reason: format!("selected grid point {} vanished", selected_index),
        })?;
    winner
        .fit(x, y)
        .map_err(|e| SpambenchError::TrainingFailed {
            model: spec.name.clone(),
            reason: format!("final refit failed: {}", e),
        })?;

    Ok((
        winner,
        ResampleResult {
            model: spec.name.clone(),
            fold_metrics,
            grid_summary,
            selected_index,
        },
    ))
}
