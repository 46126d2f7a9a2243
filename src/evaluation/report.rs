//! Run report rendering: fixed-width console summary and JSON export

use crate::error::Result;
use crate::evaluation::harness::{BenchmarkResults, ModelOutcome};
use std::fmt::Write as _;
use std::path::Path;

/// Render the per-model summary table, failure section, and for each
/// successful model its confusion matrix and top features.
pub fn render_text(results: &BenchmarkResults) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{:=<78}", "");
    let _ = writeln!(out, "Spambase benchmark results");
    let _ = writeln!(out, "{:=<78}", "");
    let _ = writeln!(
        out,
        "{:<16} {:>9} {:>10} {:>8} {:>12} {:>8} {:>8}",
        "Model", "Accuracy", "Precision", "Recall", "Specificity", "F1", "AUC"
    );
    let _ = writeln!(out, "{:-<78}", "");

    for outcome in &results.outcomes {
        match outcome {
            ModelOutcome::Evaluated { report } => {
                let _ = writeln!(
                    out,
                    "{:<16} {:>9.4} {:>10.4} {:>8.4} {:>12.4} {:>8.4} {:>8.4}",
                    report.model,
                    report.accuracy,
                    report.precision,
                    report.recall,
                    report.specificity,
                    report.f1,
                    report.auc
                );
            }
            ModelOutcome::Failed { model, .. } => {
                let _ = writeln!(out, "{:<16} {:>9}", model, "FAILED");
            }
        }
    }

    let failures: Vec<&ModelOutcome> = results
        .outcomes
        .iter()
        .filter(|o| matches!(o, ModelOutcome::Failed { .. }))
        .collect();
    if !failures.is_empty() {
        let _ = writeln!(out, "\nFailures:");
        for outcome in failures {
            if let ModelOutcome::Failed { model, reason } = outcome {
                let _ = writeln!(out, "  {}: {}", model, reason);
            }
        }
    }

    for outcome in &results.outcomes {
        let Some(report) = outcome.report() else {
            continue;
        };

        let _ = writeln!(out, "\n{:-<78}", "");
        let _ = writeln!(out, "{} — holdout confusion matrix (positive = Spam)", report.model);
        let c = &report.confusion;
        let _ = writeln!(
            out,
            "{:>24} {:>12} {:>12}",
            "", "pred Spam", "pred Not_Spam"
        );
        let _ = writeln!(
            out,
            "{:>24} {:>12} {:>12}",
            "true Spam", c.true_positives, c.false_negatives
        );
        let _ = writeln!(
            out,
            "{:>24} {:>12} {:>12}",
            "true Not_Spam", c.false_positives, c.true_negatives
        );

        if let Some(importances) = &report.feature_importances {
            let _ = writeln!(out, "\nTop features by importance:");
            for (name, value) in importances.iter().take(10) {
                let _ = writeln!(out, "  {:<36} {:.4}", name, value);
            }
        }
    }

    if let Some(resample) = results.resamples.first() {
        let _ = writeln!(out, "\n{:-<78}", "");
        let _ = writeln!(
            out,
            "Cross-validation: {} folds per grid point",
            resample.fold_metrics.len()
        );
    }
    for resample in &results.resamples {
        let _ = writeln!(out, "\n{} grid:", resample.model);
        for point in &resample.grid_summary {
            let marker = if point.index == resample.selected_index {
                "*"
            } else {
                " "
            };
            if point.is_valid() {
                let _ = writeln!(
                    out,
                    " {} [{}] {:<40} mean AUC {:.4}  sens {:.4}  spec {:.4}",
                    marker,
                    point.index,
                    point.description,
                    point.mean_auc,
                    point.mean_sensitivity,
                    point.mean_specificity
                );
            } else {
                let _ = writeln!(
                    out,
                    " {} [{}] {:<40} invalid ({} failed folds)",
                    marker,
                    point.index,
                    point.description,
                    point.failed_folds.len()
                );
            }
        }
    }

    out
}

/// Write the full results, resampling records included, as pretty JSON.
pub fn write_json(results: &BenchmarkResults, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(results)?;
    std::fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::harness::EvaluationReport;
    use crate::evaluation::metrics::{ConfusionMatrix, RocCurve};

    fn toy_results() -> BenchmarkResults {
        let confusion = ConfusionMatrix {
            true_positives: 380,
            false_positives: 30,
            true_negatives: 490,
            false_negatives: 20,
        };
        let report = EvaluationReport {
            model: "logistic".to_string(),
            accuracy: confusion.accuracy(),
            precision: confusion.precision(),
            recall: confusion.recall(),
            specificity: confusion.specificity(),
            f1: confusion.f1(),
            auc: 0.97,
            confusion,
            roc: RocCurve { points: vec![] },
            feature_importances: None,
        };
        BenchmarkResults {
            outcomes: vec![
                ModelOutcome::Evaluated { report },
                ModelOutcome::Failed {
                    model: "rbf_svm".to_string(),
                    reason: "no grid point produced a valid fit".to_string(),
                },
            ],
            resamples: vec![],
        }
    }

    #[test]
    fn test_text_report_lists_every_model() {
        let text = render_text(&toy_results());
        assert!(text.contains("logistic"));
        assert!(text.contains("rbf_svm"));
        assert!(text.contains("FAILED"));
        assert!(text.contains("no grid point produced a valid fit"));
        assert!(text.contains("380"));
    }

    #[test]
    fn test_json_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.json");
        write_json(&toy_results(), &path).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let parsed: BenchmarkResults = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed.outcomes.len(), 2);
        assert_eq!(parsed.n_failed(), 1);
    }
}
