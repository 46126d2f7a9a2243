//! Holdout evaluation: metrics, the harness, and report rendering

pub mod harness;
pub mod metrics;
pub mod report;

pub use harness::{BenchmarkResults, EvaluationHarness, EvaluationReport, ModelOutcome};
pub use metrics::{roc_curve, ConfusionMatrix, RocCurve, RocPoint};
pub use report::{render_text, write_json};
