//! Classifier capability trait
//!
//! Every model family sits behind the same contract: fit on a feature matrix
//! with 0/1 labels, then predict class labels and class-1 probabilities for
//! new rows. The evaluation harness depends only on this trait.

use crate::error::Result;
use ndarray::{Array1, Array2};

/// A trainable binary classifier. Labels use the crate convention
/// (0 = Not_Spam, 1 = Spam); `predict_proba` returns P(Spam) per row.
pub trait Classifier: Send + Sync {
    /// Fit the model to training data
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()>;

    /// Predict class labels (0.0 or 1.0)
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>>;

    /// Predict the probability of the positive class per row, in [0, 1]
    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>>;

    /// Per-feature importance scores, for families that can produce them
    fn feature_importances(&self) -> Option<Array1<f64>> {
        None
    }
}
