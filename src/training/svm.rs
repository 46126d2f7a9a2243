//! Kernelized margin classifier backend
//!
//! Binary SVM trained with SMO (Sequential Minimal Optimization). The
//! harness uses the RBF kernel; the linear kernel is kept for tests on
//! exactly separable data. `predict_proba` squashes the decision margin
//! through a sigmoid — the margin already carries the ranking that ROC/AUC
//! need.

use crate::error::{Result, SpambenchError};
use crate::training::classifier::Classifier;
use ndarray::{Array1, Array2};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Maximum samples for the eager kernel matrix; beyond this training refuses
/// rather than exhausting memory.
const MAX_KERNEL_MATRIX_SAMPLES: usize = 10_000;

/// Kernel function
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Kernel {
    /// K(x, y) = x · y
    Linear,
    /// K(x, y) = exp(-γ ||x - y||²)
    Rbf { gamma: f64 },
}

/// Hyperparameters for the SVM backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SvmParams {
    /// Penalty parameter C
    pub c: f64,
    /// Kernel function
    pub kernel: Kernel,
    /// KKT tolerance
    pub tol: f64,
    /// Maximum SMO passes over the data
    pub max_iter: usize,
    /// Seed for SMO's partner selection
    pub random_state: u64,
}

impl Default for SvmParams {
    fn default() -> Self {
        Self {
            c: 1.0,
            kernel: Kernel::Rbf { gamma: 1.0 },
            tol: 1e-3,
            max_iter: 1000,
            random_state: 42,
        }
    }
}

/// Binary support vector classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SvmClassifier {
    params: SvmParams,
    support_vectors: Option<Array2<f64>>,
    alphas: Option<Array1<f64>>,
    support_labels: Option<Array1<f64>>,
    bias: f64,
    is_fitted: bool,
}

impl SvmClassifier {
    pub fn new(params: SvmParams) -> Self {
        Self {
            params,
            support_vectors: None,
            alphas: None,
            support_labels: None,
            bias: 0.0,
            is_fitted: false,
        }
    }

    pub fn n_support_vectors(&self) -> usize {
        self.support_vectors.as_ref().map_or(0, |sv| sv.nrows())
    }

    fn kernel(&self, x1: &Array1<f64>, x2: &Array1<f64>) -> f64 {
        match self.params.kernel {
            Kernel::Linear => x1.dot(x2),
            Kernel::Rbf { gamma } => {
                let diff = x1 - x2;
                (-gamma * diff.dot(&diff)).exp()
            }
        }
    }

    fn compute_kernel_matrix(&self, x: &Array2<f64>) -> Array2<f64> {
        let n = x.nrows();
        let mut k = Array2::zeros((n, n));
        for i in 0..n {
            let row_i = x.row(i).to_owned();
            for j in i..n {
                let val = self.kernel(&row_i, &x.row(j).to_owned());
                k[[i, j]] = val;
                k[[j, i]] = val;
            }
        }
        k
    }

    fn decision_cached(
        k: &Array2<f64>,
        alphas: &Array1<f64>,
        y: &Array1<f64>,
        bias: f64,
        idx: usize,
    ) -> f64 {
        let mut sum = 0.0;
        for i in 0..alphas.len() {
            sum += alphas[i] * y[i] * k[[i, idx]];
        }
        sum + bias
    }

    /// SMO over ±1 labels; returns alphas, bias, and support indices
    fn smo_train(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<(Array1<f64>, f64, Vec<usize>)> {
        let n = x.nrows();
        if n > MAX_KERNEL_MATRIX_SAMPLES {
            return Err(SpambenchError::ValidationError(format!(
                "dataset has {} samples, exceeding the maximum {} for the SVM kernel matrix",
                n, MAX_KERNEL_MATRIX_SAMPLES
            )));
        }
        if n < 2 {
            return Err(SpambenchError::ValidationError(
                "SVM requires at least 2 samples".to_string(),
            ));
        }

        let c = self.params.c;
        let tol = self.params.tol;
        let mut alphas: Array1<f64> = Array1::zeros(n);
        let mut bias = 0.0;
        let kernel_matrix = self.compute_kernel_matrix(x);
        let mut rng = ChaCha8Rng::seed_from_u64(self.params.random_state);

        let mut passes = 0;
        let max_passes = 5;
        let mut total_iter = 0;

        while passes < max_passes && total_iter < self.params.max_iter {
            let mut num_changed = 0;

            for i in 0..n {
                let e_i = Self::decision_cached(&kernel_matrix, &alphas, y, bias, i) - y[i];

                if (y[i] * e_i < -tol && alphas[i] < c) || (y[i] * e_i > tol && alphas[i] > 0.0) {
                    let j = loop {
                        let j = rng.gen_range(0..n);
                        if j != i {
                            break j;
                        }
                    };

                    let e_j = Self::decision_cached(&kernel_matrix, &alphas, y, bias, j) - y[j];
                    let alpha_i_old = alphas[i];
                    let alpha_j_old = alphas[j];

                    let (l, h) = if y[i] != y[j] {
                        (
                            (alphas[j] - alphas[i]).max(0.0),
                            (c + alphas[j] - alphas[i]).min(c),
                        )
                    } else {
                        (
                            (alphas[i] + alphas[j] - c).max(0.0),
                            (alphas[i] + alphas[j]).min(c),
                        )
                    };
                    if (l - h).abs() < 1e-10 {
                        continue;
                    }

                    let eta = 2.0 * kernel_matrix[[i, j]]
                        - kernel_matrix[[i, i]]
                        - kernel_matrix[[j, j]];
                    if eta >= 0.0 {
                        continue;
                    }

                    alphas[j] = (alphas[j] - y[j] * (e_i - e_j) / eta).clamp(l, h);
                    if (alphas[j] - alpha_j_old).abs() < 1e-5 {
                        continue;
                    }

                    alphas[i] += y[i] * y[j] * (alpha_j_old - alphas[j]);

                    let b1 = bias
                        - e_i
                        - y[i] * (alphas[i] - alpha_i_old) * kernel_matrix[[i, i]]
                        - y[j] * (alphas[j] - alpha_j_old) * kernel_matrix[[i, j]];
                    let b2 = bias
                        - e_j
                        - y[i] * (alphas[i] - alpha_i_old) * kernel_matrix[[i, j]]
                        - y[j] * (alphas[j] - alpha_j_old) * kernel_matrix[[j, j]];

                    bias = if alphas[i] > 0.0 && alphas[i] < c {
                        b1
                    } else if alphas[j] > 0.0 && alphas[j] < c {
                        b2
                    } else {
                        (b1 + b2) / 2.0
                    };

                    num_changed += 1;
                }
            }

            total_iter += 1;
            if num_changed == 0 {
                passes += 1;
            } else {
                passes = 0;
            }
        }

        let support_indices: Vec<usize> = alphas
            .iter()
            .enumerate()
            .filter(|(_, &a)| a > 1e-8)
            .map(|(i, _)| i)
            .collect();

        Ok((alphas, bias, support_indices))
    }

    fn score_sample(&self, sample: &Array1<f64>) -> f64 {
        let sv = self.support_vectors.as_ref().expect("checked by caller");
        let alphas = self.alphas.as_ref().expect("checked by caller");
        let labels = self.support_labels.as_ref().expect("checked by caller");

        let mut sum = self.bias;
        for j in 0..sv.nrows() {
            sum += alphas[j] * labels[j] * self.kernel(sample, &sv.row(j).to_owned());
        }
        sum
    }

    /// Raw decision margins
    pub fn decision_function(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if !self.is_fitted {
            return Err(SpambenchError::ModelNotFitted);
        }
        let scores: Vec<f64> = (0..x.nrows())
            .map(|i| self.score_sample(&x.row(i).to_owned()))
            .collect();
        Ok(Array1::from_vec(scores))
    }
}

impl Classifier for SvmClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        if x.nrows() != y.len() {
            return Err(SpambenchError::ShapeError {
                expected: format!("y length = {}", x.nrows()),
                actual: format!("y length = {}", y.len()),
            });
        }

        let has_pos = y.iter().any(|&v| v > 0.5);
        let has_neg = y.iter().any(|&v| v <= 0.5);
        if !has_pos || !has_neg {
            return Err(SpambenchError::ValidationError(
                "SVM requires both classes in the training data".to_string(),
            ));
        }

        // SMO works over ±1 labels
        let y_signed: Array1<f64> = y.mapv(|v| if v > 0.5 { 1.0 } else { -1.0 });
        let (alphas, bias, support_indices) = self.smo_train(x, &y_signed)?;

        if support_indices.is_empty() {
            return Err(SpambenchError::ComputationError(
                "SMO produced no support vectors".to_string(),
            ));
        }

        let n_features = x.ncols();
        let mut support_vectors = Array2::zeros((support_indices.len(), n_features));
        let mut support_labels = Array1::zeros(support_indices.len());
        let mut support_alphas = Array1::zeros(support_indices.len());
        for (i, &idx) in support_indices.iter().enumerate() {
            support_vectors.row_mut(i).assign(&x.row(idx));
            support_labels[i] = y_signed[idx];
            support_alphas[i] = alphas[idx];
        }

        self.support_vectors = Some(support_vectors);
        self.support_labels = Some(support_labels);
        self.alphas = Some(support_alphas);
        self.bias = bias;
        self.is_fitted = true;
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let scores = self.decision_function(x)?;
        Ok(scores.mapv(|s| if s >= 0.0 { 1.0 } else { 0.0 }))
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let scores = self.decision_function(x)?;
        Ok(scores.mapv(|s| 1.0 / (1.0 + (-s).exp())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn separable_data() -> (Array2<f64>, Array1<f64>) {
        let x = Array2::from_shape_vec(
            (10, 2),
            vec![
                1.0, 1.0, 1.5, 1.2, 2.0, 2.0, 1.2, 1.8, 0.8, 1.5, 5.0, 5.0, 5.5, 5.2, 6.0, 6.0,
                5.2, 5.8, 4.8, 5.5,
            ],
        )
        .unwrap();
        let y = Array1::from_vec(vec![0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 1.0]);
        (x, y)
    }

    #[test]
    fn test_linear_kernel_separates() {
        let (x, y) = separable_data();
        let mut svm = SvmClassifier::new(SvmParams {
            kernel: Kernel::Linear,
            ..Default::default()
        });
        svm.fit(&x, &y).unwrap();

        let predictions = svm.predict(&x).unwrap();
        let correct = predictions
            .iter()
            .zip(y.iter())
            .filter(|(p, a)| (*p - *a).abs() < 0.5)
            .count();
        assert!(correct >= 9, "only {} of 10 correct", correct);
    }

    #[test]
    fn test_rbf_kernel_separates() {
        let (x, y) = separable_data();
        let mut svm = SvmClassifier::new(SvmParams {
            kernel: Kernel::Rbf { gamma: 0.5 },
            c: 10.0,
            ..Default::default()
        });
        svm.fit(&x, &y).unwrap();

        let predictions = svm.predict(&x).unwrap();
        let correct = predictions
            .iter()
            .zip(y.iter())
            .filter(|(p, a)| (*p - *a).abs() < 0.5)
            .count();
        assert!(correct >= 9, "only {} of 10 correct", correct);
    }

    #[test]
    fn test_proba_tracks_margin() {
        let (x, y) = separable_data();
        let mut svm = SvmClassifier::new(SvmParams {
            kernel: Kernel::Rbf { gamma: 0.5 },
            c: 10.0,
            ..Default::default()
        });
        svm.fit(&x, &y).unwrap();

        let margins = svm.decision_function(&x).unwrap();
        let proba = svm.predict_proba(&x).unwrap();
        for i in 0..x.nrows() {
            for j in 0..x.nrows() {
                if margins[i] > margins[j] {
                    assert!(proba[i] > proba[j]);
                }
            }
        }
    }

    #[test]
    fn test_single_class_rejected() {
        let x = Array2::zeros((4, 2));
        let y = Array1::from_vec(vec![1.0, 1.0, 1.0, 1.0]);
        let mut svm = SvmClassifier::new(SvmParams::default());
        assert!(svm.fit(&x, &y).is_err());
    }
}
