//! Feature standardization fitted on training data only
//!
//! The scaler's statistics come exclusively from the training partition and
//! are never refit when applied elsewhere — applying the fitted transform to
//! holdout data must not leak holdout information into the statistics.

use crate::error::{Result, SpambenchError};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Fitted per-column standardization: `(x - center) / scale`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    center: Array1<f64>,
    scale: Array1<f64>,
}

impl StandardScaler {
    /// Compute per-column sample mean and sample standard deviation (n-1
    /// divisor). A zero-variance column gets scale = 1 so a constant feature
    /// maps to `x - center` instead of NaN.
    pub fn fit(x: &Array2<f64>) -> Result<Self> {
        let (n_rows, n_cols) = x.dim();
        if n_rows < 2 || n_cols == 0 {
            return Err(SpambenchError::ValidationError(format!(
                "scaler fit requires at least 2 rows and 1 column, got {}x{}",
                n_rows, n_cols
            )));
        }

        let center = x.mean_axis(Axis(0)).ok_or_else(|| {
            SpambenchError::ComputationError("column mean of empty matrix".to_string())
        })?;

        let mut scale = Array1::zeros(n_cols);
        for (c, col) in x.axis_iter(Axis(1)).enumerate() {
            let m = center[c];
            let var = col.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / (n_rows - 1) as f64;
            let std = var.sqrt();
            scale[c] = if std == 0.0 { 1.0 } else { std };
        }

        Ok(Self { center, scale })
    }

    /// Number of feature columns the scaler was fitted on
    pub fn n_features(&self) -> usize {
        self.center.len()
    }

    pub fn center(&self) -> &Array1<f64> {
        &self.center
    }

    pub fn scale(&self) -> &Array1<f64> {
        &self.scale
    }

    /// Pure elementwise map `(x - center) / scale` over any matrix of the
    /// fitted width. Same input always produces the same output.
    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if x.ncols() != self.n_features() {
            return Err(SpambenchError::ColumnMismatch {
                expected: self.n_features(),
                actual: x.ncols(),
            });
        }

        let mut out = x.clone();
        for (c, mut col) in out.axis_iter_mut(Axis(1)).enumerate() {
            let (m, s) = (self.center[c], self.scale[c]);
            col.mapv_inplace(|v| (v - m) / s);
        }
        Ok(out)
    }
}
