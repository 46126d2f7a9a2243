//! In-memory dataset types: feature table plus row-aligned label vector

use crate::error::{Result, SpambenchError};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Binary response label. `Spam` is the positive class for every metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    NotSpam,
    Spam,
}

impl Label {
    /// Decode the file representation (0 or 1)
    pub fn from_code(code: f64) -> Option<Self> {
        if code == 0.0 {
            Some(Label::NotSpam)
        } else if code == 1.0 {
            Some(Label::Spam)
        } else {
            None
        }
    }

    /// Numeric coding used at the model boundary
    pub fn as_f64(self) -> f64 {
        match self {
            Label::NotSpam => 0.0,
            Label::Spam => 1.0,
        }
    }

    pub fn is_spam(self) -> bool {
        matches!(self, Label::Spam)
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Label::NotSpam => write!(f, "Not_Spam"),
            Label::Spam => write!(f, "Spam"),
        }
    }
}

/// A feature table and its row-aligned label vector. Immutable after load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    features: Array2<f64>,
    labels: Vec<Label>,
    feature_names: Vec<String>,
}

impl Dataset {
    /// Pair a feature matrix with a label vector.
    pub fn new(
        features: Array2<f64>,
        labels: Vec<Label>,
        feature_names: Vec<String>,
    ) -> Result<Self> {
        if features.nrows() != labels.len() {
            return Err(SpambenchError::ShapeError {
                expected: format!("{} labels", features.nrows()),
                actual: format!("{} labels", labels.len()),
            });
        }
        if features.ncols() != feature_names.len() {
            return Err(SpambenchError::ShapeError {
                expected: format!("{} feature names", features.ncols()),
                actual: format!("{} feature names", feature_names.len()),
            });
        }
        Ok(Self {
            features,
            labels,
            feature_names,
        })
    }

    pub fn n_rows(&self) -> usize {
        self.features.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    pub fn features(&self) -> &Array2<f64> {
        &self.features
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Labels as a numeric vector (0 = NotSpam, 1 = Spam)
    pub fn label_array(&self) -> Array1<f64> {
        Array1::from_iter(self.labels.iter().map(|l| l.as_f64()))
    }

    /// Rows belonging to each class, in row order
    pub fn class_counts(&self) -> (usize, usize) {
        let spam = self.labels.iter().filter(|l| l.is_spam()).count();
        (self.labels.len() - spam, spam)
    }

    /// New dataset containing the given rows, in the given order
    pub fn select_rows(&self, indices: &[usize]) -> Result<Self> {
        for &i in indices {
            if i >= self.n_rows() {
                return Err(SpambenchError::ValidationError(format!(
                    "row index {} out of bounds for {} rows",
                    i,
                    self.n_rows()
                )));
            }
        }
        let features = self.features.select(Axis(0), indices);
        let labels = indices.iter().map(|&i| self.labels[i]).collect();
        Ok(Self {
            features,
            labels,
            feature_names: self.feature_names.clone(),
        })
    }
}
