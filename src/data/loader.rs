//! Dataset loading from the delimited flat file
//!
//! Each row carries exactly 58 comma-separated numeric fields: 57 predictors
//! followed by the binary label (0 = Not_Spam, 1 = Spam). There is no header
//! row. Exact-duplicate rows are dropped before the Dataset is final.

use crate::data::dataset::{Dataset, Label};
use crate::data::schema;
use crate::error::{Result, SpambenchError};
use ndarray::Array2;
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

/// Integrity counts reported by a successful load
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LoadReport {
    /// Rows read from the file, duplicates included
    pub rows_read: usize,
    /// Exact-duplicate rows removed (all 58 fields identical)
    pub duplicates_removed: usize,
    /// Rows in the final dataset
    pub rows_kept: usize,
}

/// Loader for the fixed-schema spambase table
pub struct DatasetLoader {
    feature_names: Vec<String>,
}

impl Default for DatasetLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DatasetLoader {
    /// Loader with the canonical spambase column names
    pub fn new() -> Self {
        Self {
            feature_names: schema::feature_names(),
        }
    }

    /// Loader with caller-supplied predictor names (count must stay 57)
    pub fn with_feature_names(mut self, names: Vec<String>) -> Self {
        self.feature_names = names;
        self
    }

    /// Read the file into a deduplicated Dataset.
    ///
    /// Fails with `MalformedRow` on the first row with a wrong field count,
    /// a non-numeric or non-finite predictor, or an out-of-domain label —
    /// nothing is coerced to missing.
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<(Dataset, LoadReport)> {
        let n_features = self.feature_names.len();
        let n_fields = n_features + 1;

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path.as_ref())
            .map_err(|e| SpambenchError::ValidationError(e.to_string()))?;

        let mut rows: Vec<f64> = Vec::new();
        let mut labels: Vec<Label> = Vec::new();
        let mut seen: HashSet<Vec<u64>> = HashSet::new();
        let mut rows_read = 0usize;
        let mut duplicates_removed = 0usize;

        for (idx, record) in reader.records().enumerate() {
            let row_no = idx + 1;
            let record = record?;
            rows_read += 1;

            if record.len() != n_fields {
                return Err(SpambenchError::MalformedRow {
                    row: row_no,
                    reason: format!("expected {} fields, found {}", n_fields, record.len()),
                });
            }

            let mut fields = Vec::with_capacity(n_fields);
            for (col, raw) in record.iter().enumerate() {
                let value: f64 = raw.trim().parse().map_err(|_| SpambenchError::MalformedRow {
                    row: row_no,
                    reason: format!("non-numeric value {:?} in field {}", raw, col + 1),
                })?;
                if !value.is_finite() {
                    return Err(SpambenchError::MalformedRow {
                        row: row_no,
                        reason: format!("non-finite value in field {}", col + 1),
                    });
                }
                fields.push(value);
            }

            let label = Label::from_code(fields[n_features]).ok_or_else(|| {
                SpambenchError::MalformedRow {
                    row: row_no,
                    reason: format!("label must be 0 or 1, found {}", fields[n_features]),
                }
            })?;

            // Duplicate detection over all 58 fields, bit-exact
            let key: Vec<u64> = fields.iter().map(|v| v.to_bits()).collect();
            if !seen.insert(key) {
                duplicates_removed += 1;
                continue;
            }

            rows.extend_from_slice(&fields[..n_features]);
            labels.push(label);
        }

        let rows_kept = labels.len();
        if rows_kept == 0 {
            return Err(SpambenchError::ValidationError(
                "input file contains no rows".to_string(),
            ));
        }

        let features = Array2::from_shape_vec((rows_kept, n_features), rows)?;
        let dataset = Dataset::new(features, labels, self.feature_names.clone())?;

        let (not_spam, spam) = dataset.class_counts();
        info!(
            rows_read,
            duplicates_removed, rows_kept, not_spam, spam, "dataset loaded"
        );

        let report = LoadReport {
            rows_read,
            duplicates_removed,
            rows_kept,
        };
        Ok((dataset, report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_rows(rows: &[String]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for row in rows {
            writeln!(file, "{}", row).unwrap();
        }
        file.flush().unwrap();
        file
    }

    fn numeric_row(fill: f64, label: u8) -> String {
        let mut fields: Vec<String> = (0..57).map(|i| format!("{}", fill + i as f64)).collect();
        fields.push(label.to_string());
        fields.join(",")
    }

    #[test]
    fn test_load_and_dedup() {
        let rows = vec![
            numeric_row(0.0, 0),
            numeric_row(1.0, 1),
            numeric_row(0.0, 0), // exact duplicate
            numeric_row(2.0, 1),
        ];
        let file = write_rows(&rows);
        let (dataset, report) = DatasetLoader::new().load(file.path()).unwrap();

        assert_eq!(report.rows_read, 4);
        assert_eq!(report.duplicates_removed, 1);
        assert_eq!(report.rows_kept, 3);
        assert_eq!(dataset.n_rows(), 3);
        assert_eq!(dataset.n_features(), 57);
        assert_eq!(dataset.class_counts(), (1, 2));
    }

    #[test]
    fn test_wrong_field_count_names_row() {
        let rows = vec![numeric_row(0.0, 0), "1.0,2.0,3.0".to_string()];
        let file = write_rows(&rows);
        let err = DatasetLoader::new().load(file.path()).unwrap_err();
        match err {
            SpambenchError::MalformedRow { row, .. } => assert_eq!(row, 2),
            other => panic!("expected MalformedRow, got {:?}", other),
        }
    }

    #[test]
    fn test_non_numeric_field_fails() {
        let mut bad = numeric_row(0.0, 1);
        bad = bad.replacen("3", "oops", 1);
        let file = write_rows(&[numeric_row(1.0, 0), bad]);
        let err = DatasetLoader::new().load(file.path()).unwrap_err();
        assert!(matches!(err, SpambenchError::MalformedRow { row: 2, .. }));
    }

    #[test]
    fn test_bad_label_fails() {
        let file = write_rows(&[numeric_row(0.0, 3)]);
        let err = DatasetLoader::new().load(file.path()).unwrap_err();
        match err {
            SpambenchError::MalformedRow { row, reason } => {
                assert_eq!(row, 1);
                assert!(reason.contains("label"));
            }
            other => panic!("expected MalformedRow, got {:?}", other),
        }
    }
}
