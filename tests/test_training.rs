//! Integration tests for model training and grid-search selection

use ndarray::{Array1, Array2};
use spambench::training::{
    default_registry, stratified_k_fold, train, Classifier, CvSpec, ForestParams, Kernel,
    LogisticParams, LogisticRegression, ModelGrid, ModelSpec, RandomForest, SvmClassifier,
    SvmParams,
};

/// Two well-separated Gaussian-ish blobs in `n_features` dimensions
fn blob_data(n_per_class: usize, n_features: usize) -> (Array2<f64>, Array1<f64>) {
    let mut rows = Vec::new();
    let mut labels = Vec::new();
    for class in 0..2 {
        let center = class as f64 * 4.0;
        for i in 0..n_per_class {
            for j in 0..n_features {
                let jitter = ((i * 13 + j * 7) % 17) as f64 * 0.05;
                rows.push(center + jitter);
            }
            labels.push(class as f64);
        }
    }
    (
        Array2::from_shape_vec((2 * n_per_class, n_features), rows).unwrap(),
        Array1::from_vec(labels),
    )
}

fn accuracy(predictions: &Array1<f64>, truth: &Array1<f64>) -> f64 {
    predictions
        .iter()
        .zip(truth.iter())
        .filter(|(p, a)| (*p - *a).abs() < 0.5)
        .count() as f64
        / truth.len() as f64
}

#[test]
fn test_logistic_regression_separates_blobs() {
    let (x, y) = blob_data(40, 4);
    let mut model = LogisticRegression::new(LogisticParams::default());
    model.fit(&x, &y).unwrap();
    assert!(accuracy(&model.predict(&x).unwrap(), &y) > 0.95);
}

#[test]
fn test_random_forest_separates_blobs() {
    let (x, y) = blob_data(40, 4);
    let mut model = RandomForest::new(ForestParams {
        n_estimators: 30,
        max_features: 2,
        min_samples_leaf: 1,
        random_state: 42,
    });
    model.fit(&x, &y).unwrap();
    assert!(accuracy(&model.predict(&x).unwrap(), &y) > 0.95);
}

#[test]
fn test_rbf_svm_separates_blobs() {
    let (x, y) = blob_data(30, 4);
    let mut model = SvmClassifier::new(SvmParams {
        c: 1.0,
        kernel: Kernel::Rbf { gamma: 0.25 },
        ..Default::default()
    });
    model.fit(&x, &y).unwrap();
    assert!(accuracy(&model.predict(&x).unwrap(), &y) > 0.9);
}

#[test]
fn test_grid_search_uses_identical_folds_per_point() {
    // With a constant-seed CvSpec every grid point must see the same folds,
    // so two runs of the same grid select the same point deterministically.
    let (x, y) = blob_data(40, 3);
    let cv = CvSpec { folds: 5, seed: 2025 };
    let spec = ModelSpec::new(
        "logistic",
        ModelGrid::Logistic(vec![
            LogisticParams {
                l2_penalty: 0.001,
                ..Default::default()
            },
            LogisticParams {
                l2_penalty: 0.1,
                ..Default::default()
            },
        ]),
    );

    let (_, a) = train(&spec, &x, &y, &cv).unwrap();
    let (_, b) = train(&spec, &x, &y, &cv).unwrap();
    assert_eq!(a.selected_index, b.selected_index);
    assert_eq!(a.grid_summary.len(), 2);
    for (pa, pb) in a.grid_summary.iter().zip(b.grid_summary.iter()) {
        assert_eq!(pa.mean_auc, pb.mean_auc);
    }
}

#[test]
fn test_grid_summary_covers_every_point() {
    let (x, y) = blob_data(40, 3);
    let cv = CvSpec { folds: 5, seed: 7 };
    let spec = ModelSpec::new(
        "forest",
        ModelGrid::RandomForest(
            [1, 2, 3]
                .into_iter()
                .map(|max_features| ForestParams {
                    n_estimators: 10,
                    max_features,
                    min_samples_leaf: 1,
                    random_state: 7,
                })
                .collect(),
        ),
    );

    let (_, resample) = train(&spec, &x, &y, &cv).unwrap();
    assert_eq!(resample.grid_summary.len(), 3);
    for (i, point) in resample.grid_summary.iter().enumerate() {
        assert_eq!(point.index, i);
        assert!(point.is_valid());
        assert!(point.mean_auc.is_finite());
    }
    assert_eq!(resample.fold_metrics.len(), 5);
}

#[test]
fn test_default_registry_matches_protocol() {
    let registry = default_registry(57, 2025);
    let names: Vec<&str> = registry.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["logistic", "random_forest", "rbf_svm"]);

    let forest_descriptions: Vec<String> =
        (0..registry[1].grid.len()).map(|i| registry[1].grid.describe(i)).collect();
    assert_eq!(forest_descriptions[0], "n_estimators=300, max_features=6");
    assert_eq!(forest_descriptions[1], "n_estimators=300, max_features=12");
    assert_eq!(forest_descriptions[2], "n_estimators=300, max_features=18");

    let svm_descriptions: Vec<String> =
        (0..registry[2].grid.len()).map(|i| registry[2].grid.describe(i)).collect();
    assert!(svm_descriptions[0].starts_with("C=0.5,"));
    assert!(svm_descriptions[1].starts_with("C=1,"));
    assert!(svm_descriptions[2].starts_with("C=2,"));
}

#[test]
fn test_stratified_folds_reusable_across_models() {
    let (_, y) = blob_data(50, 2);
    let spec = CvSpec { folds: 5, seed: 2025 };
    let first = stratified_k_fold(&y, &spec).unwrap();
    let second = stratified_k_fold(&y, &spec).unwrap();
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.validation_indices, b.validation_indices);
        assert_eq!(a.train_indices, b.train_indices);
    }
}

#[test]
fn test_svm_rejects_single_class() {
    let x = Array2::from_shape_fn((10, 2), |(i, j)| (i + j) as f64);
    let y = Array1::from_vec(vec![1.0; 10]);
    let mut model = SvmClassifier::new(SvmParams::default());
    assert!(model.fit(&x, &y).is_err());
}
