//! Benchmarks for the training and evaluation hot paths

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use ndarray::{Array1, Array2};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use spambench::evaluation::roc_curve;
use spambench::preprocessing::StandardScaler;
use spambench::training::{
    stratified_k_fold, Classifier, CvSpec, ForestParams, Kernel, LogisticParams,
    LogisticRegression, RandomForest, SvmClassifier, SvmParams,
};

fn synthetic(n_rows: usize, n_features: usize, seed: u64) -> (Array2<f64>, Array1<f64>) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let y = Array1::from_shape_fn(n_rows, |i| (i % 2) as f64);
    let x = Array2::from_shape_fn((n_rows, n_features), |(i, _)| {
        (i % 2) as f64 * 2.0 + rng.gen::<f64>()
    });
    (x, y)
}

fn bench_scaler(c: &mut Criterion) {
    let (x, _) = synthetic(4000, 57, 1);
    let scaler = StandardScaler::fit(&x).unwrap();

    c.bench_function("scaler_fit_4000x57", |b| {
        b.iter(|| StandardScaler::fit(&x).unwrap())
    });
    c.bench_function("scaler_transform_4000x57", |b| {
        b.iter(|| scaler.transform(&x).unwrap())
    });
}

fn bench_fold_generation(c: &mut Criterion) {
    let (_, y) = synthetic(4000, 1, 2);
    c.bench_function("stratified_k_fold_4000", |b| {
        b.iter(|| stratified_k_fold(&y, &CvSpec { folds: 5, seed: 42 }).unwrap())
    });
}

fn bench_logistic(c: &mut Criterion) {
    let (x, y) = synthetic(1000, 57, 3);
    c.bench_function("logistic_fit_1000x57", |b| {
        b.iter(|| {
            let mut model = LogisticRegression::new(LogisticParams::default());
            model.fit(&x, &y).unwrap();
        })
    });
}

fn bench_forest(c: &mut Criterion) {
    let (x, y) = synthetic(500, 57, 4);
    let mut group = c.benchmark_group("forest_fit_500x57");
    group.sample_size(10);
    for n_trees in [20, 50] {
        group.bench_with_input(
            BenchmarkId::from_parameter(n_trees),
            &n_trees,
            |b, &n_trees| {
                b.iter(|| {
                    let mut model = RandomForest::new(ForestParams {
                        n_estimators: n_trees,
                        max_features: 6,
                        min_samples_leaf: 1,
                        random_state: 42,
                    });
                    model.fit(&x, &y).unwrap();
                })
            },
        );
    }
    group.finish();
}

fn bench_svm(c: &mut Criterion) {
    let (x, y) = synthetic(300, 57, 5);
    let mut group = c.benchmark_group("svm_fit_300x57");
    group.sample_size(10);
    group.bench_function("rbf", |b| {
        b.iter(|| {
            let mut model = SvmClassifier::new(SvmParams {
                c: 1.0,
                kernel: Kernel::Rbf { gamma: 1.0 / 57.0 },
                ..Default::default()
            });
            model.fit(&x, &y).unwrap();
        })
    });
    group.finish();
}

fn bench_roc(c: &mut Criterion) {
    let mut rng = ChaCha8Rng::seed_from_u64(6);
    let y = Array1::from_shape_fn(4000, |i| (i % 2) as f64);
    let scores = Array1::from_shape_fn(4000, |_| rng.gen::<f64>());
    c.bench_function("roc_curve_4000", |b| {
        b.iter(|| roc_curve(&y, &scores).unwrap())
    });
}

criterion_group!(
    benches,
    bench_scaler,
    bench_fold_generation,
    bench_logistic,
    bench_forest,
    bench_svm,
    bench_roc
);
criterion_main!(benches);
