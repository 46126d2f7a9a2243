//! Command-line entry point for the spambase benchmark harness

use anyhow::Context;
use clap::Parser;
use spambench::config::HarnessConfig;
use spambench::data::schema::N_FEATURES;
use spambench::evaluation;
use spambench::pipeline;
use spambench::training::default_registry;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "spambench",
    about = "Benchmark classifiers on the spambase dataset",
    version
)]
struct Args {
    /// Path to the spambase data file (58 comma-separated fields per row)
    data: PathBuf,

    /// Fraction of each class placed in the training partition
    #[arg(long, default_value_t = 0.8)]
    split_fraction: f64,

    /// Random seed for the split and all cross-validation shuffles
    #[arg(long, default_value_t = spambench::config::DEFAULT_SEED)]
    seed: u64,

    /// Number of cross-validation folds
    #[arg(long, default_value_t = 5)]
    cv_folds: usize,

    /// Write full results (resampling records included) as JSON
    #[arg(long)]
    json_out: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "spambench=info".into()),
        )
        .init();

    let args = Args::parse();

    let config = HarnessConfig::new()
        .with_split_fraction(args.split_fraction)
        .with_random_seed(args.seed)
        .with_cv_folds(args.cv_folds);

    let registry = default_registry(N_FEATURES, config.random_seed);
    let output = pipeline::run(&config, &args.data, registry)
        .with_context(|| format!("benchmark failed for {}", args.data.display()))?;

    println!(
        "Loaded {} rows ({} duplicates removed); {} train / {} holdout",
        output.load_report.rows_kept,
        output.load_report.duplicates_removed,
        output.train_rows,
        output.holdout_rows
    );
    println!("{}", evaluation::render_text(&output.results));

    if let Some(path) = &args.json_out {
        evaluation::write_json(&output.results, path)
            .with_context(|| format!("could not write {}", path.display()))?;
        println!("Results written to {}", path.display());
    }

    // A failed model is reported, not hidden; signal it in the exit code
    if output.results.n_failed() > 0 {
        std::process::exit(2);
    }
    Ok(())
}
