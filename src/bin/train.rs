use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tracing::{error, info};

use demand_forecast::{
    config,
    errors::TrainError,
    ml::RandomForestConfig,
    services::{
        analytics::DEFAULT_TREND_WINDOW_DAYS,
        training::{self, TrainingOptions},
    },
};

#[derive(Parser, Debug)]
#[command(
    name = "demand-train",
    about = "Train the demand model and write the artifact bundle",
    version
)]
struct Cli {
    /// Sales CSV with date, item_name, quantity and optionally time_of_sale
    #[arg(long, default_value = "dataset_convertido.csv")]
    dataset: PathBuf,

    /// Where to write the artifact bundle
    #[arg(long, default_value = "forecast_artifacts.json")]
    output: PathBuf,

    /// Number of trees in the forest
    #[arg(long, default_value_t = 100)]
    trees: usize,

    /// Seed for bootstrap sampling
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Maximum tree depth (unbounded when omitted)
    #[arg(long)]
    max_depth: Option<u16>,

    /// Minimum rows a node needs before it may be split
    #[arg(long, default_value_t = 2)]
    min_samples_split: usize,

    /// Days before the latest sale that feed trend detection
    #[arg(long, default_value_t = DEFAULT_TREND_WINDOW_DAYS)]
    trend_window_days: i64,

    #[arg(long, default_value = "info")]
    log_level: String,

    #[arg(long, action = ArgAction::SetTrue, help = "Emit structured JSON logs")]
    log_json: bool,
}

impl Cli {
    fn options(&self) -> TrainingOptions {
        TrainingOptions {
            forest: RandomForestConfig {
                n_trees: self.trees,
                seed: self.seed,
                max_depth: self.max_depth,
                min_samples_split: self.min_samples_split,
                ..Default::default()
            },
            trend_window_days: self.trend_window_days,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    config::init_tracing(&cli.log_level, cli.log_json);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if let Some(TrainError::DatasetNotFound(path)) = err.downcast_ref::<TrainError>() {
                error!(
                    path = %path.display(),
                    "dataset not found; place it next to the trainer or pass --dataset"
                );
            } else {
                error!("training failed: {:#}", err);
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    info!(dataset = %cli.dataset.display(), "loading and cleaning data");
    let summary = training::run(&cli.dataset, &cli.output, &cli.options())
        .with_context(|| format!("training from {} failed", cli.dataset.display()))?;

    info!(
        records = summary.records,
        products = summary.products,
        trees = summary.trees,
        buckets = summary.buckets,
        output = %cli.output.display(),
        "training complete"
    );
    Ok(())
}
