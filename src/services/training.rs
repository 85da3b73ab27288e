//! Offline training: cleaned dataset in, artifact bundle out.

use ndarray::{Array1, Array2};
use std::path::Path;
use tracing::{info, warn};

use super::analytics::{compute_peak_hours, compute_trends, DEFAULT_TREND_WINDOW_DAYS};
use super::dataset::{load_dataset, Dataset, TIME_OF_SALE_COLUMN};
use crate::artifacts::{ArtifactBundle, BundleMetadata};
use crate::errors::TrainError;
use crate::ml::{FeatureVector, ProductEncoder, RandomForestConfig, RandomForestRegressor, N_FEATURES};
use crate::models::PeakHourTable;

#[derive(Debug, Clone, PartialEq)]
pub struct TrainingOptions {
    pub forest: RandomForestConfig,
    pub trend_window_days: i64,
}

impl Default for TrainingOptions {
    fn default() -> Self {
        Self {
            forest: RandomForestConfig::default(),
            trend_window_days: DEFAULT_TREND_WINDOW_DAYS,
        }
    }
}

/// What a finished training run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingSummary {
    pub records: usize,
    pub products: usize,
    pub trees: usize,
    pub buckets: usize,
}

impl TrainingSummary {
    fn of(bundle: &ArtifactBundle) -> Self {
        Self {
            records: bundle.metadata.training_records,
            products: bundle.encoder.len(),
            trees: bundle.model.n_trees(),
            buckets: bundle.peak_hours.len(),
        }
    }
}

/// Fits every artifact from `dataset`.
pub fn train(dataset: &Dataset, options: &TrainingOptions) -> Result<ArtifactBundle, TrainError> {
    if dataset.is_empty() {
        return Err(TrainError::EmptyDataset);
    }
    let records = &dataset.records;

    let names: Vec<&str> = records.iter().map(|r| r.product.as_str()).collect();
    let (encoder, codes) = ProductEncoder::fit_transform(&names);

    let rows: Vec<[f64; N_FEATURES]> = records
        .iter()
        .zip(codes)
        .map(|(record, code)| FeatureVector::new(record.date, code).to_array())
        .collect();
    let features = Array2::from_shape_fn((rows.len(), N_FEATURES), |(i, j)| rows[i][j]);
    let targets: Array1<f64> = records.iter().map(|r| r.quantity).collect();

    info!(
        records = records.len(),
        products = encoder.len(),
        trees = options.forest.n_trees,
        "fitting demand model"
    );
    let model = RandomForestRegressor::fit(&features, &targets, options.forest.clone())?;

    let trends = compute_trends(records, options.trend_window_days);

    let peak_hours = if dataset.has_time_of_sale {
        compute_peak_hours(records)
    } else {
        warn!(
            "dataset has no '{}' column; peak-hour table left empty",
            TIME_OF_SALE_COLUMN
        );
        PeakHourTable::default()
    };

    Ok(ArtifactBundle {
        metadata: BundleMetadata::new(records.len()),
        model,
        encoder,
        trends,
        peak_hours,
    })
}

/// Loads the dataset, trains, and writes the bundle to `output`.
pub fn run(dataset_path: &Path, output: &Path, options: &TrainingOptions) -> Result<TrainingSummary, TrainError> {
    let dataset = load_dataset(dataset_path)?;
    let bundle = train(&dataset, options)?;
    bundle.save(output)?;

    let summary = TrainingSummary::of(&bundle);
    info!(
        output = %output.display(),
        records = summary.records,
        products = summary.products,
        buckets = summary.buckets,
        "artifact bundle written"
    );
    Ok(summary)
}
