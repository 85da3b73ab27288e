/*!
 * # Machine Learning Module
 *
 * Models and feature engineering behind the demand forecast:
 *
 * - [`ProductEncoder`] maps product names to stable integer codes
 * - [`FeatureVector`] turns a calendar day and product code into model input
 * - [`RandomForestRegressor`] wraps smartcore's regression forest that
 *   predicts units sold
 * - [`least_squares_slope`] fits the linear trend used for rising / falling
 *   classification
 */

pub mod encoder;
pub mod features;
pub mod random_forest;
pub mod regression;

pub use encoder::ProductEncoder;
pub use features::{FeatureVector, N_FEATURES};
pub use random_forest::{RandomForestConfig, RandomForestRegressor};
pub use regression::least_squares_slope;

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("cannot fit a model on an empty training set")]
    EmptyTrainingSet,
    #[error("feature matrix has {rows} rows but {targets} targets were given")]
    ShapeMismatch { rows: usize, targets: usize },
    #[error("invalid model configuration: {0}")]
    InvalidConfig(String),
    #[error("model fitting failed: {0}")]
    Fit(String),
    #[error("expected {expected} features, got {found}")]
    FeatureCount { expected: usize, found: usize },
    #[error("prediction failed: {0}")]
    Predict(String),
}

/// Anything that can turn a feature vector into a predicted quantity.
pub trait Regressor: Send + Sync {
    fn predict(&self, features: &FeatureVector) -> Result<f64, ModelError>;
}

impl<R: Regressor + ?Sized> Regressor for &R {
    fn predict(&self, features: &FeatureVector) -> Result<f64, ModelError> {
        (**self).predict(features)
    }
}
