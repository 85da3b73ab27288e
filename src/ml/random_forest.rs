/*!
 * # Random Forest Regressor
 *
 * Demand model backed by smartcore's bagged regression-tree ensemble. Every
 * split considers all features, matching the usual regression default, and
 * the seed fixes the bootstrap samples so retraining on the same data gives
 * the same forest.
 *
 * The fitted forest serializes with serde so it travels inside the artifact
 * bundle.
 */

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use smartcore::ensemble::random_forest_regressor::{
    RandomForestRegressor as SmartcoreForest, RandomForestRegressorParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;
use tracing::debug;

use super::{FeatureVector, ModelError, Regressor};

type Forest = SmartcoreForest<f64, f64, DenseMatrix<f64>, Vec<f64>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestConfig {
    /// Number of trees in the ensemble
    pub n_trees: usize,
    /// Seed for bootstrap sampling
    pub seed: u64,
    /// Maximum tree depth; `None` grows until the other limits stop it
    pub max_depth: Option<u16>,
    /// Minimum rows a node needs before it may be split
    pub min_samples_split: usize,
    /// Minimum rows on each side of a split
    pub min_samples_leaf: usize,
}

impl Default for RandomForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            seed: 42,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

impl RandomForestConfig {
    fn validate(&self) -> Result<(), ModelError> {
        if self.n_trees == 0 {
            return Err(ModelError::InvalidConfig("n_trees must be at least 1".into()));
        }
        if self.min_samples_split < 2 {
            return Err(ModelError::InvalidConfig(
                "min_samples_split must be at least 2".into(),
            ));
        }
        if self.min_samples_leaf == 0 {
            return Err(ModelError::InvalidConfig(
                "min_samples_leaf must be at least 1".into(),
            ));
        }
        if self.max_depth == Some(0) {
            return Err(ModelError::InvalidConfig("max_depth must be at least 1".into()));
        }
        Ok(())
    }

    fn parameters(&self, n_features: usize) -> RandomForestRegressorParameters {
        let params = RandomForestRegressorParameters::default()
            .with_n_trees(self.n_trees)
            .with_seed(self.seed)
            .with_min_samples_split(self.min_samples_split)
            .with_min_samples_leaf(self.min_samples_leaf)
            .with_m(n_features);
        match self.max_depth {
            Some(depth) => params.with_max_depth(depth),
            None => params,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RandomForestRegressor {
    config: RandomForestConfig,
    n_features: usize,
    forest: Forest,
}

impl RandomForestRegressor {
    /// Fits a forest on `features` (one row per sample) against `targets`.
    pub fn fit(
        features: &Array2<f64>,
        targets: &Array1<f64>,
        config: RandomForestConfig,
    ) -> Result<Self, ModelError> {
        config.validate()?;

        let (n_rows, n_features) = features.dim();
        if n_rows == 0 {
            return Err(ModelError::EmptyTrainingSet);
        }
        if n_rows != targets.len() {
            return Err(ModelError::ShapeMismatch {
                rows: n_rows,
                targets: targets.len(),
            });
        }

        // `iter` walks the matrix in logical row-major order.
        let x = DenseMatrix::new(n_rows, n_features, features.iter().copied().collect(), false);
        let y: Vec<f64> = targets.to_vec();

        let forest = Forest::fit(&x, &y, config.parameters(n_features))
            .map_err(|err| ModelError::Fit(err.to_string()))?;
        debug!(
            rows = n_rows,
            features = n_features,
            trees = config.n_trees,
            "random forest fitted"
        );

        Ok(Self {
            config,
            n_features,
            forest,
        })
    }

    /// Mean prediction of all trees for one feature row.
    pub fn predict_row(&self, row: &[f64]) -> Result<f64, ModelError> {
        if row.len() != self.n_features {
            return Err(ModelError::FeatureCount {
                expected: self.n_features,
                found: row.len(),
            });
        }
        let x = DenseMatrix::new(1, row.len(), row.to_vec(), false);
        let predictions = self
            .forest
            .predict(&x)
            .map_err(|err| ModelError::Predict(err.to_string()))?;
        predictions
            .first()
            .copied()
            .ok_or_else(|| ModelError::Predict("forest returned no prediction".into()))
    }

    pub fn config(&self) -> &RandomForestConfig {
        &self.config
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_trees(&self) -> usize {
        self.config.n_trees
    }
}

impl Regressor for RandomForestRegressor {
    fn predict(&self, features: &FeatureVector) -> Result<f64, ModelError> {
        self.predict_row(&features.to_array())
    }
}
