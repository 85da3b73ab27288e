/*!
 * # Forecasting Service
 *
 * Projects daily demand for the seven days after a start date, runs the
 * current stock down against it, and classifies how the stock holds up.
 */

use chrono::{Days, NaiveDate};
use std::fmt;
use tracing::debug;

use crate::errors::ServiceError;
use crate::ml::{FeatureVector, ProductEncoder, Regressor};
use crate::models::{round_to, DailyForecast, ForecastResult, StockAlert};

/// Days forecast after the start date.
pub const FORECAST_HORIZON_DAYS: u64 = 7;
/// Ending stock below this share of the starting stock raises a low-stock alert.
pub const LOW_STOCK_RATIO: f64 = 0.2;
/// Safety margin applied to the weekly total for the reorder quantity.
pub const REORDER_BUFFER: f64 = 1.1;

/// A model paired with the encoder it was trained with.
#[derive(Clone, Copy)]
pub struct Forecaster<'a> {
    model: &'a dyn Regressor,
    encoder: &'a ProductEncoder,
}

impl fmt::Debug for Forecaster<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Forecaster")
            .field("products", &self.encoder.len())
            .finish_non_exhaustive()
    }
}

impl<'a> Forecaster<'a> {
    pub fn new(model: &'a dyn Regressor, encoder: &'a ProductEncoder) -> Self {
        Self { model, encoder }
    }

    pub fn knows(&self, product: &str) -> bool {
        self.encoder.encode(product).is_some()
    }

    /// Forecasts `product` for the week after `start_date` given
    /// `stock_on_hand` units in stock.
    pub fn forecast(
        &self,
        product: &str,
        stock_on_hand: f64,
        start_date: NaiveDate,
    ) -> Result<ForecastResult, ServiceError> {
        if product.trim().is_empty() {
            return Err(ServiceError::MissingProduct);
        }
        if !stock_on_hand.is_finite() || stock_on_hand < 0.0 {
            return Err(ServiceError::InvalidInput(
                "stock_actual must be a non-negative number".into(),
            ));
        }
        let code = self
            .encoder
            .encode(product)
            .ok_or_else(|| ServiceError::UnknownProduct(product.to_string()))?;

        let mut remaining = stock_on_hand;
        let mut depletion_date = None;
        let mut daily = Vec::with_capacity(FORECAST_HORIZON_DAYS as usize);

        for offset in 1..=FORECAST_HORIZON_DAYS {
            let date = start_date
                .checked_add_days(Days::new(offset))
                .ok_or_else(|| ServiceError::InvalidInput("fecha is out of range".into()))?;
            let predicted = self
                .model
                .predict(&FeatureVector::new(date, code))
                .map_err(|err| ServiceError::InternalError(err.to_string()))?
                .max(0.0);

            remaining -= predicted;
            if depletion_date.is_none() && remaining <= 0.0 {
                depletion_date = Some(date);
            }

            daily.push(DailyForecast {
                date,
                predicted: round_to(predicted, 2),
            });
        }

        let weekly_total = round_to(daily.iter().map(|day| day.predicted).sum(), 2);
        let tomorrow = daily.first().map(|day| day.predicted).unwrap_or_default();

        let alert = match depletion_date {
            Some(date) => StockAlert::Urgent {
                depletion_date: date,
            },
            None if remaining < stock_on_hand * LOW_STOCK_RATIO => StockAlert::LowStock,
            None => StockAlert::Healthy,
        };

        debug!(
            product,
            code,
            weekly_total,
            remaining,
            depleted = depletion_date.is_some(),
            "forecast computed"
        );

        Ok(ForecastResult {
            product: product.to_string(),
            tomorrow,
            weekly_total,
            recommended_inventory: round_to(weekly_total * REORDER_BUFFER, 0) as u64,
            depletion_date,
            alert,
            daily,
        })
    }
}
