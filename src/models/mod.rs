//! Domain types shared by the trainer and the forecasting service.

pub mod dashboard;
pub mod forecast;
pub mod peak_hours;
pub mod sales;
pub mod trend;

pub use dashboard::{DashboardResult, OperationalRecommendations, WeeklySummary};
pub use forecast::{DailyForecast, ForecastResult, StockAlert};
pub use peak_hours::{PeakHour, PeakHourTable};
pub use sales::SalesRecord;
pub use trend::{TrendEntry, TrendRecord, TrendStatus, TrendTable};

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds to `decimals` places, half to even, on the exact decimal value of
/// `value`. 2.675 is stored just below the midpoint and rounds to 2.67.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    Decimal::from_f64_retain(value)
        .map(|exact| exact.round_dp_with_strategy(decimals, RoundingStrategy::MidpointNearestEven))
        .and_then(|rounded| rounded.to_f64())
        .unwrap_or(value)
}
