//! Trend detection and peak-hour aggregation over cleaned sales records.

use chrono::Duration;
use std::collections::{BTreeMap, HashMap};

use crate::ml::least_squares_slope;
use crate::models::{round_to, PeakHourTable, SalesRecord, TrendEntry, TrendStatus, TrendTable};

pub const DEFAULT_TREND_WINDOW_DAYS: i64 = 30;

/// Decimal places kept on a stored slope.
const SLOPE_DECIMALS: u32 = 3;

/// Builds one trend entry per product, in first-appearance order.
///
/// Only records dated within `window_days` of the latest date contribute.
/// Each product's quantities are summed per day and the slope is fitted
/// against the day's position in that series, not the calendar gap.
pub fn compute_trends(records: &[SalesRecord], window_days: i64) -> TrendTable {
    let mut table = TrendTable::default();
    let Some(latest) = records.iter().map(|r| r.date).max() else {
        return table;
    };
    let window_start = latest - Duration::days(window_days);

    let mut order: Vec<&str> = Vec::new();
    let mut daily: HashMap<&str, BTreeMap<_, f64>> = HashMap::new();
    for record in records {
        let product = record.product.as_str();
        let series = daily.entry(product).or_insert_with(|| {
            order.push(product);
            BTreeMap::new()
        });
        if record.date >= window_start {
            *series.entry(record.date).or_insert(0.0) += record.quantity;
        }
    }

    for product in order {
        let values: Vec<f64> = daily
            .get(product)
            .map(|series| series.values().copied().collect())
            .unwrap_or_default();

        let entry = if values.len() < 2 {
            TrendEntry::stable()
        } else {
            let slope = least_squares_slope(&values);
            TrendEntry {
                slope: round_to(slope, SLOPE_DECIMALS),
                status: TrendStatus::from_slope(slope),
            }
        };
        table.push(product, entry);
    }

    table
}

/// Sums quantity per time-of-sale bucket, highest total first. Records
/// without a bucket are ignored.
pub fn compute_peak_hours(records: &[SalesRecord]) -> PeakHourTable {
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for record in records {
        if let Some(bucket) = record.time_of_sale.as_deref() {
            *totals.entry(bucket).or_insert(0.0) += record.quantity;
        }
    }
    PeakHourTable::from_totals(totals)
}
