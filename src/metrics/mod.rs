/*!
 * # Metrics Module
 *
 * In-process counters and histograms for the forecasting service.
 *
 * ## Metrics Formats
 *
 * - Prometheus text format at `/metrics`
 * - JSON format at `/metrics/json`
 */

use dashmap::DashMap;
use serde_json::json;
use std::fmt::Write as _;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Failed to export metrics: {0}")]
    ExportError(String),
}

#[derive(Debug, Clone, Default)]
pub struct Counter {
    value: Arc<AtomicU64>,
}

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

/// Count and running sum of observations. The sum is kept in micro-units so
/// fractional observations survive the atomic integer store.
#[derive(Debug, Clone, Default)]
pub struct Histogram {
    sum_micros: Arc<AtomicU64>,
    count: Arc<AtomicU64>,
}

impl Histogram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&self, value: f64) {
        let micros = (value.max(0.0) * 1_000_000.0) as u64;
        self.sum_micros.fetch_add(micros, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn get_sum(&self) -> f64 {
        self.sum_micros.load(Ordering::Relaxed) as f64 / 1_000_000.0
    }
}

#[derive(Debug, Default)]
pub struct MetricsRegistry {
    counters: DashMap<String, Counter>,
    histograms: DashMap<String, Histogram>,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_create_counter(&self, name: &str) -> Counter {
        self.counters
            .entry(name.to_string())
            .or_insert_with(Counter::new)
            .clone()
    }

    pub fn get_or_create_histogram(&self, name: &str) -> Histogram {
        self.histograms
            .entry(name.to_string())
            .or_insert_with(Histogram::new)
            .clone()
    }

    pub fn export_metrics(&self) -> Result<String, MetricsError> {
        let mut output = String::new();

        let mut counters: Vec<(String, u64)> = self
            .counters
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().get()))
            .collect();
        counters.sort();
        for (name, value) in counters {
            writeln!(output, "# TYPE {} counter", name)
                .and_then(|_| writeln!(output, "{} {}", name, value))
                .map_err(|e| MetricsError::ExportError(e.to_string()))?;
        }

        let mut histograms: Vec<(String, u64, f64)> = self
            .histograms
            .iter()
            .map(|entry| {
                let h = entry.value();
                (entry.key().clone(), h.get_count(), h.get_sum())
            })
            .collect();
        histograms.sort_by(|a, b| a.0.cmp(&b.0));
        for (name, count, sum) in histograms {
            writeln!(output, "# TYPE {} histogram", name)
                .and_then(|_| writeln!(output, "{}_count {}", name, count))
                .and_then(|_| writeln!(output, "{}_sum {}", name, sum))
                .map_err(|e| MetricsError::ExportError(e.to_string()))?;
        }

        Ok(output)
    }

    pub fn export_metrics_json(&self) -> Result<serde_json::Value, MetricsError> {
        let mut counters = serde_json::Map::new();
        for entry in self.counters.iter() {
            counters.insert(entry.key().clone(), json!(entry.value().get()));
        }

        let mut histograms = serde_json::Map::new();
        for entry in self.histograms.iter() {
            let histogram = entry.value();
            histograms.insert(
                entry.key().clone(),
                json!({
                    "count": histogram.get_count(),
                    "sum": histogram.get_sum(),
                }),
            );
        }

        Ok(json!({
            "counters": counters,
            "histograms": histograms,
        }))
    }
}

// Global metrics registry
lazy_static::lazy_static! {
    pub static ref METRICS: MetricsRegistry = MetricsRegistry::new();
}

pub fn increment_counter(name: &str) {
    METRICS.get_or_create_counter(name).inc();
}

pub fn observe_histogram(name: &str, value: f64) {
    METRICS.get_or_create_histogram(name).observe(value);
}

/// A forecast was served successfully.
pub fn record_forecast(duration: Duration) {
    increment_counter("forecasts_total");
    observe_histogram("forecast_duration_ms", duration.as_secs_f64() * 1000.0);
}

/// A forecast request failed; `kind` is the error's metrics label.
pub fn record_forecast_error(kind: &str) {
    increment_counter("forecast_errors_total");
    increment_counter(&format!("forecast_errors_{}_total", kind));
}

pub fn record_dashboard(success: bool) {
    if success {
        increment_counter("dashboard_requests_total");
    } else {
        increment_counter("dashboard_errors_total");
    }
}

// HTTP endpoint handler for metrics
pub async fn metrics_handler() -> Result<String, MetricsError> {
    METRICS.export_metrics()
}

pub async fn metrics_json_handler() -> Result<serde_json::Value, MetricsError> {
    METRICS.export_metrics_json()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exports_counters_and_histograms_as_prometheus_text() {
        let registry = MetricsRegistry::new();
        registry.get_or_create_counter("b_total").inc();
        registry.get_or_create_counter("a_total").inc();
        registry.get_or_create_counter("a_total").inc();
        registry.get_or_create_histogram("latency_ms").observe(1.5);
        registry.get_or_create_histogram("latency_ms").observe(2.5);

        let text = registry.export_metrics().unwrap();
        assert!(text.contains("# TYPE a_total counter\na_total 2\n"));
        assert!(text.contains("b_total 1\n"));
        assert!(text.contains("latency_ms_count 2\n"));
        assert!(text.contains("latency_ms_sum 4\n"));
        assert!(text.find("a_total").unwrap() < text.find("b_total").unwrap());
    }

    #[test]
    fn exports_json() {
        let registry = MetricsRegistry::new();
        registry.get_or_create_counter("forecasts_total").inc();
        let value = registry.export_metrics_json().unwrap();
        assert_eq!(value["counters"]["forecasts_total"], 1);
        assert!(value["histograms"].as_object().unwrap().is_empty());
    }
}
