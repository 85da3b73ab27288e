// Offline training pipeline
pub mod dataset;
pub mod analytics;
pub mod training;

// Request-time services over the loaded artifacts
pub mod dashboard;
pub mod forecasting;
