//! Demand forecasting service library
//!
//! Offline training of the demand model and the HTTP API that serves
//! forecasts and trend dashboards from the trained artifacts.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod artifacts;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod health;
pub mod metrics;
pub mod middleware_helpers;
pub mod ml;
pub mod models;
pub mod openapi;
pub mod services;
pub mod tracing;

use axum::{http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use std::sync::Arc;

use crate::artifacts::ArtifactState;
use crate::config::AppConfig;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub artifacts: Arc<ArtifactState>,
}

impl AppState {
    pub fn new(config: AppConfig, artifacts: ArtifactState) -> Self {
        Self {
            config: Arc::new(config),
            artifacts: Arc::new(artifacts),
        }
    }
}

/// Forecast and dashboard endpoints
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(handlers::forecast::forecast_routes())
        .merge(handlers::dashboard::dashboard_routes())
}

fn metrics_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/metrics",
            get(|| async move {
                match metrics::metrics_handler().await {
                    Ok(body) => (StatusCode::OK, body).into_response(),
                    Err(err) => {
                        ::tracing::error!(error = %err, "metrics export failed");
                        (StatusCode::INTERNAL_SERVER_ERROR, "metrics error").into_response()
                    }
                }
            }),
        )
        .route(
            "/metrics/json",
            get(|| async move {
                match metrics::metrics_json_handler().await {
                    Ok(json) => (StatusCode::OK, Json(json)).into_response(),
                    Err(_) => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(serde_json::json!({"error": "metrics error"})),
                    )
                        .into_response(),
                }
            }),
        )
}

/// Full application router with request-id and HTTP tracing layers.
///
/// Deployment concerns (CORS, compression, timeouts) are added by the binary.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "demand-forecast up" }))
        .merge(api_routes())
        .merge(health::health_routes())
        .merge(metrics_routes())
        .merge(openapi::openapi_routes())
        // HTTP tracing layer for consistent request/response telemetry
        .layer(tracing::configure_http_tracing())
        // Ensure every request carries a request id for traceability
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id::request_id_middleware,
        ))
        .with_state(state)
}

pub mod prelude {
    pub use crate::artifacts::{ArtifactBundle, ArtifactState};
    pub use crate::config::AppConfig;
    pub use crate::errors::{ServiceError, TrainError};
    pub use crate::models::*;
    pub use crate::services::forecasting::Forecaster;
    pub use crate::services::training::{train, TrainingOptions};
    pub use crate::AppState;
}
