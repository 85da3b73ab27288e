use axum::{extract::State, routing::get, Json, Router};
use tracing::debug;

use super::AppState;
use crate::errors::ServiceError;
use crate::metrics;
use crate::models::DashboardResult;
use crate::services::dashboard::build_dashboard;

/// Trending products and peak-hour staffing summary
#[utoipa::path(
    get,
    path = "/api/dashboard/",
    responses(
        (status = 200, description = "Dashboard computed", body = DashboardResult,
            headers(("X-Request-Id" = String, description = "Unique request id"))
        ),
        (status = 500, description = "Trend data unavailable", body = crate::errors::ErrorResponse)
    ),
    tag = "dashboard"
)]
pub async fn dashboard(State(state): State<AppState>) -> Result<Json<DashboardResult>, ServiceError> {
    let result = build_dashboard(state.artifacts.trends(), state.artifacts.peak_hours());
    metrics::record_dashboard(result.is_ok());

    let result = result?;
    debug!(
        rising = result.summary.rising.len(),
        falling = result.summary.falling.len(),
        peak_hour = %result.summary.peak_hour,
        "dashboard served"
    );
    Ok(Json(result))
}

pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/api/dashboard/", get(dashboard))
        .route("/api/dashboard", get(dashboard))
}
