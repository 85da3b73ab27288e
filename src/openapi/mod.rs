use axum::{routing::get, Json, Router};
use utoipa::OpenApi;

use crate::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Demand Forecast API",
        description = r#"
Seven-day sales forecasts, stock depletion alerts and weekly trend summaries
served from a model trained offline by `demand-train`.

Errors use a single payload:

```json
{
  "error": "Bad Request",
  "message": "Unknown product: Durian",
  "request_id": "req-abc123xyz",
  "timestamp": "2024-01-01T00:00:00Z"
}
```
        "#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    tags(
        (name = "forecast", description = "Per-product sales forecasts"),
        (name = "dashboard", description = "Trend and peak-hour summaries"),
        (name = "health", description = "Liveness and readiness probes")
    ),
    paths(
        crate::handlers::forecast::predict_sales,
        crate::handlers::dashboard::dashboard,
        crate::health::liveness_check,
        crate::health::readiness_check,
    ),
    components(
        schemas(
            crate::handlers::forecast::ForecastRequest,
            crate::models::ForecastResult,
            crate::models::DailyForecast,
            crate::models::DashboardResult,
            crate::models::WeeklySummary,
            crate::models::OperationalRecommendations,
            crate::models::TrendEntry,
            crate::models::TrendStatus,
            crate::health::HealthInfo,
            crate::health::HealthDetail,
            crate::health::HealthStatus,
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDocV1::openapi())
}

pub fn openapi_routes() -> Router<AppState> {
    Router::new().route("/api-docs/openapi.json", get(openapi_json))
}
