use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::Value;
use std::time::Instant;
use tracing::info;
use utoipa::ToSchema;

use super::AppState;
use crate::errors::ServiceError;
use crate::metrics;
use crate::models::ForecastResult;

/// Body of a forecast request. Every field is optional on the wire so that
/// each problem can be reported with its own error.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ForecastRequest {
    #[serde(rename = "producto", default)]
    #[schema(example = "Apple")]
    pub product: Option<String>,
    /// Units currently in stock; a number or a numeric string. Defaults to 0.
    #[serde(rename = "stock_actual", default)]
    #[schema(value_type = f64, example = 100)]
    pub stock: Option<Value>,
    /// Forecast start date (`YYYY-MM-DD`); defaults to today.
    #[serde(rename = "fecha", default)]
    #[schema(example = "2024-01-01")]
    pub date: Option<String>,
}

impl ForecastRequest {
    pub fn product(&self) -> Result<&str, ServiceError> {
        match self.product.as_deref() {
            Some(name) if !name.trim().is_empty() => Ok(name),
            _ => Err(ServiceError::MissingProduct),
        }
    }

    pub fn stock_on_hand(&self) -> Result<f64, ServiceError> {
        let stock = match &self.stock {
            None | Some(Value::Null) => 0.0,
            Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
            Some(Value::String(s)) => s.trim().parse::<f64>().map_err(|_| {
                ServiceError::InvalidInput(format!("stock_actual is not a number: {s:?}"))
            })?,
            Some(other) => {
                return Err(ServiceError::InvalidInput(format!(
                    "stock_actual is not a number: {other}"
                )))
            }
        };
        if !stock.is_finite() || stock < 0.0 {
            return Err(ServiceError::InvalidInput(
                "stock_actual must be a non-negative number".into(),
            ));
        }
        Ok(stock)
    }

    pub fn start_date(&self) -> Result<NaiveDate, ServiceError> {
        match self.date.as_deref() {
            None => Ok(Local::now().date_naive()),
            Some(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
                ServiceError::InvalidInput(format!("fecha must be YYYY-MM-DD, got {raw:?}"))
            }),
        }
    }
}

/// Seven-day sales forecast for one product
#[utoipa::path(
    post,
    path = "/api/prediccion-ventas/",
    request_body = ForecastRequest,
    responses(
        (status = 200, description = "Forecast computed", body = ForecastResult,
            headers(("X-Request-Id" = String, description = "Unique request id"))
        ),
        (status = 400, description = "Missing, invalid or unknown product or input", body = crate::errors::ErrorResponse),
        (status = 500, description = "Forecast model unavailable", body = crate::errors::ErrorResponse)
    ),
    tag = "forecast"
)]
pub async fn predict_sales(
    State(state): State<AppState>,
    payload: Result<Json<ForecastRequest>, JsonRejection>,
) -> Result<Json<ForecastResult>, ServiceError> {
    let started = Instant::now();
    let result = run_forecast(&state, payload);
    match &result {
        Ok(_) => metrics::record_forecast(started.elapsed()),
        Err(err) => metrics::record_forecast_error(err.kind()),
    }
    result.map(Json)
}

fn run_forecast(
    state: &AppState,
    payload: Result<Json<ForecastRequest>, JsonRejection>,
) -> Result<ForecastResult, ServiceError> {
    let forecaster = state.artifacts.forecaster()?;
    let Json(request) = payload.map_err(|rejection| ServiceError::InvalidInput(rejection.body_text()))?;

    let product = request.product()?;
    let stock = request.stock_on_hand()?;
    let start_date = request.start_date()?;

    let result = forecaster.forecast(product, stock, start_date)?;
    info!(
        product,
        stock,
        start_date = %start_date,
        weekly_total = result.weekly_total,
        "forecast served"
    );
    Ok(result)
}

pub fn forecast_routes() -> Router<AppState> {
    Router::new()
        .route("/api/prediccion-ventas/", post(predict_sales))
        .route("/api/prediccion-ventas", post(predict_sales))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rstest::rstest;
    use serde_json::json;

    fn request(body: Value) -> ForecastRequest {
        serde_json::from_value(body).unwrap()
    }

    #[rstest]
    #[case(json!({}), 0.0)]
    #[case(json!({"stock_actual": null}), 0.0)]
    #[case(json!({"stock_actual": 12}), 12.0)]
    #[case(json!({"stock_actual": 7.5}), 7.5)]
    #[case(json!({"stock_actual": " 40 "}), 40.0)]
    fn parses_stock(#[case] body: Value, #[case] expected: f64) {
        assert_eq!(request(body).stock_on_hand().unwrap(), expected);
    }

    #[rstest]
    #[case(json!({"stock_actual": "plenty"}))]
    #[case(json!({"stock_actual": -3}))]
    #[case(json!({"stock_actual": true}))]
    #[case(json!({"stock_actual": "NaN"}))]
    fn rejects_bad_stock(#[case] body: Value) {
        assert_matches!(
            request(body).stock_on_hand(),
            Err(ServiceError::InvalidInput(_))
        );
    }

    #[test]
    fn product_must_be_present() {
        assert_matches!(request(json!({})).product(), Err(ServiceError::MissingProduct));
        assert_matches!(
            request(json!({"producto": ""})).product(),
            Err(ServiceError::MissingProduct)
        );
        assert_eq!(request(json!({"producto": "Apple"})).product().unwrap(), "Apple");
    }

    #[test]
    fn parses_start_date() {
        assert_eq!(
            request(json!({"fecha": "2024-01-01"})).start_date().unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
        assert_matches!(
            request(json!({"fecha": "01/01/2024"})).start_date(),
            Err(ServiceError::InvalidInput(_))
        );
        assert!(request(json!({})).start_date().is_ok());
    }
}
