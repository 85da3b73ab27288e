use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use utoipa::ToSchema;

/// Reported in place of a depletion date when stock outlasts the forecast window.
pub const SUFFICIENT_STOCK_SENTINEL: &str = "Stock sufficient for >7 days";

/// Stock health for the forecast window, most severe first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockAlert {
    /// Stock runs out on the given day.
    Urgent { depletion_date: NaiveDate },
    /// Stock survives the week but ends below 20% of the starting level.
    LowStock,
    Healthy,
}

impl StockAlert {
    pub fn message(&self) -> String {
        match self {
            Self::Urgent { depletion_date } => format!(
                "URGENT: your stock will run out on {}.",
                depletion_date.format("%Y-%m-%d")
            ),
            Self::LowStock => "Warning: stock will end the week very low.".to_string(),
            Self::Healthy => "Stock is healthy for this week.".to_string(),
        }
    }

    fn serialize_message<S: Serializer>(alert: &Self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&alert.message())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DailyForecast {
    #[serde(rename = "fecha")]
    #[schema(value_type = String, example = "2024-01-02")]
    pub date: NaiveDate,
    /// Predicted units, rounded to 2 decimals.
    #[serde(rename = "prediccion")]
    #[schema(example = 10.0)]
    pub predicted: f64,
}

/// Seven-day forecast for one product.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ForecastResult {
    #[serde(rename = "producto")]
    #[schema(example = "Apple")]
    pub product: String,
    #[serde(rename = "venta_mañana")]
    #[schema(example = 10.0)]
    pub tomorrow: f64,
    #[serde(rename = "venta_total_semana")]
    #[schema(example = 70.0)]
    pub weekly_total: f64,
    /// Weekly total plus a 10% buffer.
    #[serde(rename = "inventario_necesario_semana")]
    #[schema(example = 77)]
    pub recommended_inventory: u64,
    #[serde(
        rename = "fecha_estimada_agotamiento",
        serialize_with = "serialize_depletion"
    )]
    #[schema(value_type = String, example = "2024-01-06")]
    pub depletion_date: Option<NaiveDate>,
    #[serde(rename = "alerta_ia", serialize_with = "StockAlert::serialize_message")]
    #[schema(value_type = String, example = "Stock is healthy for this week.")]
    pub alert: StockAlert,
    #[serde(rename = "detalle_dias")]
    pub daily: Vec<DailyForecast>,
}

fn serialize_depletion<S: Serializer>(
    date: &Option<NaiveDate>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match date {
        Some(date) => serializer.collect_str(&date.format("%Y-%m-%d")),
        None => serializer.serialize_str(SUFFICIENT_STOCK_SENTINEL),
    }
}
