use serde::Serialize;
use utoipa::ToSchema;

use super::{PeakHourTable, TrendTable};

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct WeeklySummary {
    /// Up to five rising products.
    #[serde(rename = "productos_estrella_ascenso")]
    pub rising: Vec<String>,
    /// Up to five falling products.
    #[serde(rename = "productos_en_riesgo")]
    pub falling: Vec<String>,
    #[serde(rename = "hora_pico_absoluta")]
    #[schema(example = "Night")]
    pub peak_hour: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct OperationalRecommendations {
    #[serde(rename = "mensaje_staff")]
    #[schema(example = "Reinforce staff during: Night.")]
    pub staffing_message: String,
    #[serde(rename = "detalle_horas", serialize_with = "PeakHourTable::serialize_as_map")]
    #[schema(value_type = Object)]
    pub peak_hours: PeakHourTable,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DashboardResult {
    #[serde(rename = "resumen_semanal")]
    pub summary: WeeklySummary,
    #[serde(rename = "recomendaciones_operativas")]
    pub recommendations: OperationalRecommendations,
    #[serde(
        rename = "analisis_completo_tendencias",
        serialize_with = "TrendTable::serialize_as_map"
    )]
    #[schema(value_type = Object)]
    pub trends: TrendTable,
}
