mod common;

use axum::http::StatusCode;
use demand_forecast::{
    artifacts::{ArtifactKind, ArtifactState, PartialArtifacts},
    models::{PeakHourTable, TrendEntry, TrendStatus, TrendTable},
};

use common::{constant_bundle, response_json, response_text, TestApp};

fn entry(slope: f64) -> TrendEntry {
    TrendEntry {
        slope,
        status: TrendStatus::from_slope(slope),
    }
}

fn mixed_trends() -> TrendTable {
    let mut trends = TrendTable::default();
    trends.push("Zucchini", entry(2.5));
    trends.push("Apple", entry(-0.8));
    for name in ["Bread", "Cheese", "Dates", "Eggs", "Figs", "Grapes"] {
        trends.push(name, entry(0.4));
    }
    trends.push("Honey", entry(0.0));
    trends
}

#[tokio::test]
async fn summarises_trends_and_peak_hours() {
    let mut bundle = constant_bundle();
    bundle.trends = mixed_trends();
    bundle.peak_hours = PeakHourTable::from_totals([("Morning", 120.0), ("Night", 310.0), ("Afternoon", 95.5)]);
    let app = TestApp::with_bundle(bundle);

    let response = app.get("/api/dashboard/").await;
    assert_eq!(response.status(), StatusCode::OK);
    let text = response_text(response).await;
    let body: serde_json::Value = serde_json::from_str(&text).unwrap();

    let summary = &body["resumen_semanal"];
    assert_eq!(
        summary["productos_estrella_ascenso"],
        serde_json::json!(["Zucchini", "Bread", "Cheese", "Dates", "Eggs"])
    );
    assert_eq!(summary["productos_en_riesgo"], serde_json::json!(["Apple"]));
    assert_eq!(summary["hora_pico_absoluta"], "Night");

    let recommendations = &body["recomendaciones_operativas"];
    assert_eq!(
        recommendations["mensaje_staff"],
        "Reinforce staff during: Night."
    );
    assert_eq!(recommendations["detalle_horas"]["Afternoon"], 95.5);

    let trends = &body["analisis_completo_tendencias"];
    assert_eq!(trends["Zucchini"], serde_json::json!({"slope": 2.5, "status": "Rising"}));
    assert_eq!(trends["Honey"]["status"], "Stable");
    assert_eq!(trends.as_object().unwrap().len(), 9);

    // Objects keep table order on the wire.
    assert!(text.find("\"Night\":310").unwrap() < text.find("\"Morning\":120").unwrap());
    assert!(text.find("\"Zucchini\":{").unwrap() < text.find("\"Apple\":{").unwrap());
}

#[tokio::test]
async fn path_without_trailing_slash() {
    let app = TestApp::new();
    let response = app.get("/api/dashboard").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    // Constant fixture sales: Afternoon and Morning tie, Afternoon sorts first.
    assert_eq!(body["resumen_semanal"]["hora_pico_absoluta"], "Afternoon");
    assert_eq!(
        body["resumen_semanal"]["productos_estrella_ascenso"],
        serde_json::json!([])
    );
}

#[tokio::test]
async fn missing_trends_is_a_server_error() {
    let app = TestApp::not_loaded();
    let response = app.get("/api/dashboard/").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = response_json(response).await;
    assert_eq!(
        body["message"],
        "Trend data is not available; retrain the model"
    );
}

#[tokio::test]
async fn empty_trend_table_is_a_server_error() {
    let mut bundle = constant_bundle();
    bundle.trends = TrendTable::default();
    let app = TestApp::with_bundle(bundle);
    let response = app.get("/api/dashboard/").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn missing_peak_hours_reports_not_available() {
    let bundle = constant_bundle();
    let app = TestApp::with_artifacts(ArtifactState::Partial {
        artifacts: PartialArtifacts {
            metadata: Some(bundle.metadata),
            model: Some(bundle.model),
            encoder: Some(bundle.encoder),
            trends: Some(mixed_trends()),
            peak_hours: None,
        },
        missing: vec![ArtifactKind::PeakHours],
    });

    let body = response_json(app.get("/api/dashboard/").await).await;
    assert_eq!(body["resumen_semanal"]["hora_pico_absoluta"], "N/A");
    assert_eq!(
        body["recomendaciones_operativas"]["mensaje_staff"],
        "Reinforce staff during: N/A."
    );
    assert_eq!(
        body["recomendaciones_operativas"]["detalle_horas"],
        serde_json::json!({})
    );
}

#[tokio::test]
async fn bundle_file_without_peak_hours_still_serves_the_dashboard() {
    let mut stored = serde_json::to_value(constant_bundle()).unwrap();
    stored.as_object_mut().unwrap().remove("peak_hours");
    let state = ArtifactState::from_json(&stored.to_string()).unwrap();
    assert!(matches!(
        &state,
        ArtifactState::Partial { missing, .. } if missing == &vec![ArtifactKind::PeakHours]
    ));

    let app = TestApp::with_artifacts(state);
    let response = app.get("/api/dashboard/").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["resumen_semanal"]["hora_pico_absoluta"], "N/A");
    assert_eq!(
        body["recomendaciones_operativas"]["mensaje_staff"],
        "Reinforce staff during: N/A."
    );
    assert_eq!(
        body["analisis_completo_tendencias"]["Apple"]["status"],
        "Stable"
    );
}

/// Byte offsets of each `"key":` in `text`, in the order given.
fn key_positions(text: &str, keys: &[&str]) -> Vec<usize> {
    keys.iter()
        .map(|key| {
            text.find(&format!("\"{key}\":"))
                .unwrap_or_else(|| panic!("{key} missing from {text}"))
        })
        .collect()
}

#[tokio::test]
async fn maps_keep_table_order_in_the_raw_body() {
    let mut bundle = constant_bundle();
    bundle.trends = mixed_trends();
    bundle.peak_hours =
        PeakHourTable::from_totals([("Afternoon", 5.0), ("Night", 40.0), ("Morning", 20.0)]);
    let app = TestApp::with_bundle(bundle);

    let text = response_text(app.get("/api/dashboard/").await).await;

    let hours_start = text.find("\"detalle_horas\":").unwrap();
    let hours = key_positions(&text[hours_start..], &["Night", "Morning", "Afternoon"]);
    assert!(hours.windows(2).all(|w| w[0] < w[1]), "peak hours out of order: {text}");

    let trends_start = text.find("\"analisis_completo_tendencias\":").unwrap();
    let order = [
        "Zucchini", "Apple", "Bread", "Cheese", "Dates", "Eggs", "Figs", "Grapes", "Honey",
    ];
    let trends = key_positions(&text[trends_start..], &order);
    assert!(trends.windows(2).all(|w| w[0] < w[1]), "trends out of order: {text}");
}
