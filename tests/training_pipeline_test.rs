mod common;

use std::io::Write;

use axum::http::StatusCode;
use demand_forecast::prelude::*;
use demand_forecast::{ml::RandomForestConfig, services::training::run};
use serde_json::json;

use common::{response_json, TestApp};

fn options() -> TrainingOptions {
    TrainingOptions {
        forest: RandomForestConfig {
            n_trees: 8,
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Tea sells a steady 5 a day; Cocoa climbs by 2 a day; one row has an
/// unreadable date and one an unreadable quantity.
fn write_dataset(path: &std::path::Path) {
    let mut file = std::fs::File::create(path).unwrap();
    writeln!(file, "order_id,date,item_name,item_type,item_price,quantity,transaction_amount,time_of_sale").unwrap();
    for day in 1..=10 {
        writeln!(file, "{day},03/{day:02}/2024,Tea,Beverages,2,5,10,Morning").unwrap();
        writeln!(file, "{day},03/{day:02}/2024,Cocoa,Beverages,3,{},0,Night", day * 2).unwrap();
    }
    writeln!(file, "99,30-02-2024,Tea,Beverages,2,5,10,Morning").unwrap();
    writeln!(file, "100,03/11/2024,Tea,Beverages,2,n/a,0,Evening").unwrap();
}

#[tokio::test]
async fn csv_to_served_forecast() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = dir.path().join("sales.csv");
    let output = dir.path().join("forecast_artifacts.json");
    write_dataset(&dataset);

    let summary = run(&dataset, &output, &options()).unwrap();
    assert_eq!(summary.records, 21);
    assert_eq!(summary.products, 2);
    assert_eq!(summary.trees, 8);
    assert_eq!(summary.buckets, 3);

    let state = ArtifactState::load(&output);
    assert!(state.is_loaded());
    let trends = state.trends().unwrap();
    assert_eq!(trends.get("Cocoa").unwrap().status, TrendStatus::Rising);
    assert_eq!(trends.get("Tea").unwrap().status, TrendStatus::Falling);
    assert_eq!(state.peak_hours().unwrap().top_bucket(), "Night");

    let app = TestApp::with_artifacts(state);
    let response = app
        .post_json(
            "/api/prediccion-ventas/",
            json!({"producto": "Tea", "stock_actual": 1000, "fecha": "2024-03-10"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["producto"], "Tea");
    assert_eq!(body["detalle_dias"].as_array().unwrap().len(), 7);
    assert_eq!(body["alerta_ia"], "Stock is healthy for this week.");

    let dashboard = response_json(app.get("/api/dashboard/").await).await;
    assert_eq!(
        dashboard["resumen_semanal"]["productos_estrella_ascenso"],
        json!(["Cocoa"])
    );
    assert_eq!(dashboard["resumen_semanal"]["hora_pico_absoluta"], "Night");
}

#[test]
fn training_is_deterministic_for_a_seed() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = dir.path().join("sales.csv");
    write_dataset(&dataset);

    let first = dir.path().join("a.json");
    let second = dir.path().join("b.json");
    run(&dataset, &first, &options()).unwrap();
    run(&dataset, &second, &options()).unwrap();

    let model = |path: &std::path::Path| {
        let mut value: serde_json::Value =
            serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap();
        value.as_object_mut().unwrap().remove("metadata");
        value
    };
    assert_eq!(model(&first), model(&second));
}

#[test]
fn missing_dataset_fails_without_writing_output() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.json");
    let err = run(&dir.path().join("absent.csv"), &output, &options()).unwrap_err();
    assert!(matches!(err, TrainError::DatasetNotFound(_)));
    assert!(!output.exists());
}

#[test]
fn missing_bundle_file_leaves_server_not_loaded() {
    let dir = tempfile::tempdir().unwrap();
    let state = ArtifactState::load(&dir.path().join("forecast_artifacts.json"));
    assert!(!state.is_loaded());
    assert!(state.forecaster().is_err());
}
