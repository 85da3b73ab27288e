#![allow(dead_code)]

use axum::{
    body::{self, Body},
    http::{Method, Request},
    response::Response,
    Router,
};
use chrono::NaiveDate;
use serde_json::Value;
use tower::ServiceExt;

use demand_forecast::{
    artifacts::{ArtifactBundle, ArtifactState},
    build_router,
    config::AppConfig,
    ml::RandomForestConfig,
    models::SalesRecord,
    services::{
        dataset::Dataset,
        training::{train, TrainingOptions},
    },
    AppState,
};

/// Every product sells exactly this many units a day in the fixture data.
pub const DAILY_UNITS: f64 = 10.0;

/// Two products selling a constant amount every day for two weeks, so the
/// forest predicts exactly [`DAILY_UNITS`] for any day.
pub fn constant_dataset() -> Dataset {
    let start = NaiveDate::from_ymd_opt(2023, 12, 1).unwrap();
    let buckets = ["Morning", "Afternoon", "Night"];
    let mut records = Vec::new();
    for offset in 0..14u32 {
        let date = start + chrono::Duration::days(i64::from(offset));
        for product in ["Apple", "Bread"] {
            let bucket = buckets[offset as usize % buckets.len()];
            records.push(SalesRecord::new(
                date,
                product,
                DAILY_UNITS,
                Some(bucket.to_string()),
            ));
        }
    }
    Dataset {
        records,
        has_time_of_sale: true,
        ..Default::default()
    }
}

pub fn constant_bundle() -> ArtifactBundle {
    let options = TrainingOptions {
        forest: RandomForestConfig {
            n_trees: 10,
            ..Default::default()
        },
        ..Default::default()
    };
    train(&constant_dataset(), &options).expect("train fixture bundle")
}

/// Router harness driven through `tower::ServiceExt::oneshot`.
pub struct TestApp {
    router: Router,
    pub state: AppState,
}

impl TestApp {
    /// App with a fully loaded constant-demand bundle.
    pub fn new() -> Self {
        Self::with_artifacts(ArtifactState::Loaded(constant_bundle()))
    }

    pub fn with_bundle(bundle: ArtifactBundle) -> Self {
        Self::with_artifacts(ArtifactState::Loaded(bundle))
    }

    pub fn with_artifacts(artifacts: ArtifactState) -> Self {
        let state = AppState::new(AppConfig::default(), artifacts);
        Self {
            router: build_router(state.clone()),
            state,
        }
    }

    pub fn not_loaded() -> Self {
        Self::with_artifacts(ArtifactState::NotLoaded {
            reason: "artifact file missing".into(),
        })
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    pub async fn get(&self, uri: &str) -> Response {
        self.request(Method::GET, uri, None, &[]).await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> Response {
        self.request(Method::POST, uri, Some(body), &[]).await
    }
}

pub async fn response_text(response: Response) -> String {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    String::from_utf8(bytes.to_vec()).expect("utf-8 response body")
}

pub async fn response_json(response: Response) -> Value {
    let text = response_text(response).await;
    serde_json::from_str(&text).expect("json response")
}
