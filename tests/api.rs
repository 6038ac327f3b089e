//! End-to-end tests driving the HTTP router.

use std::path::Path;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use harbor_screen::adapters::{load_model_dir, LoadOptions};
use harbor_screen::api::{create_router, AppState};
use harbor_screen::application::{ModelContext, ScreeningService};
use harbor_screen::config::CorsOrigins;
use harbor_screen::domain::{concern_column, SurveyField, UnknownCategoryPolicy, AI_CONCERNS};

fn form_columns() -> Vec<String> {
    let mut columns: Vec<String> = SurveyField::ALL
        .iter()
        .map(|f| f.column().to_string())
        .collect();
    columns.extend(AI_CONCERNS.iter().map(|l| concern_column(l)));
    columns
}

fn write_model(dir: &Path) {
    let columns = form_columns();
    let coefficients: Vec<f64> = columns
        .iter()
        .map(|c| match c.as_str() {
            "suicidalThoughts" => 2.0,
            "stressLevel" => 0.5,
            _ => 0.0,
        })
        .collect();
    let model = json!({
        "model_type": "logistic_regression",
        "feature_names": columns,
        "coefficients": coefficients,
        "intercept": -4.0,
    });
    std::fs::write(dir.join("model.json"), model.to_string()).expect("write model");
    std::fs::write(
        dir.join("model_columns.json"),
        serde_json::to_string(&columns).expect("columns"),
    )
    .expect("write columns");
}

fn app(policy: UnknownCategoryPolicy) -> (Router, TempDir) {
    let dir = TempDir::new().expect("tempdir");
    write_model(dir.path());
    let loaded = load_model_dir(dir.path(), &LoadOptions::default()).expect("load");
    let context = ModelContext::from_loaded(loaded, policy).expect("context");
    let state = AppState::new(ScreeningService::new(context), CorsOrigins::Any);
    (create_router(state), dir)
}

fn unloaded_app() -> Router {
    create_router(AppState::new(ScreeningService::unloaded(), CorsOrigins::Any))
}

fn check_in() -> Value {
    json!({
        "age": "21-23",
        "gender": "Female",
        "academicStatus": "Undergraduate",
        "stressLevel": "High",
        "academicPerformance": "Average",
        "healthCondition": "Good",
        "relationshipStatus": "Single",
        "familyProblems": "Sometimes",
        "depressionLevel": "More than half the days",
        "anxietyLevel": "Several days",
        "socialSupport": "Somewhat supportive",
        "selfHarmBehaviors": "Never",
        "suicidalThoughts": "Rarely",
        "mentalHealthHelp": "No, but interested",
        "aiComfortLevel": "Somewhat comfortable",
        "aiConcerns": ["Privacy and data security"],
        "aiTrustLevel": "Moderate"
    })
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

#[tokio::test]
async fn health_reports_model_state() {
    let (router, _dir) = app(UnknownCategoryPolicy::Passthrough);
    let (status, body) = send(router, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["model_loaded"], true);

    let (status, body) = send(unloaded_app(), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["model_loaded"], false);
}

#[tokio::test]
async fn predict_returns_full_result() {
    let (router, _dir) = app(UnknownCategoryPolicy::Passthrough);
    let (status, body) = send(router, post_json("/predict", &check_in())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prediction"], 0);
    assert_eq!(body["risk_level"], "Low Risk");
    assert_eq!(body["urgent_care_needed"], false);
    let confidence = body["confidence_score"].as_f64().expect("confidence");
    assert!((0.5..=1.0).contains(&confidence));
    let recommendations = body["recommendations"].as_array().expect("list");
    assert!(recommendations.len() >= 3);
}

#[tokio::test]
async fn predict_flags_urgent_care() {
    let (router, _dir) = app(UnknownCategoryPolicy::Passthrough);
    let mut body = check_in();
    body["suicidalThoughts"] = json!("Always");

    let (status, body) = send(router, post_json("/predict", &body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prediction"], 1);
    assert_eq!(body["risk_level"], "High Risk");
    assert_eq!(body["urgent_care_needed"], true);
}

#[tokio::test]
async fn predict_rejects_missing_field() {
    let (router, _dir) = app(UnknownCategoryPolicy::Passthrough);
    let mut body = check_in();
    body.as_object_mut().expect("object").remove("stressLevel");

    let (status, body) = send(router, post_json("/predict", &body)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn predict_rejects_malformed_json() {
    let (router, _dir) = app(UnknownCategoryPolicy::Passthrough);
    let request = Request::builder()
        .method("POST")
        .uri("/predict")
        .header("content-type", "application/json")
        .body(Body::from("{\"age\": "))
        .expect("request");

    let (status, _) = send(router, request).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn unknown_answer_follows_policy() {
    let mut body = check_in();
    body["gender"] = json!("Agender");

    let (router, _dir) = app(UnknownCategoryPolicy::Passthrough);
    let (status, resp) = send(router, post_json("/predict", &body)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let detail = resp["detail"].as_str().expect("detail");
    assert!(detail.starts_with("Prediction failed: "));

    let (router, _dir) = app(UnknownCategoryPolicy::Reject);
    let (status, resp) = send(router, post_json("/predict", &body)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let detail = resp["detail"].as_str().expect("detail");
    assert!(detail.contains("gender"));
    assert!(!detail.contains("Agender"));
}

#[tokio::test]
async fn predict_without_model_fails() {
    let (status, body) = send(unloaded_app(), post_json("/predict", &check_in())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["detail"], "Model not loaded");
}

#[tokio::test]
async fn model_info_describes_artifact() {
    let (router, dir) = app(UnknownCategoryPolicy::Passthrough);
    let (status, body) = send(router, get("/model-info")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["model_type"], "LogisticRegression");
    assert_eq!(body["n_features"], form_columns().len());
    assert_eq!(body["feature_names"][0], "age");
    assert_eq!(body["classes"], json!([0, 1]));
    assert_eq!(body["artifact_sha256"].as_str().map(str::len), Some(64));
    assert_eq!(body["unknown_category_policy"], "passthrough");
    let fields = body.as_object().expect("object");
    assert!(!fields.contains_key("source"));
    let text = body.to_string();
    assert!(!text.contains(&*dir.path().to_string_lossy()));

    let (status, body) = send(unloaded_app(), get("/model-info")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["detail"], "Model not loaded");
}
