//! Thin wrappers around [`ScreeningService`](crate::application::ScreeningService).
//!
//! Errors are returned as `{"detail": "..."}`: 422 for a check-in the
//! service refuses, 500 when there is no model or inference fails.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};

use crate::api::{
    state::AppState,
    types::{ErrorDetail, HealthResponse},
};
use crate::application::ModelInfo;
use crate::domain::{ClassifierError, PredictionResult, SurveyResponse};
use crate::HarborError;

type ApiResult<T> = std::result::Result<Json<T>, (StatusCode, Json<ErrorDetail>)>;

fn error_response(err: &HarborError) -> (StatusCode, Json<ErrorDetail>) {
    match err {
        HarborError::Validation(msg) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorDetail::new(msg.clone())),
        ),
        HarborError::ModelNotLoaded => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorDetail::new("Model not loaded")),
        ),
        other => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorDetail::new(format!("Prediction failed: {other}"))),
        ),
    }
}

/// GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        model_loaded: state.service.is_loaded(),
        uptime_secs: state.uptime_seconds(),
    })
}

/// POST /predict
pub async fn predict(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SurveyResponse>, JsonRejection>,
) -> ApiResult<PredictionResult> {
    // The rejection text can quote the body, so it goes to the client only.
    let Json(response) = payload.map_err(|rejection| {
        tracing::warn!("Rejected check-in body ({})", rejection.status());
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorDetail::new(rejection.body_text())),
        )
    })?;

    if let Err(problems) = response.validate() {
        tracing::warn!("Rejected check-in: {} invalid field(s)", problems.len());
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorDetail::new(problems.join("; "))),
        ));
    }

    state.service.predict(&response).map(Json).map_err(|e| {
        match &e {
            // The message carries the raw answer; log the column only.
            HarborError::Inference(ClassifierError::NonNumeric(f)) => {
                tracing::error!("Prediction error: column {:?} is not numeric", f.column);
            }
            other => tracing::error!("Prediction error: {}", other),
        }
        error_response(&e)
    })
}

/// GET /model-info
pub async fn model_info(State(state): State<AppState>) -> ApiResult<ModelInfo> {
    state.service.model_info().map(Json).map_err(|e| error_response(&e))
}
