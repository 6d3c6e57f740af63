//! HTTP routes for cytoscand
//!
//! Wizard pages under `/` and `/step/{n}`, the direct `/predict` endpoint,
//! and health/metrics.

use crate::server::AppState;
use crate::views;
use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use cytoscan_common::catalog;
use cytoscan_common::wizard::{self, WizardState};
use cytoscan_common::{Band, InferenceError, Label, Step};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, warn};

type AppStateArc = Arc<AppState>;

// ============================================================================
// Wizard Routes
// ============================================================================

pub fn wizard_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/", get(home))
        .route("/about", get(about))
        .route("/docs", get(docs))
        .route("/step/:step", get(step_page).post(step_submit))
}

/// Wizard entry: every visit starts a fresh traversal
async fn home(State(state): State<AppStateArc>, headers: HeaderMap) -> Response {
    let handle = state.sessions.resolve(&headers).await;
    state.sessions.clear(handle.id).await;
    state.metrics.active_sessions.set(state.sessions.len().await as i64);

    let mut response = Html(views::home()).into_response();
    state.sessions.attach_cookie(handle, &mut response);
    response
}

async fn about() -> Html<String> {
    Html(views::about())
}

async fn docs() -> Html<String> {
    Html(views::docs())
}

/// Non-numeric step segments are treated like out-of-range numbers
fn parse_step(raw: &str) -> WizardState {
    raw.parse::<i64>()
        .map(wizard::resolve)
        .unwrap_or(WizardState::Invalid)
}

fn step_location(state: WizardState) -> String {
    match state {
        WizardState::Step(step) => format!("/step/{}", step.number()),
        WizardState::Summary => format!("/step/{}", wizard::total_steps()),
        WizardState::Invalid => "/".to_string(),
    }
}

async fn step_page(
    State(state): State<AppStateArc>,
    Path(raw): Path<String>,
    headers: HeaderMap,
) -> Response {
    match parse_step(&raw) {
        WizardState::Step(step) => {
            let handle = state.sessions.resolve(&headers).await;
            let session = state.sessions.snapshot(handle.id).await.unwrap_or_default();
            let mut response = Html(views::step_form(step, &session)).into_response();
            state.sessions.attach_cookie(handle, &mut response);
            response
        }
        WizardState::Summary => summary(&state, &headers).await,
        WizardState::Invalid => Redirect::to("/").into_response(),
    }
}

async fn step_submit(
    State(state): State<AppStateArc>,
    Path(raw): Path<String>,
    headers: HeaderMap,
    form: Option<Form<HashMap<String, String>>>,
) -> Response {
    match (parse_step(&raw), form) {
        (WizardState::Step(step), Some(Form(form))) => {
            submit(&state, &headers, step, &form).await
        }
        (WizardState::Step(step), None) => {
            warn!("Step {} submission without a form body", step.number());
            (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "Expected an application/x-www-form-urlencoded body",
            )
                .into_response()
        }
        (WizardState::Summary, _) => summary(&state, &headers).await,
        (WizardState::Invalid, _) => Redirect::to("/").into_response(),
    }
}

async fn submit(
    state: &AppState,
    headers: &HeaderMap,
    step: Step,
    form: &HashMap<String, String>,
) -> Response {
    let handle = state.sessions.resolve(headers).await;
    let next = state
        .sessions
        .with_session(handle.id, |session| wizard::submit(session, step, form))
        .await;
    state.metrics.record_submission(step.number());
    info!("Recorded step {} ({})", step.number(), step.title());

    let mut response = Redirect::to(&step_location(next)).into_response();
    state.sessions.attach_cookie(handle, &mut response);
    response
}

/// Terminal step: evaluate the accumulated values
async fn summary(state: &AppState, headers: &HeaderMap) -> Response {
    let handle = state.sessions.resolve(headers).await;
    let session = state.sessions.snapshot(handle.id).await.unwrap_or_default();
    let policy = state.config.wizard.missing_policy();

    let timer = state.metrics.inference_seconds.start_timer();
    let outcome = wizard::evaluate(&session, &state.adapter, policy);
    timer.observe_duration();

    let mut response = match outcome {
        Ok(result) => {
            state
                .metrics
                .record_prediction(result.verdict.label.as_str(), "wizard");
            Html(views::summary(&result)).into_response()
        }
        Err(e) if e.is_user_error() => {
            warn!("Summary rejected: {}", e);
            state.metrics.record_failure(e.reason());
            (StatusCode::UNPROCESSABLE_ENTITY, Html(views::evaluation_error(&e))).into_response()
        }
        Err(e) => {
            error!("Summary inference failed: {}", e);
            state.metrics.record_failure(e.reason());
            (StatusCode::INTERNAL_SERVER_ERROR, Html(views::internal_error())).into_response()
        }
    };
    state.sessions.attach_cookie(handle, &mut response);
    response
}

// ============================================================================
// Prediction API
// ============================================================================

/// Raw feature vector in catalog order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictRequest {
    pub features: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    pub prediction: Label,
    /// P(Benign) as returned by the classifier
    pub probability: f64,
    pub confidence: f64,
    pub band: Band,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictError {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<usize>,
}

pub fn api_routes() -> Router<AppStateArc> {
    Router::new().route("/predict", post(predict))
}

async fn predict(
    State(state): State<AppStateArc>,
    Json(req): Json<PredictRequest>,
) -> Result<Json<PredictResponse>, (StatusCode, Json<PredictError>)> {
    let timer = state.metrics.inference_seconds.start_timer();
    let outcome = wizard::classify_vector(&state.adapter, &req.features);
    timer.observe_duration();

    match outcome {
        Ok(verdict) => {
            state.metrics.record_prediction(verdict.label.as_str(), "api");
            Ok(Json(PredictResponse {
                prediction: verdict.label,
                probability: verdict.probability_benign,
                confidence: verdict.confidence,
                band: verdict.band,
            }))
        }
        Err(InferenceError::DimensionMismatch { expected, actual }) => {
            warn!("Rejected vector of {} values (expected {})", actual, expected);
            state.metrics.record_failure("dimension_mismatch");
            Err((
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(PredictError {
                    error: "dimension_mismatch".to_string(),
                    expected: Some(expected),
                    actual: Some(actual),
                }),
            ))
        }
        Err(e) => {
            error!("Prediction failed: {}", e);
            state.metrics.record_failure("inference");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(PredictError {
                    error: "inference".to_string(),
                    expected: None,
                    actual: None,
                }),
            ))
        }
    }
}

// ============================================================================
// Health Routes
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub active_sessions: usize,
    pub feature_count: usize,
}

pub fn health_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
}

async fn health_check(State(state): State<AppStateArc>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: cytoscan_common::VERSION.to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        active_sessions: state.sessions.len().await,
        feature_count: catalog::feature_count(),
    })
}

async fn metrics(State(state): State<AppStateArc>) -> Response {
    state.metrics.active_sessions.set(state.sessions.len().await as i64);
    match state.metrics.export() {
        Ok(body) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => {
            error!("Metrics export failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_step() {
        assert_eq!(parse_step("1"), WizardState::Step(Step::Radius));
        assert_eq!(parse_step("8"), WizardState::Summary);
        assert_eq!(parse_step("0"), WizardState::Invalid);
        assert_eq!(parse_step("abc"), WizardState::Invalid);
    }

    #[test]
    fn test_step_location() {
        assert_eq!(step_location(WizardState::Step(Step::Area)), "/step/3");
        assert_eq!(step_location(WizardState::Summary), "/step/8");
        assert_eq!(step_location(WizardState::Invalid), "/");
    }
}
