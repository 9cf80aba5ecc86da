//! HTTP surface: the predictor form, its submit action and a health probe

use crate::feature_schema::{FeatureSchema, InputCollector};
use crate::metrics::MetricsSnapshot;
use crate::models::ModelError;
use crate::render::{field_values, FieldValues, PageRenderer, ResultView};
use crate::scorer::Scorer;
use crate::types::prediction::ScoreOutcome;
use anyhow::Result;
use axum::extract::rejection::FormRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Whether predictions can be served
pub enum ModelState {
    Ready(Scorer),
    /// Loading failed at startup; every interaction shows `message`
    Unavailable { message: String },
}

struct AppInner {
    model: ModelState,
    renderer: PageRenderer,
    collector: InputCollector,
}

/// Shared, read-only application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppInner>,
}

impl AppState {
    pub fn new(model: ModelState) -> Result<Self> {
        Ok(Self {
            inner: Arc::new(AppInner {
                model,
                renderer: PageRenderer::new()?,
                collector: InputCollector::new(),
            }),
        })
    }

    pub fn ready(scorer: Scorer) -> Result<Self> {
        Self::new(ModelState::Ready(scorer))
    }

    /// State for a model that failed to load; the error text is shown to users
    pub fn unavailable(err: &ModelError) -> Result<Self> {
        Self::new(ModelState::Unavailable {
            message: err.to_string(),
        })
    }

    pub fn model(&self) -> &ModelState {
        &self.inner.model
    }
}

/// Build the application router
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/predict", post(predict))
        .route("/health", get(health))
        .with_state(state)
}

/// Render failures; everything else is a page
struct AppError(anyhow::Error);

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!(error = %format!("{:#}", self.0), "Request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
    }
}

async fn index(State(state): State<AppState>) -> Result<Response, AppError> {
    let inner = &state.inner;

    match &inner.model {
        ModelState::Unavailable { message } => unavailable(&inner.renderer, message),
        ModelState::Ready(_) => {
            let values = field_values(&FeatureSchema::defaults());
            let html = inner.renderer.render_form(&values, None, None)?;
            Ok(Html(html).into_response())
        }
    }
}

async fn predict(
    State(state): State<AppState>,
    form: Result<Form<HashMap<String, String>>, FormRejection>,
) -> Result<Response, AppError> {
    let inner = &state.inner;

    // Halted before the body is looked at, whatever was submitted
    let scorer = match &inner.model {
        ModelState::Unavailable { message } => return unavailable(&inner.renderer, message),
        ModelState::Ready(scorer) => scorer,
    };

    let fields = match form {
        Ok(Form(fields)) => fields,
        Err(rejection) => {
            warn!(error = %rejection, "Malformed form submission");
            let html = inner.renderer.render_form(
                &field_values(&FeatureSchema::defaults()),
                Some(&rejection.body_text()),
                None,
            )?;
            return Ok((rejection.status(), Html(html)).into_response());
        }
    };

    let input = match inner.collector.collect(&fields) {
        Ok(input) => input,
        Err(e) => {
            warn!(error = %e, "Rejected form input");
            let values: FieldValues = fields;
            let html = inner
                .renderer
                .render_form(&values, Some(&e.to_string()), None)?;
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(html)).into_response());
        }
    };

    let outcome = scorer.evaluate(&input);
    match &outcome {
        ScoreOutcome::Scored(prediction) => info!(
            verdict = ?prediction.verdict,
            anomaly_score = prediction.anomaly_score,
            "Prediction served"
        ),
        ScoreOutcome::Failed { .. } => warn!("Prediction failed"),
    }

    let view = ResultView::from_outcome(&outcome);
    let html = inner
        .renderer
        .render_form(&field_values(&input), None, Some(&view))?;
    Ok(Html(html).into_response())
}

fn unavailable(renderer: &PageRenderer, message: &str) -> Result<Response, AppError> {
    let html = renderer.render_unavailable(message)?;
    Ok((StatusCode::SERVICE_UNAVAILABLE, Html(html)).into_response())
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    features: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    model_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    metrics: Option<MetricsSnapshot>,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let response = match &state.inner.model {
        ModelState::Ready(scorer) => HealthResponse {
            status: "ok",
            features: FeatureSchema::len(),
            model_error: None,
            metrics: Some(scorer.metrics().snapshot()),
        },
        ModelState::Unavailable { message } => HealthResponse {
            status: "model_unavailable",
            features: FeatureSchema::len(),
            model_error: Some(message.clone()),
            metrics: None,
        },
    };

    Json(response)
}
