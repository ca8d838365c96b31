use crate::infra::AppState;
use crate::views::{application_page, Outcome};
use axum::extract::rejection::FormRejection;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use loan_approval::categories::CategoryCatalog;
use loan_approval::{ApplicationForm, AssessmentError};
use serde_json::json;
use tracing::{error, warn};

const GENERIC_FAILURE: &str =
    "The prediction service could not process this application. Please try again later.";

pub(crate) fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(form_page))
        .route("/assess", post(assess_endpoint))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
}

pub(crate) async fn form_page(State(state): State<AppState>) -> Html<String> {
    let catalog = state.context.catalog();
    let values = ApplicationForm::prefilled(catalog);
    Html(application_page(catalog, &values, None).into_string())
}

fn unprocessable(catalog: &CategoryCatalog, values: &ApplicationForm, message: &str) -> Response {
    let page = application_page(catalog, values, Some(Outcome::Problem(message)));
    (StatusCode::UNPROCESSABLE_ENTITY, Html(page.into_string())).into_response()
}

pub(crate) async fn assess_endpoint(
    State(state): State<AppState>,
    form: Result<Form<ApplicationForm>, FormRejection>,
) -> Response {
    let catalog = state.context.catalog();

    let submitted = match form {
        Ok(Form(submitted)) => submitted,
        Err(rejection) => {
            let message = rejection.body_text();
            warn!(%message, "rejected malformed application form");
            return unprocessable(catalog, &ApplicationForm::prefilled(catalog), &message);
        }
    };

    let application = match submitted.parse() {
        Ok(application) => application,
        Err(err) => {
            warn!(field = err.field, value = %err.value, "application field did not parse");
            return unprocessable(catalog, &submitted, &err.to_string());
        }
    };

    match state.context.assess(&application) {
        Ok(assessment) => {
            let page = application_page(
                catalog,
                &submitted,
                Some(Outcome::Verdict(assessment.verdict)),
            );
            (StatusCode::OK, Html(page.into_string())).into_response()
        }
        Err(err @ (AssessmentError::Validation(_) | AssessmentError::Lookup(_))) => {
            let message = err.to_string();
            warn!(%message, "application failed input checks");
            unprocessable(catalog, &submitted, &message)
        }
        Err(AssessmentError::Invocation(err)) => {
            error!(error = %err, model = state.context.model_name(), "model invocation failed");
            let page =
                application_page(catalog, &submitted, Some(Outcome::Problem(GENERIC_FAILURE)));
            (StatusCode::INTERNAL_SERVER_ERROR, Html(page.into_string())).into_response()
        }
    }
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
