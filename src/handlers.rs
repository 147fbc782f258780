use crate::advisor::AdvisorService;
use crate::errors::{AppError, ResultExt};
use crate::models::{utc_timestamp, ClientProfile, CoverageResult, HealthResponse};
use crate::report::CoverageReport;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Advisory pipeline wrapping the language-model client.
    pub advisor: AdvisorService,
}

/// Builds the HTTP application.
///
/// Advisory routes are served both at the root and under `/advisor`.
pub fn router(state: Arc<AppState>) -> Router {
    let advisor_routes = Router::new()
        .route("/health", get(health))
        .route("/advise", post(advise))
        .route("/advise/report", post(advise_report));

    Router::new()
        .route("/", get(root))
        .merge(advisor_routes.clone())
        .nest("/advisor", advisor_routes)
        .with_state(state)
        .layer(
            // 64 KiB request body cap
            ServiceBuilder::new().layer(RequestBodyLimitLayer::new(64 * 1024)),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

pub async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "message": "Welcome to AI Life Insurance Advisor API"
    }))
}

/// Health check endpoint. Always 200.
pub async fn health() -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
            timestamp: utc_timestamp(),
        }),
    )
}

/// POST /advise
///
/// Returns the normalized coverage recommendation for the submitted profile.
/// A body that does not deserialize into a profile is rejected with 422.
pub async fn advise(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ClientProfile>, JsonRejection>,
) -> Result<Json<CoverageResult>, AppError> {
    let Json(profile) = payload?;
    tracing::info!("POST /advise - location: {}", profile.location);

    let result = state
        .advisor
        .advise(&profile)
        .await
        .context("Coverage advice")?;

    tracing::info!(
        "Advice ready: coverage {} {}",
        result.coverage_amount,
        result.coverage_currency
    );
    Ok(Json(result))
}

#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub result: CoverageResult,
    pub report: CoverageReport,
}

/// POST /advise/report
///
/// Same as `/advise`, plus the step-by-step report comparing the model's
/// figure with the local formula.
pub async fn advise_report(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ClientProfile>, JsonRejection>,
) -> Result<Json<ReportResponse>, AppError> {
    let Json(profile) = payload?;
    tracing::info!("POST /advise/report - location: {}", profile.location);

    let result = state
        .advisor
        .advise(&profile)
        .await
        .context("Coverage report")?;
    let report = CoverageReport::build(&result, &profile);

    tracing::info!(
        "Report ready: model {} vs formula {}",
        report.total_coverage,
        report.estimate.recommended_amount()
    );
    Ok(Json(ReportResponse { result, report }))
}
