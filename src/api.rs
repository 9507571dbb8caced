use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};

use crate::{
    api_error,
    config::CredentialStatus,
    errors::ApiErrorResponse,
    llm_providers::CompletionOutcome,
    llm_service::{LLMService, ProbeReport, ServiceCheckReport, SERVICE_CHECK_SAMPLE},
    models::*,
};

// Import logging macros
use crate::{log_api_start, log_api_success, log_api_warn, log_validation};

pub const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Clone)]
pub struct AppState {
    pub llm_service: LLMService,
    pub credential: CredentialStatus,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub api_key_set: bool,
    pub api_key_valid_format: bool,
    pub timestamp: String,
    pub services: Vec<&'static str>,
    pub provider: &'static str,
    pub models: Vec<String>,
}

/// Trim the notes field and reject missing or blank input
fn validated_notes(
    operation: &str,
    resource_type: &str,
    payload: Result<Json<NotesRequest>, JsonRejection>,
) -> Result<String, ApiErrorResponse> {
    let Json(request) = payload.map_err(|rejection| {
        log_validation!(failure, operation, error = rejection.body_text());
        api_error!(bad_request, operation, resource_type, rejection.body_text())
    })?;

    let notes = request.notes.as_deref().map(str::trim).unwrap_or_default();
    if notes.is_empty() {
        return Err(api_error!(validation, operation, resource_type, "Notes are required"));
    }

    log_validation!(success, operation, "notes present");
    Ok(notes.to_string())
}

pub async fn summarize(
    State(state): State<AppState>,
    payload: Result<Json<NotesRequest>, JsonRejection>,
) -> Result<Json<SummaryResponse>, ApiErrorResponse> {
    let notes = validated_notes("summarize", "summary", payload)?;
    log_api_start!("summarize", notes_length = notes.len());

    let outcome = state.llm_service.summarize(&notes).await;
    if outcome.artifact.trim().is_empty() {
        return Err(api_error!(generation, "summarize", "summary", "pipeline returned an empty summary"));
    }

    log_api_success!("summarize", source = outcome.source, "summary generated");
    Ok(Json(SummaryResponse {
        summary: outcome.artifact,
    }))
}

pub async fn generate_flashcards(
    State(state): State<AppState>,
    payload: Result<Json<NotesRequest>, JsonRejection>,
) -> Result<Json<FlashcardsResponse>, ApiErrorResponse> {
    let notes = validated_notes("generate_flashcards", "flashcards", payload)?;
    log_api_start!("generate_flashcards", notes_length = notes.len());

    let outcome = state.llm_service.generate_flashcards(&notes).await;
    if outcome.artifact.is_empty() {
        return Err(api_error!(generation, "generate_flashcards", "flashcards", "pipeline returned no flashcards"));
    }

    log_api_success!(
        "generate_flashcards",
        source = outcome.source,
        count = outcome.artifact.len(),
        "flashcards generated"
    );
    Ok(Json(FlashcardsResponse {
        flashcards: outcome.artifact,
    }))
}

pub async fn generate_quiz(
    State(state): State<AppState>,
    payload: Result<Json<NotesRequest>, JsonRejection>,
) -> Result<Json<QuizResponse>, ApiErrorResponse> {
    let notes = validated_notes("generate_quiz", "quiz", payload)?;
    log_api_start!("generate_quiz", notes_length = notes.len());

    let outcome = state.llm_service.generate_quiz(&notes).await;
    if outcome.artifact.is_empty() {
        return Err(api_error!(generation, "generate_quiz", "quiz", "pipeline returned no questions"));
    }

    log_api_success!(
        "generate_quiz",
        source = outcome.source,
        count = outcome.artifact.len(),
        "quiz generated"
    );
    Ok(Json(QuizResponse {
        quiz: outcome.artifact,
    }))
}

pub async fn root(State(state): State<AppState>) -> Json<Value> {
    let configured = state.credential.api_key_set;
    let status = if configured { "Ready" } else { "API Key Required" };
    Json(json!({
        "message": "StudyBuddy API is running",
        "api_key_configured": configured,
        "version": SERVICE_VERSION,
        "status": status,
        "endpoints": {
            "summarize": "/api/summarize",
            "flashcards": "/api/generate-flashcards",
            "quiz": "/api/generate-quiz",
            "health": "/health",
            "debug": "/debug/test-api-quick"
        }
    }))
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    log_api_start!("health");
    Json(HealthResponse {
        status: "healthy",
        api_key_set: state.credential.api_key_set,
        api_key_valid_format: state.credential.api_key_format_correct,
        timestamp: Utc::now().to_rfc3339(),
        services: vec!["summarize", "flashcards", "quiz"],
        provider: state.llm_service.provider_name(),
        models: state.llm_service.catalog().iter().map(str::to_string).collect(),
    })
}

pub async fn debug_env(State(state): State<AppState>) -> Json<CredentialStatus> {
    log_api_start!("debug_env");
    Json(state.credential)
}

pub async fn debug_probe(State(state): State<AppState>) -> Json<ProbeReport> {
    log_api_start!("debug_probe");
    let report = state.llm_service.probe().await;
    log_api_success!("debug_probe", format!("probe finished: {}", report.outcome));
    Json(report)
}

pub async fn debug_all_services(State(state): State<AppState>) -> Json<ServiceCheckReport> {
    log_api_start!("debug_all_services");
    let report = state.llm_service.check_all_services().await;
    log_api_success!("debug_all_services", &report.overall_status);
    Json(report)
}

pub async fn debug_summarize_only(State(state): State<AppState>) -> Json<Value> {
    log_api_start!("debug_summarize_only");
    let outcome = state.llm_service.summarize(SERVICE_CHECK_SAMPLE).await;
    let is_fallback = outcome.is_degraded();
    let summary_length = outcome.artifact.chars().count();
    let status = if is_fallback { "fallback" } else { "success" };

    log_api_success!("debug_summarize_only", source = outcome.source, "summary check finished");
    Json(json!({
        "status": status,
        "test_content": SERVICE_CHECK_SAMPLE,
        "summary_result": outcome.artifact,
        "summary_length": summary_length,
        "is_fallback": is_fallback,
        "source": outcome.source,
    }))
}

pub async fn debug_list_free_models(State(state): State<AppState>) -> Json<Value> {
    log_api_start!("debug_list_free_models");
    match state.llm_service.list_free_models().await {
        Ok(listing) => {
            log_api_success!(
                "debug_list_free_models",
                format!("{} free models listed", listing.free_models_count)
            );
            Json(json!({
                "status": "success",
                "total_models": listing.total_models,
                "free_models_count": listing.free_models_count,
                "recommended_free_models": listing.recommended_free_models,
                "all_free_models": listing.all_free_models,
            }))
        }
        Err(outcome) => {
            log_api_warn!("debug_list_free_models", &outcome);
            let mut body = json!({ "status": "error", "error": outcome.to_string() });
            if let CompletionOutcome::HttpError { status, .. } = outcome {
                body["status_code"] = json!(status);
            }
            Json(body)
        }
    }
}

fn generation_routes() -> Router<AppState> {
    Router::new()
        .route("/summarize", post(summarize))
        .route("/generate-flashcards", post(generate_flashcards))
        .route("/generate-quiz", post(generate_quiz))
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Service routes
        .route("/", get(root))
        .route("/health", get(health))
        .route("/debug/env", get(debug_env))
        .route("/debug/test-api-quick", post(debug_probe))
        .route("/debug/test-all-services", post(debug_all_services))
        .route("/debug/test-summarize-only", post(debug_summarize_only))
        .route("/debug/list-free-models", get(debug_list_free_models))
        // Generation routes, also served under the legacy /api prefix
        .merge(generation_routes())
        .nest("/api", generation_routes())
        .with_state(state)
}
