use std::fmt;
use uuid::Uuid;

use crate::llm_providers::{CompletionClient, CompletionOutcome, CompletionRequest, ModelCatalog};
use crate::models::{ArtifactSource, GenerationOutcome};

// Import logging macros
use crate::log_pipeline;

/// Sampling budget for one task
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationSettings {
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Why a successful completion was still treated as a miss
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseRejection {
    EmptyResponse,
    ExtractionFailed,
    SchemaMismatch,
}

impl ResponseRejection {
    pub fn label(&self) -> &'static str {
        match self {
            ResponseRejection::EmptyResponse => "empty_response",
            ResponseRejection::ExtractionFailed => "extraction_failed",
            ResponseRejection::SchemaMismatch => "schema_mismatch",
        }
    }
}

impl fmt::Display for ResponseRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseRejection::EmptyResponse => write!(f, "model returned no text"),
            ResponseRejection::ExtractionFailed => write!(f, "no JSON array found in response"),
            ResponseRejection::SchemaMismatch => write!(f, "JSON did not match the expected shape"),
        }
    }
}

/// Task-specific hooks plugged into [`run_pipeline`]
pub trait GenerationTask: Send + Sync {
    type Output: Send;

    /// Short task name used in log events
    fn name(&self) -> &'static str;

    fn settings(&self) -> GenerationSettings;

    fn prompt(&self, notes: &str) -> String;

    /// Extract and validate one raw completion
    fn parse(&self, raw: &str) -> Result<Self::Output, ResponseRejection>;

    /// Artifact served after every model in the catalog missed
    fn fallback(&self, notes: &str) -> Self::Output;

    /// Artifact served when no credential is configured
    fn unconfigured(&self, notes: &str) -> Self::Output;
}

/// Try each catalog model in order until one yields a valid artifact.
///
/// Calls are strictly sequential and the first valid response by catalog
/// order wins. Provider failures and malformed output both advance to the
/// next model; an exhausted catalog ends in the task's local fallback, so
/// this never fails.
pub async fn run_pipeline<T: GenerationTask>(
    client: &dyn CompletionClient,
    catalog: &ModelCatalog,
    task: &T,
    notes: &str,
) -> GenerationOutcome<T::Output> {
    let run_id = Uuid::new_v4();
    let task_name = task.name();

    if !client.is_configured() {
        log_pipeline!(unconfigured, run_id = run_id, task = task_name);
        return GenerationOutcome {
            artifact: task.unconfigured(notes),
            source: ArtifactSource::Unconfigured,
            models_called: 0,
        };
    }

    log_pipeline!(start, run_id = run_id, task = task_name, models = catalog.len());

    let settings = task.settings();
    let prompt = task.prompt(notes);
    let mut models_called = 0;

    for (index, model) in catalog.iter().enumerate() {
        models_called += 1;
        log_pipeline!(attempt, run_id = run_id, task = task_name, model = model, index = index + 1);

        let request = CompletionRequest {
            model: model.to_string(),
            prompt: prompt.clone(),
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
            timeout: None,
        };

        match client.complete(&request).await {
            CompletionOutcome::Success(raw) => match task.parse(&raw) {
                Ok(artifact) => {
                    log_pipeline!(success, run_id = run_id, task = task_name, model = model, attempts = models_called);
                    return GenerationOutcome {
                        artifact,
                        source: ArtifactSource::Model(model.to_string()),
                        models_called,
                    };
                }
                Err(rejection) => {
                    tracing::debug!(
                        run_id = %run_id,
                        task = task_name,
                        model = %model,
                        raw_preview = %raw.chars().take(200).collect::<String>(),
                        "Rejected model response"
                    );
                    log_pipeline!(advance, run_id = run_id, task = task_name, model = model, outcome = rejection.label(), rejection);
                }
            },
            CompletionOutcome::Unconfigured => {
                log_pipeline!(unconfigured, run_id = run_id, task = task_name);
                return GenerationOutcome {
                    artifact: task.unconfigured(notes),
                    source: ArtifactSource::Unconfigured,
                    models_called,
                };
            }
            failure => {
                log_pipeline!(advance, run_id = run_id, task = task_name, model = model, outcome = failure.label(), failure);
            }
        }
    }

    log_pipeline!(fallback, run_id = run_id, task = task_name, attempts = models_called);
    GenerationOutcome {
        artifact: task.fallback(notes),
        source: ArtifactSource::Fallback,
        models_called,
    }
}
