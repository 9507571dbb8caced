use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::config::{Config, PipelineConfig};
use crate::llm_providers::{
    CompletionClient, CompletionOutcome, CompletionRequest, ModelCatalog, ModelInfo, OpenRouterProvider,
};
use crate::models::{ArtifactSource, Flashcard, GenerationOutcome, QuizQuestion};
use crate::pipeline::run_pipeline;
use crate::tasks::{FlashcardTask, QuizTask, SummaryTask};

/// Connectivity checks use a shorter bounded wait than generation
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(15);

/// Result of a single lightweight completion against the first catalog model
#[derive(Debug, Clone, Serialize)]
pub struct ProbeReport {
    pub success: bool,
    pub model_used: Option<String>,
    pub outcome: String,
    pub response: Option<String>,
}

/// Built-in notes used by the service self-checks
pub const SERVICE_CHECK_SAMPLE: &str = "Machine learning is a subset of artificial intelligence (AI) that focuses on algorithms that can learn and make decisions from data. It includes supervised learning, unsupervised learning, and reinforcement learning. Deep learning uses neural networks with multiple layers.";

/// At most this many free models are echoed back by the listing check
pub const FREE_MODEL_LIST_LIMIT: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Success,
    Fallback,
}

/// Outcome of running one generation pipeline on the sample notes
#[derive(Debug, Clone, Serialize)]
pub struct ServiceCheck {
    pub status: CheckStatus,
    pub source: ArtifactSource,
    pub models_called: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    pub result: Value,
}

impl ServiceCheck {
    fn from_outcome<T: Serialize>(outcome: GenerationOutcome<T>, count: Option<usize>) -> Self {
        let status = if outcome.is_degraded() {
            CheckStatus::Fallback
        } else {
            CheckStatus::Success
        };
        Self {
            status,
            models_called: outcome.models_called,
            count,
            result: serde_json::to_value(&outcome.artifact).unwrap_or_default(),
            source: outcome.source,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceCheckResults {
    pub summarization: ServiceCheck,
    pub flashcards: ServiceCheck,
    pub quiz: ServiceCheck,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceCheckBreakdown {
    pub working: Vec<&'static str>,
    pub fallback: Vec<&'static str>,
}

/// All three pipelines run once against [`SERVICE_CHECK_SAMPLE`]
#[derive(Debug, Clone, Serialize)]
pub struct ServiceCheckReport {
    pub test_content: &'static str,
    pub results: ServiceCheckResults,
    pub overall_status: String,
    pub all_working: bool,
    pub summary: ServiceCheckBreakdown,
}

/// Free models currently offered by the provider
#[derive(Debug, Clone, Serialize)]
pub struct FreeModelListing {
    pub total_models: usize,
    pub free_models_count: usize,
    /// The catalog the pipelines actually use
    pub recommended_free_models: Vec<String>,
    pub all_free_models: Vec<ModelInfo>,
}

/// Study-artifact generation over a shared completion client and model catalog
#[derive(Clone)]
pub struct LLMService {
    client: Arc<dyn CompletionClient>,
    catalog: Arc<ModelCatalog>,
    summary_task: SummaryTask,
    flashcard_task: FlashcardTask,
    quiz_task: QuizTask,
}

impl LLMService {
    pub fn new(client: Arc<dyn CompletionClient>, catalog: ModelCatalog) -> Self {
        Self::new_with_options(client, catalog, PipelineConfig::default())
    }

    pub fn new_with_options(
        client: Arc<dyn CompletionClient>,
        catalog: ModelCatalog,
        options: PipelineConfig,
    ) -> Self {
        Self {
            client,
            catalog: Arc::new(catalog),
            summary_task: SummaryTask {
                fallback_style: options.summary_fallback,
            },
            flashcard_task: FlashcardTask,
            quiz_task: QuizTask {
                strict: options.strict_quiz_validation,
            },
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let provider = OpenRouterProvider::from_config(&config.llm);
        info!(
            provider = provider.provider_name(),
            base_url = %provider.base_url(),
            configured = provider.is_configured(),
            "Initialized completion client"
        );
        Self::new_with_options(Arc::new(provider), config.llm.models.clone(), config.pipeline.clone())
    }

    pub fn provider_name(&self) -> &'static str {
        self.client.provider_name()
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_configured()
    }

    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    pub async fn summarize(&self, notes: &str) -> GenerationOutcome<String> {
        run_pipeline(self.client.as_ref(), &self.catalog, &self.summary_task, notes).await
    }

    pub async fn generate_flashcards(&self, notes: &str) -> GenerationOutcome<Vec<Flashcard>> {
        run_pipeline(self.client.as_ref(), &self.catalog, &self.flashcard_task, notes).await
    }

    pub async fn generate_quiz(&self, notes: &str) -> GenerationOutcome<Vec<QuizQuestion>> {
        run_pipeline(self.client.as_ref(), &self.catalog, &self.quiz_task, notes).await
    }

    /// Run every pipeline once on the sample notes, one after another
    pub async fn check_all_services(&self) -> ServiceCheckReport {
        let summary = self.summarize(SERVICE_CHECK_SAMPLE).await;
        let flashcards = self.generate_flashcards(SERVICE_CHECK_SAMPLE).await;
        let flashcard_count = flashcards.artifact.len();
        let quiz = self.generate_quiz(SERVICE_CHECK_SAMPLE).await;
        let quiz_count = quiz.artifact.len();

        let results = ServiceCheckResults {
            summarization: ServiceCheck::from_outcome(summary, None),
            flashcards: ServiceCheck::from_outcome(flashcards, Some(flashcard_count)),
            quiz: ServiceCheck::from_outcome(quiz, Some(quiz_count)),
        };

        let checks = [
            ("summarization", results.summarization.status),
            ("flashcards", results.flashcards.status),
            ("quiz", results.quiz.status),
        ];
        let working: Vec<&'static str> = checks
            .iter()
            .filter(|(_, status)| *status == CheckStatus::Success)
            .map(|(name, _)| *name)
            .collect();
        let fallback: Vec<&'static str> = checks
            .iter()
            .filter(|(_, status)| *status == CheckStatus::Fallback)
            .map(|(name, _)| *name)
            .collect();

        info!(working = working.len(), total = checks.len(), "Service self-check finished");

        ServiceCheckReport {
            test_content: SERVICE_CHECK_SAMPLE,
            overall_status: format!("{}/{} services working", working.len(), checks.len()),
            all_working: working.len() == checks.len(),
            results,
            summary: ServiceCheckBreakdown { working, fallback },
        }
    }

    pub async fn list_free_models(&self) -> Result<FreeModelListing, CompletionOutcome> {
        let models = self.client.list_models().await?;
        let total_models = models.len();
        let free: Vec<ModelInfo> = models.into_iter().filter(|m| m.free).collect();

        Ok(FreeModelListing {
            total_models,
            free_models_count: free.len(),
            recommended_free_models: self.catalog.iter().map(str::to_string).collect(),
            all_free_models: free.into_iter().take(FREE_MODEL_LIST_LIMIT).collect(),
        })
    }

    /// One short completion against the highest-priority model
    pub async fn probe(&self) -> ProbeReport {
        let Some(model) = self.catalog.first() else {
            return ProbeReport {
                success: false,
                model_used: None,
                outcome: "model catalog is empty".to_string(),
                response: None,
            };
        };

        let request = CompletionRequest {
            model: model.to_string(),
            prompt: "Say 'Hello! API is working.' and nothing else.".to_string(),
            max_tokens: 50,
            temperature: 0.0,
            timeout: Some(PROBE_TIMEOUT),
        };

        let outcome = self.client.complete(&request).await;
        let response = match &outcome {
            CompletionOutcome::Success(text) => Some(text.trim().to_string()),
            _ => None,
        };

        ProbeReport {
            success: response.is_some(),
            model_used: Some(model.to_string()),
            outcome: outcome.to_string(),
            response,
        }
    }
}
