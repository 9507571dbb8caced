#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::TestServer;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use study_buddy::{
    api::{create_router, AppState},
    CompletionClient, CompletionOutcome, CompletionRequest, CredentialStatus, LLMService, ModelCatalog, ModelInfo,
};

/// Completion client that replays a fixed script and records every request
pub struct ScriptedClient {
    configured: bool,
    outcomes: Mutex<VecDeque<CompletionOutcome>>,
    requests: Mutex<Vec<CompletionRequest>>,
    models: Option<Vec<ModelInfo>>,
}

impl ScriptedClient {
    pub fn new(outcomes: Vec<CompletionOutcome>) -> Self {
        Self {
            configured: true,
            outcomes: Mutex::new(outcomes.into()),
            requests: Mutex::new(Vec::new()),
            models: None,
        }
    }

    /// Serve this listing from `list_models`; without it the call fails with a 503
    pub fn with_models(mut self, models: Vec<ModelInfo>) -> Self {
        self.models = Some(models);
        self
    }

    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::new(vec![])
        }
    }

    pub fn failing() -> Self {
        Self::new(vec![])
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn models_called(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.model).collect()
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    fn is_configured(&self) -> bool {
        self.configured
    }

    fn provider_name(&self) -> &'static str {
        "Scripted"
    }

    async fn complete(&self, request: &CompletionRequest) -> CompletionOutcome {
        self.requests.lock().unwrap().push(request.clone());
        // Running off the end of the script behaves like an overloaded provider
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(CompletionOutcome::HttpError {
                status: 503,
                body: "unavailable".to_string(),
            })
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>, CompletionOutcome> {
        self.models.clone().ok_or(CompletionOutcome::HttpError {
            status: 503,
            body: "unavailable".to_string(),
        })
    }
}

pub fn model_info(id: &str, free: bool) -> ModelInfo {
    ModelInfo {
        id: id.to_string(),
        name: None,
        context_length: Some(4096),
        free,
    }
}

pub fn test_catalog() -> ModelCatalog {
    ModelCatalog::new(vec![
        "model-1".to_string(),
        "model-2".to_string(),
        "model-3".to_string(),
    ])
}

pub fn test_server(client: Arc<ScriptedClient>) -> TestServer {
    let credential = if client.is_configured() {
        CredentialStatus::from_key(Some("sk-or-v1-test-key-123456"))
    } else {
        CredentialStatus::from_key(None)
    };

    let state = AppState {
        llm_service: LLMService::new(client, test_catalog()),
        credential,
    };

    TestServer::new(create_router(state)).unwrap()
}
