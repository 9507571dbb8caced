mod common;

use common::{test_catalog, ScriptedClient};
use std::sync::Arc;
use study_buddy::{
    config::PipelineConfig,
    fallback::{self, SummaryFallbackStyle},
    ArtifactSource, CompletionOutcome, Flashcard, LLMService, QuizQuestion,
};

const NOTES: &str = "The French Revolution began in 1789. It abolished the monarchy. Napoleon rose to power afterwards.";

fn service(client: Arc<ScriptedClient>) -> LLMService {
    LLMService::new(client, test_catalog())
}

#[tokio::test]
async fn test_total_failure_matches_fallback_exactly() {
    let client = Arc::new(ScriptedClient::failing());
    let service = service(client.clone());

    let summary = service.summarize(NOTES).await;
    assert_eq!(summary.artifact, fallback::summary(NOTES, SummaryFallbackStyle::Basic));
    assert_eq!(summary.source, ArtifactSource::Fallback);

    let flashcards = service.generate_flashcards(NOTES).await;
    assert_eq!(
        serde_json::to_string(&flashcards.artifact).unwrap(),
        serde_json::to_string(&fallback::flashcards(NOTES)).unwrap()
    );

    let quiz = service.generate_quiz(NOTES).await;
    assert_eq!(
        serde_json::to_string(&quiz.artifact).unwrap(),
        serde_json::to_string(&fallback::quiz()).unwrap()
    );

    // Three tasks, every model tried once per task
    assert_eq!(client.requests().len(), 9);
}

#[tokio::test]
async fn test_nth_model_success_calls_exactly_n_models() {
    let payload = r#"[{"question": "When did it begin?", "options": ["1789", "1815", "1776", "1848"], "answer": "1789"}]"#;
    let client = Arc::new(ScriptedClient::new(vec![
        CompletionOutcome::HttpError { status: 502, body: "bad gateway".to_string() },
        CompletionOutcome::Success(format!("Here is your quiz:\n{}", payload)),
        CompletionOutcome::Success("[]".to_string()),
    ]));

    let outcome = service(client.clone()).generate_quiz(NOTES).await;

    assert_eq!(outcome.models_called, 2);
    assert_eq!(outcome.source, ArtifactSource::Model("model-2".to_string()));
    assert_eq!(client.models_called(), vec!["model-1", "model-2"]);
    assert_eq!(
        outcome.artifact,
        vec![QuizQuestion::new("When did it begin?", &["1789", "1815", "1776", "1848"], "1789")]
    );
}

#[tokio::test]
async fn test_task_budgets_are_sent_to_client() {
    let client = Arc::new(ScriptedClient::new(vec![
        CompletionOutcome::Success("A summary.".to_string()),
        CompletionOutcome::Success(r#"[{"question": "Q", "answer": "A"}]"#.to_string()),
        CompletionOutcome::Success(r#"[{"question": "Q", "options": [], "answer": "A"}]"#.to_string()),
    ]));
    let service = service(client.clone());

    service.summarize(NOTES).await;
    service.generate_flashcards(NOTES).await;
    service.generate_quiz(NOTES).await;

    let budgets: Vec<(u32, f32)> = client
        .requests()
        .iter()
        .map(|r| (r.max_tokens, r.temperature))
        .collect();
    assert_eq!(budgets, vec![(200, 0.3), (1200, 0.2), (1500, 0.2)]);
    assert!(client.requests().iter().all(|r| r.timeout.is_none()));
}

#[tokio::test]
async fn test_flashcard_schema_miss_advances() {
    let client = Arc::new(ScriptedClient::new(vec![
        CompletionOutcome::Success(r#"[{"question": "Missing answer"}]"#.to_string()),
        CompletionOutcome::Success(r#"[{"question": "Q", "answer": "A"}]"#.to_string()),
    ]));

    let outcome = service(client).generate_flashcards(NOTES).await;

    assert_eq!(outcome.models_called, 2);
    assert_eq!(
        outcome.artifact,
        vec![Flashcard::new("Q", "A")]
    );
}

#[tokio::test]
async fn test_strict_quiz_rejects_lenient_payload() {
    let short_options = r#"[{"question": "Q", "options": ["A", "B"], "answer": "A"}]"#;
    let options = PipelineConfig {
        strict_quiz_validation: true,
        summary_fallback: SummaryFallbackStyle::Extractive,
    };

    let client = Arc::new(ScriptedClient::new(vec![
        CompletionOutcome::Success(short_options.to_string()),
        CompletionOutcome::Success(short_options.to_string()),
        CompletionOutcome::Success(short_options.to_string()),
    ]));
    let strict = LLMService::new_with_options(client, test_catalog(), options);
    let outcome = strict.generate_quiz(NOTES).await;
    assert_eq!(outcome.source, ArtifactSource::Fallback);

    let client = Arc::new(ScriptedClient::new(vec![CompletionOutcome::Success(
        short_options.to_string(),
    )]));
    let lenient = service(client).generate_quiz(NOTES).await;
    assert_eq!(lenient.source, ArtifactSource::Model("model-1".to_string()));
}

#[tokio::test]
async fn test_extractive_summary_fallback() {
    let options = PipelineConfig {
        strict_quiz_validation: false,
        summary_fallback: SummaryFallbackStyle::Extractive,
    };
    let service = LLMService::new_with_options(Arc::new(ScriptedClient::failing()), test_catalog(), options);

    let outcome = service.summarize(NOTES).await;
    assert!(outcome.artifact.starts_with("The French Revolution began in 1789. It abolished the monarchy. (Local summary of 15 words"));
}

#[tokio::test]
async fn test_lenient_quiz_with_numeric_values_served_from_first_model() {
    let payload = r#"[{"question":"2+2?","options":[3,4,5,6],"answer":4}]"#;
    let client = Arc::new(ScriptedClient::new(vec![CompletionOutcome::Success(payload.to_string())]));

    let outcome = service(client.clone()).generate_quiz(NOTES).await;

    assert_eq!(outcome.source, ArtifactSource::Model("model-1".to_string()));
    assert_eq!(outcome.models_called, 1);
    let expected: serde_json::Value = serde_json::from_str(payload).unwrap();
    assert_eq!(serde_json::to_value(&outcome.artifact).unwrap(), expected);
}

#[tokio::test]
async fn test_flashcard_payload_returned_unmodified() {
    let payload = r#"[{"question":"Q","answer":"A","difficulty":"easy"}]"#;
    let client = Arc::new(ScriptedClient::new(vec![CompletionOutcome::Success(payload.to_string())]));

    let outcome = service(client).generate_flashcards(NOTES).await;

    assert_eq!(outcome.source, ArtifactSource::Model("model-1".to_string()));
    let expected: serde_json::Value = serde_json::from_str(payload).unwrap();
    assert_eq!(
        serde_json::to_string(&outcome.artifact).unwrap(),
        serde_json::to_string(&expected).unwrap()
    );
}
