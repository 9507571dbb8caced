use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One flashcard exactly as the model produced it; keys beyond
/// `question`/`answer` are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Flashcard(Map<String, Value>);

impl Flashcard {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert("question".to_string(), Value::String(question.into()));
        fields.insert("answer".to_string(), Value::String(answer.into()));
        Self(fields)
    }

    pub fn question(&self) -> Option<&str> {
        self.0.get("question").and_then(Value::as_str)
    }

    pub fn answer(&self) -> Option<&str> {
        self.0.get("answer").and_then(Value::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}

impl From<Map<String, Value>> for Flashcard {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// One multiple-choice question as the model produced it. Under lenient
/// validation `options` and `answer` may hold any JSON value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuizQuestion(Map<String, Value>);

impl QuizQuestion {
    pub fn new(question: impl Into<String>, options: &[&str], answer: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert("question".to_string(), Value::String(question.into()));
        fields.insert(
            "options".to_string(),
            Value::Array(options.iter().map(|o| Value::String(o.to_string())).collect()),
        );
        fields.insert("answer".to_string(), Value::String(answer.into()));
        Self(fields)
    }

    pub fn question(&self) -> Option<&Value> {
        self.0.get("question")
    }

    pub fn options(&self) -> Option<&Value> {
        self.0.get("options")
    }

    pub fn answer(&self) -> Option<&Value> {
        self.0.get("answer")
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}

impl From<Map<String, Value>> for QuizQuestion {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// Request body shared by all three generation endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotesRequest {
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlashcardsResponse {
    pub flashcards: Vec<Flashcard>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizResponse {
    pub quiz: Vec<QuizQuestion>,
}

/// Where a generated artifact came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "model", rename_all = "snake_case")]
pub enum ArtifactSource {
    Model(String),
    Fallback,
    Unconfigured,
}

/// Result of one pipeline run
#[derive(Debug, Clone)]
pub struct GenerationOutcome<T> {
    pub artifact: T,
    pub source: ArtifactSource,
    pub models_called: usize,
}

impl<T> GenerationOutcome<T> {
    pub fn is_degraded(&self) -> bool {
        !matches!(self.source, ArtifactSource::Model(_))
    }
}
