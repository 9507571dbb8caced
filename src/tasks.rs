use serde_json::{Map, Value};

use crate::fallback::{self, SummaryFallbackStyle};
use crate::models::{Flashcard, QuizQuestion};
use crate::pipeline::{GenerationSettings, GenerationTask, ResponseRejection};
use crate::response_parser::JsonResponseParser;
use crate::schema::{self, Shape};

pub const API_KEY_NOT_CONFIGURED: &str = "API key not configured";

/// Extract and validate a JSON array payload. Accepted elements are passed
/// through untouched; the shape check alone decides hit or miss.
fn parse_structured<T: From<Map<String, Value>>>(raw: &str, shape: Shape) -> Result<Vec<T>, ResponseRejection> {
    let candidate = JsonResponseParser::extract(raw).ok_or(ResponseRejection::ExtractionFailed)?;

    if !schema::validate(&candidate, shape) {
        return Err(ResponseRejection::SchemaMismatch);
    }

    let Value::Array(items) = candidate else {
        return Err(ResponseRejection::SchemaMismatch);
    };
    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(fields) => Some(T::from(fields)),
            _ => None,
        })
        .collect())
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryTask {
    pub fallback_style: SummaryFallbackStyle,
}

impl GenerationTask for SummaryTask {
    type Output = String;

    fn name(&self) -> &'static str {
        "summary"
    }

    fn settings(&self) -> GenerationSettings {
        GenerationSettings {
            max_tokens: 200,
            temperature: 0.3,
        }
    }

    fn prompt(&self, notes: &str) -> String {
        format!(
            "Please provide a clear and concise summary of the following text in 2-3 sentences:\n\n{}",
            notes
        )
    }

    fn parse(&self, raw: &str) -> Result<String, ResponseRejection> {
        let summary = raw.trim();
        if schema::validate(&Value::String(summary.to_string()), Shape::Summary) {
            Ok(summary.to_string())
        } else {
            Err(ResponseRejection::EmptyResponse)
        }
    }

    fn fallback(&self, notes: &str) -> String {
        fallback::summary(notes, self.fallback_style)
    }

    fn unconfigured(&self, _notes: &str) -> String {
        API_KEY_NOT_CONFIGURED.to_string()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FlashcardTask;

impl GenerationTask for FlashcardTask {
    type Output = Vec<Flashcard>;

    fn name(&self) -> &'static str {
        "flashcards"
    }

    fn settings(&self) -> GenerationSettings {
        GenerationSettings {
            max_tokens: 1200,
            temperature: 0.2,
        }
    }

    fn prompt(&self, notes: &str) -> String {
        format!(
            r#"Create exactly 4 flashcards from this content. Return ONLY valid JSON format with no extra text:

{}

Format:
[
    {{"question": "What is X?", "answer": "X is..."}},
    {{"question": "What is Y?", "answer": "Y is..."}}
]"#,
            notes
        )
    }

    fn parse(&self, raw: &str) -> Result<Vec<Flashcard>, ResponseRejection> {
        parse_structured(raw, Shape::Flashcards)
    }

    fn fallback(&self, notes: &str) -> Vec<Flashcard> {
        fallback::flashcards(notes)
    }

    // An empty list would surface as a 500; a missing key alone must not
    fn unconfigured(&self, notes: &str) -> Vec<Flashcard> {
        fallback::flashcards(notes)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct QuizTask {
    /// Require exactly 4 options and an answer drawn from them
    pub strict: bool,
}

impl GenerationTask for QuizTask {
    type Output = Vec<QuizQuestion>;

    fn name(&self) -> &'static str {
        "quiz"
    }

    fn settings(&self) -> GenerationSettings {
        GenerationSettings {
            max_tokens: 1500,
            temperature: 0.2,
        }
    }

    fn prompt(&self, notes: &str) -> String {
        format!(
            r#"Create exactly 3 multiple choice questions from this content. Return ONLY valid JSON format:

{}

Format:
[
    {{
        "question": "What is X?",
        "options": ["Option A", "Option B", "Option C", "Option D"],
        "answer": "Option A"
    }}
]"#,
            notes
        )
    }

    fn parse(&self, raw: &str) -> Result<Vec<QuizQuestion>, ResponseRejection> {
        let shape = if self.strict { Shape::QuizStrict } else { Shape::QuizLenient };
        parse_structured(raw, shape)
    }

    fn fallback(&self, _notes: &str) -> Vec<QuizQuestion> {
        fallback::quiz()
    }

    fn unconfigured(&self, notes: &str) -> Vec<QuizQuestion> {
        self.fallback(notes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_parse_trims_and_rejects_blank() {
        let task = SummaryTask::default();
        assert_eq!(task.parse("  A concise summary.\n").unwrap(), "A concise summary.");
        assert_eq!(task.parse(" \n "), Err(ResponseRejection::EmptyResponse));
    }

    #[test]
    fn test_summary_prompt_and_budget() {
        let task = SummaryTask::default();
        assert!(task.prompt("Cells divide.").ends_with("in 2-3 sentences:\n\nCells divide."));
        assert_eq!(task.settings(), GenerationSettings { max_tokens: 200, temperature: 0.3 });
        assert_eq!(task.unconfigured("anything"), "API key not configured");
    }

    #[test]
    fn test_flashcard_parse_from_fenced_response() {
        let raw = "```json\n[{\"question\": \"What is ATP?\", \"answer\": \"Energy currency\"}]\n```";
        let cards = FlashcardTask.parse(raw).unwrap();
        assert_eq!(cards, vec![Flashcard::new("What is ATP?", "Energy currency")]);
    }

    #[test]
    fn test_flashcard_parse_rejections() {
        assert_eq!(FlashcardTask.parse("no json here"), Err(ResponseRejection::ExtractionFailed));
        assert_eq!(
            FlashcardTask.parse(r#"[{"question": "Q"}]"#),
            Err(ResponseRejection::SchemaMismatch)
        );
    }

    #[test]
    fn test_flashcard_prompt_embeds_notes() {
        let prompt = FlashcardTask.prompt("Mitochondria");
        assert!(prompt.starts_with("Create exactly 4 flashcards"));
        assert!(prompt.contains("\n\nMitochondria\n\n"));
        assert!(prompt.contains(r#"{"question": "What is X?", "answer": "X is..."}"#));
    }

    #[test]
    fn test_quiz_lenient_accepts_short_options() {
        let raw = r#"[{"question": "Q", "options": ["A", "B"], "answer": "A"}]"#;
        let quiz = QuizTask::default().parse(raw).unwrap();
        assert_eq!(quiz[0].options(), Some(&serde_json::json!(["A", "B"])));

        assert_eq!(
            QuizTask { strict: true }.parse(raw),
            Err(ResponseRejection::SchemaMismatch)
        );
    }

    #[test]
    fn test_quiz_lenient_keeps_non_string_values() {
        let raw = r#"[{"question": "2+2?", "options": [3, 4, 5, 6], "answer": 4}]"#;
        let quiz = QuizTask::default().parse(raw).unwrap();
        assert_eq!(quiz[0].options(), Some(&serde_json::json!([3, 4, 5, 6])));
        assert_eq!(quiz[0].answer(), Some(&serde_json::json!(4)));

        assert_eq!(
            QuizTask { strict: true }.parse(raw),
            Err(ResponseRejection::SchemaMismatch)
        );
    }

    #[test]
    fn test_flashcard_extra_keys_are_preserved() {
        let raw = r#"[{"question": "Q", "answer": "A", "difficulty": "easy"}]"#;
        let cards = FlashcardTask.parse(raw).unwrap();
        assert_eq!(cards[0].get("difficulty"), Some(&serde_json::json!("easy")));

        let expected: Value = serde_json::from_str(raw).unwrap();
        assert_eq!(serde_json::to_value(&cards).unwrap(), expected);
    }

    #[test]
    fn test_unconfigured_structured_tasks_use_fallback() {
        assert_eq!(FlashcardTask.unconfigured("notes").len(), 3);
        assert_eq!(QuizTask::default().unconfigured("notes"), fallback::quiz());
    }
}
