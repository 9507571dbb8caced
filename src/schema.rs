use serde_json::Value;

/// Expected structure of an extracted model payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Flashcards,
    /// Key presence only
    QuizLenient,
    /// Exactly 4 string options and an answer that is one of them
    QuizStrict,
    /// Plain text; nothing to check structurally
    Summary,
}

/// Check an extracted candidate against the target shape
pub fn validate(candidate: &Value, shape: Shape) -> bool {
    match shape {
        Shape::Summary => match candidate {
            Value::String(text) => !text.trim().is_empty(),
            _ => false,
        },
        Shape::Flashcards => every_element(candidate, is_flashcard),
        Shape::QuizLenient => every_element(candidate, |item| {
            ["question", "options", "answer"]
                .iter()
                .all(|key| item.get(key).is_some())
        }),
        Shape::QuizStrict => every_element(candidate, is_strict_quiz_question),
    }
}

fn every_element(candidate: &Value, check: impl Fn(&Value) -> bool) -> bool {
    match candidate.as_array() {
        Some(items) if !items.is_empty() => items.iter().all(|item| item.is_object() && check(item)),
        _ => false,
    }
}

fn non_empty_str<'a>(item: &'a Value, key: &str) -> Option<&'a str> {
    item.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

fn is_flashcard(item: &Value) -> bool {
    non_empty_str(item, "question").is_some() && non_empty_str(item, "answer").is_some()
}

fn is_strict_quiz_question(item: &Value) -> bool {
    if non_empty_str(item, "question").is_none() {
        return false;
    }

    let Some(options) = item.get("options").and_then(Value::as_array) else {
        return false;
    };
    let Some(options) = options.iter().map(Value::as_str).collect::<Option<Vec<&str>>>() else {
        return false;
    };
    if options.len() != 4 {
        return false;
    }

    item.get("answer")
        .and_then(Value::as_str)
        .is_some_and(|answer| options.contains(&answer))
}
