use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static JSON_FENCE_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```json\s*").expect("valid fence regex"));
static FENCE_LEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^```\s*").expect("valid fence regex"));
static FENCE_TRAILING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```\s*$").expect("valid fence regex"));

/// Recovers a JSON array from free-form model output
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonResponseParser;

impl JsonResponseParser {
    /// Remove markdown code fences and surrounding whitespace
    pub fn strip_code_fences(content: &str) -> String {
        let without_tagged = JSON_FENCE_OPEN.replace_all(content.trim(), "");
        let without_trailing = FENCE_TRAILING.replace(without_tagged.trim(), "");
        FENCE_LEADING
            .replace(without_trailing.trim(), "")
            .trim()
            .to_string()
    }

    /// Extract a non-empty JSON array from an LLM response.
    ///
    /// Tries the greedy `[` ... `]` span first, since models like to wrap the
    /// payload in prose, then the whole cleaned text.
    pub fn extract(content: &str) -> Option<Value> {
        let cleaned = Self::strip_code_fences(content);

        if let Some(span) = Self::bracket_span(&cleaned) {
            if let Some(array) = Self::parse_non_empty_array(span) {
                return Some(array);
            }
        }

        Self::parse_non_empty_array(&cleaned)
    }

    fn bracket_span(content: &str) -> Option<&str> {
        let start = content.find('[')?;
        let end = content.rfind(']')?;
        (end > start).then(|| &content[start..=end])
    }

    fn parse_non_empty_array(candidate: &str) -> Option<Value> {
        match serde_json::from_str::<Value>(candidate) {
            Ok(Value::Array(items)) if !items.is_empty() => Some(Value::Array(items)),
            _ => None,
        }
    }
}
