//! Deterministic artifacts served when no model produced usable output.
//! Everything here is pure: no I/O, no failure modes.

use crate::models::{Flashcard, QuizQuestion};

const FLASHCARD_ANSWER_PREVIEW_CHARS: usize = 150;

/// Which local summary to produce when every model fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SummaryFallbackStyle {
    /// Word count plus a review recommendation
    #[default]
    Basic,
    /// First two sentences of the notes plus the word count
    Extractive,
}

impl SummaryFallbackStyle {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "basic" => Some(SummaryFallbackStyle::Basic),
            "extractive" | "sentences" => Some(SummaryFallbackStyle::Extractive),
            _ => None,
        }
    }
}

pub fn word_count(notes: &str) -> usize {
    notes.split_whitespace().count()
}

pub fn summary(notes: &str, style: SummaryFallbackStyle) -> String {
    match style {
        SummaryFallbackStyle::Basic => format!(
            "Unable to generate AI summary due to API limitations. Here's a basic summary: \
             The provided content discusses various topics and contains {} words of information \
             that would benefit from further review and analysis.",
            word_count(notes)
        ),
        SummaryFallbackStyle::Extractive => extractive_summary(notes),
    }
}

fn extractive_summary(notes: &str) -> String {
    let lead = notes
        .split('.')
        .map(str::trim)
        .filter(|sentence| !sentence.is_empty())
        .take(2)
        .map(|sentence| format!("{}.", sentence))
        .collect::<Vec<_>>()
        .join(" ");

    let note = format!(
        "(Local summary of {} words; review the full notes for details.)",
        word_count(notes)
    );

    if lead.is_empty() {
        note
    } else {
        format!("{} {}", lead, note)
    }
}

pub fn flashcards(notes: &str) -> Vec<Flashcard> {
    let main_topic_answer = if notes.chars().count() > FLASHCARD_ANSWER_PREVIEW_CHARS {
        let preview: String = notes.chars().take(FLASHCARD_ANSWER_PREVIEW_CHARS).collect();
        format!("{}...", preview)
    } else {
        notes.to_string()
    };

    vec![
        Flashcard::new("What is the main topic discussed in the content?", main_topic_answer),
        Flashcard::new(
            "What are the key points mentioned?",
            "The content covers important information that requires further study and review.",
        ),
        Flashcard::new(
            "Why is this topic important?",
            "This topic is significant for understanding the subject matter and building knowledge.",
        ),
    ]
}

/// Content-agnostic on purpose: it marks degraded mode rather than guessing at the notes
pub fn quiz() -> Vec<QuizQuestion> {
    fn question(text: &str, options: [&str; 4], answer: &str) -> QuizQuestion {
        QuizQuestion::new(text, &options, answer)
    }

    vec![
        question(
            "Based on the provided content, what is the main subject being discussed?",
            [
                "Technical concepts",
                "General knowledge",
                "Specific topic from content",
                "Multiple related topics",
            ],
            "Specific topic from content",
        ),
        question(
            "What type of information was provided in the content?",
            [
                "Detailed explanations",
                "Brief overview",
                "Step-by-step instructions",
                "Mixed information types",
            ],
            "Mixed information types",
        ),
        question(
            "How would you best use this content for studying?",
            [
                "Memorize everything",
                "Focus on key concepts",
                "Skip difficult parts",
                "Read once quickly",
            ],
            "Focus on key concepts",
        ),
    ]
}
