// Context builder: flattens a subject + unit into the plain-text briefing
// embedded in the tutor's system message.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;

use super::types::{Subject, Unit};

static LIST_ITEM_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<li[^>]*>").unwrap());
static BLOCK_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</(p|div|li|h[1-6])>").unwrap());
static BLOCK_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<(p|br|div|h[1-6])[^>]*>").unwrap());
static ANY_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"</?[A-Za-z!][^>]*>").unwrap());
static NEWLINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n+").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Build the briefing text for `unit` of `subject`.
///
/// Field order is fixed: subject, unit, grade, overview, goals, explanation,
/// exercises. Absent fields produce no line and the output never contains
/// blank lines.
pub fn build_context_text(subject: &Subject, unit: &Unit) -> String {
    let mut lines: Vec<String> = vec![
        format!("Subject: {}", subject.display_name()),
        format!("Unit: {}", unit.display_name()),
    ];

    if let Some(grade) = present(unit.grade.as_deref()) {
        lines.push(format!("Target grade: {grade}"));
    }

    if let Some(overview) = present(unit.overview.as_deref()) {
        lines.push(format!("Overview: {overview}"));
    }

    if !unit.goals.is_empty() {
        lines.push(format!("Learning goals: {}", unit.goals.join("; ")));
    }

    if let Some(explanation) = present(unit.explanation.as_deref()) {
        let text = html_to_text(explanation);
        if !text.is_empty() {
            lines.push(format!("Explanation: {text}"));
        }
    }

    if !unit.exercises.is_empty() {
        lines.push("Exercises:".to_string());
        for (index, exercise) in unit.exercises.iter().enumerate() {
            lines.push(format!(" - Q{}: {}", index + 1, exercise.question));
            if let Some(hint) = present(exercise.hint.as_deref()) {
                lines.push(format!(" - Hint: {hint}"));
            }
            if let Some(answer) = present(exercise.answer.as_deref()) {
                lines.push(format!(" - Answer: {answer}"));
            }
        }
    }

    // Authored values may carry their own line breaks.
    lines
        .iter()
        .flat_map(|line| line.lines())
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Convert an HTML fragment to a single line of plain text.
///
/// Block tags become breaks, list items get a "- " marker, every other tag
/// is dropped, entities are decoded and all whitespace runs collapse to one
/// space. Plain text passes through unchanged apart from whitespace
/// collapsing, so applying it twice equals applying it once.
pub fn html_to_text(html: &str) -> String {
    let text = LIST_ITEM_OPEN.replace_all(html, "\n- ");
    let text = BLOCK_CLOSE.replace_all(&text, "\n");
    let text = BLOCK_OPEN.replace_all(&text, "\n");
    let text = ANY_TAG.replace_all(&text, "");
    let text = decode_entities(&text);
    let text = NEWLINES.replace_all(&text, "\n");
    let text = WHITESPACE.replace_all(&text, " ");
    text.trim().to_string()
}

/// Decode HTML entities in tag-free text.
fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    // Any '<' left is literal text (e.g. "3 < 5"); escape it for the parser.
    let escaped = text.replace('<', "&lt;");
    let fragment = Html::parse_fragment(&escaped);
    fragment.root_element().text().collect()
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
