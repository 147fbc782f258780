//! Best-effort recovery of a JSON object from free-form model output.

use serde_json::{Map, Value};

const FENCE: &str = "```";

/// Extracts the JSON object embedded in a model reply.
///
/// Steps, in order:
/// - an empty payload yields `None`;
/// - surrounding whitespace is trimmed;
/// - if the text opens with a Markdown fence, every line starting with the
///   fence token is dropped (language-tagged openers such as "```json" included);
/// - the text is narrowed to the span from the first `{` to the last `}`;
/// - that candidate is parsed strictly.
///
/// Malformed JSON is never repaired, and a valid JSON value that is not an
/// object (an array, a number, ...) also yields `None`.
pub fn extract_json(payload: &str) -> Option<Map<String, Value>> {
    if payload.is_empty() {
        return None;
    }

    let trimmed = payload.trim();
    let content = if trimmed.starts_with(FENCE) {
        strip_fence_lines(trimmed)
    } else {
        trimmed.to_string()
    };

    let candidate = match (content.find('{'), content.rfind('}')) {
        (Some(first), Some(last)) if last > first => &content[first..=last],
        _ => content.as_str(),
    };

    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

fn strip_fence_lines(text: &str) -> String {
    text.split(['\r', '\n'])
        .filter(|line| !line.starts_with(FENCE))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
