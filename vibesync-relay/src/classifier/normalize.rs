//! Classifier response normalization
//!
//! Turns the raw text returned by the oracle into a `Judgment`:
//! strip a markdown code fence, parse JSON, require the three core fields,
//! clamp the score into 0..=100 and default the optional fields.

use serde_json::{Map, Value};
use tracing::warn;
use vibesync_common::events::{Judgment, SongRecommendation, MAX_COMPATIBILITY_SCORE};

use super::ClassifierError;

/// Fields whose absence makes the response unusable
const REQUIRED_FIELDS: [&str; 3] = ["music_mood", "task_intent", "compatibility_score"];

/// Parse and validate one classifier response
pub fn parse_judgment(content: &str) -> Result<Judgment, ClassifierError> {
    let body = strip_code_fence(content);
    let value: Value =
        serde_json::from_str(body).map_err(|e| ClassifierError::Parse(e.to_string()))?;
    let object = value
        .as_object()
        .ok_or_else(|| ClassifierError::Parse("response is not a JSON object".to_string()))?;

    for field in REQUIRED_FIELDS {
        if !object.contains_key(field) {
            return Err(ClassifierError::MissingField(field));
        }
    }

    Ok(Judgment {
        music_mood: text_field(&object["music_mood"]),
        task_intent: text_field(&object["task_intent"]),
        compatibility_score: normalize_score(&object["compatibility_score"])?,
        transition_suggestion: object
            .get("transition_suggestion")
            .and_then(Value::as_str)
            .map(str::to_string),
        song_recommendations: recommendations(object),
    })
}

/// Remove a surrounding ```` ``` ```` / ```` ```json ```` fence, if any
///
/// The opening fence line is dropped along with everything from the last
/// closing fence onward.
pub fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }

    let body = trimmed.split_once('\n').map(|(_, rest)| rest).unwrap_or("");
    match body.rfind("```") {
        Some(end) => &body[..end],
        None => body,
    }
}

/// Round to the nearest integer and clamp into 0..=100
///
/// Accepts a JSON number or a numeric string.
pub fn normalize_score(value: &Value) -> Result<u8, ClassifierError> {
    let raw = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|x| x.is_finite())
    .ok_or_else(|| ClassifierError::InvalidScore(value.to_string()))?;

    Ok(raw.round().clamp(0.0, f64::from(MAX_COMPATIBILITY_SCORE)) as u8)
}

/// Free-text field; null becomes empty, non-strings keep their JSON text
fn text_field(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Recommendation list; absent or null is empty, malformed entries are dropped
fn recommendations(object: &Map<String, Value>) -> Vec<SongRecommendation> {
    let Some(Value::Array(items)) = object.get("song_recommendations") else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match serde_json::from_value(item.clone()) {
            Ok(rec) => Some(rec),
            Err(e) => {
                warn!("Dropping malformed song recommendation: {}", e);
                None
            }
        })
        .collect()
}
