//! Best-effort text extraction from completion responses.
//!
//! The response shape differs between modalities and API versions, so the
//! extractor walks a fixed list of known text locations and, when none of
//! them hold a string, returns the whole response pretty-printed. It never
//! fails.

use serde_json::Value;

/// A known location of the answer text inside a response.
pub type Accessor = fn(&Value) -> Option<&str>;

/// Text locations in priority order; the first hit wins.
pub const ACCESSORS: &[(&str, Accessor)] = &[
    ("response.candidate[0].content.parts[0].text", wrapped_candidate_part),
    ("candidate[0].content.parts[0].text", candidate_part),
    ("response.candidates[0].content.text", wrapped_candidates_content),
];

pub fn wrapped_candidate_part(value: &Value) -> Option<&str> {
    candidate_part(value.get("response")?)
}

pub fn candidate_part(value: &Value) -> Option<&str> {
    value
        .pointer("/candidate/0/content/parts/0/text")
        .and_then(Value::as_str)
}

pub fn wrapped_candidates_content(value: &Value) -> Option<&str> {
    value
        .pointer("/response/candidates/0/content/text")
        .and_then(Value::as_str)
}

/// Extract the answer text from `response`, or serialize it when no known
/// location matches.
pub fn normalize(response: &Value) -> String {
    if !response.is_object() {
        tracing::warn!(
            kind = value_kind(response),
            "Completion response is not an object; returning raw serialization"
        );
        return pretty(response);
    }

    for (path, accessor) in ACCESSORS {
        if let Some(text) = accessor(response) {
            tracing::debug!(path, "Extracted completion text");
            return text.to_string();
        }
    }

    tracing::debug!("No known text path matched; returning raw serialization");
    pretty(response)
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to pretty-print completion response");
        value.to_string()
    })
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
