//! Chat request validation.
//!
//! Runs before anything else in the chat handler and never panics: every
//! malformed body maps to one of the fixed `ValidationError` reasons.

use serde_json::Value;
use tracing::warn;

/// Accepted field names for the chat message, in priority order.
pub const MESSAGE_KEYS: [&str; 2] = ["message", "userInput"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid request format")]
    InvalidFormat,

    #[error("Message is required")]
    MissingMessage,

    #[error("Message must be a string")]
    NotAString,

    #[error("Please provide a message")]
    EmptyMessage,
}

/// Decode a raw request body and validate it.
pub fn validate_input(body: &[u8]) -> Result<String, ValidationError> {
    let value: Value = serde_json::from_slice(body).map_err(|e| {
        warn!(error = %e, "Request body is not valid JSON");
        ValidationError::InvalidFormat
    })?;
    validate_value(&value)
}

/// Validate a decoded body, returning the trimmed message.
pub fn validate_value(value: &Value) -> Result<String, ValidationError> {
    let Some(object) = value.as_object() else {
        warn!(kind = json_kind(value), "Invalid request format");
        return Err(ValidationError::InvalidFormat);
    };

    let present: Vec<&Value> = MESSAGE_KEYS
        .iter()
        .filter_map(|key| object.get(*key))
        .filter(|v| !v.is_null())
        .collect();

    // A blank or falsy `message` yields to a usable `userInput`.
    let Some(raw) = present
        .iter()
        .find(|v| is_truthy(v))
        .or_else(|| present.first())
        .copied()
    else {
        warn!("Missing message in request");
        return Err(ValidationError::MissingMessage);
    };

    let Some(text) = raw.as_str() else {
        warn!(kind = json_kind(raw), "Invalid message type");
        return Err(ValidationError::NotAString);
    };

    let trimmed = text.trim();
    if trimmed.is_empty() {
        warn!("Empty message");
        return Err(ValidationError::EmptyMessage);
    }

    Ok(trimmed.to_string())
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
