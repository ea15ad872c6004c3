//! Request validation — rejects malformed input before a worker is launched.

use serde_json::Value;
use thiserror::Error;

use crate::notes::models::{Depth, ExamType, NoteRequest};

/// Minimum number of characters (after trimming) the content must carry.
pub const MIN_CONTENT_CHARS: usize = 20;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Input content is too short. Provide at least 20 characters.")]
    TooShort,

    #[error("Invalid exam_type or depth.")]
    InvalidSelector,

    #[error("Invalid request body: {0}")]
    MalformedBody(String),
}

/// Normalizes an untyped request body into a `NoteRequest`.
///
/// Length is checked first, so a short body with bad selectors reports `TooShort`.
/// Missing or non-string fields count as empty content / unknown selectors.
pub fn validate_request(body: &Value) -> Result<NoteRequest, ValidationError> {
    let content = body
        .get("content")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .trim();

    if content.chars().count() < MIN_CONTENT_CHARS {
        return Err(ValidationError::TooShort);
    }

    let (exam_type, depth) = validate_selectors(body)?;

    Ok(NoteRequest {
        content: content.to_string(),
        exam_type,
        depth,
    })
}

fn validate_selectors(body: &Value) -> Result<(ExamType, Depth), ValidationError> {
    let exam_type = body
        .get("exam_type")
        .and_then(Value::as_str)
        .and_then(ExamType::parse);
    let depth = body
        .get("depth")
        .and_then(Value::as_str)
        .and_then(Depth::parse);

    match (exam_type, depth) {
        (Some(exam_type), Some(depth)) => Ok((exam_type, depth)),
        _ => Err(ValidationError::InvalidSelector),
    }
}

/// Validates a bare `exam_type` value, as used by the insights endpoint.
pub fn validate_exam_type(value: Option<&Value>) -> Result<ExamType, ValidationError> {
    value
        .and_then(Value::as_str)
        .and_then(ExamType::parse)
        .ok_or(ValidationError::InvalidSelector)
}
