use crate::models::Energy;
use crate::utils::push_unique;
use serde_json::Value;
use thiserror::Error;

/// Validated result of an AI analysis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiAnalysis {
    pub description: String,
    pub energy: Energy,
    /// Trimmed, non-blank, deduplicated
    pub tags: Vec<String>,
    pub best_for: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("expected a JSON object, got {0}")]
    NotAnObject(&'static str),

    #[error("field `{field}` must be {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Optional string field: missing or null reads as empty
fn string_field(value: &Value, keys: &[&'static str]) -> Result<String, SchemaError> {
    let Some((key, found)) = keys.iter().find_map(|k| value.get(*k).map(|v| (*k, v))) else {
        return Ok(String::new());
    };

    match found {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s.trim().to_string()),
        _ => Err(SchemaError::WrongType {
            field: key,
            expected: "a string",
        }),
    }
}

/// Validate a recovered JSON value against the analysis schema.
///
/// Lenient where the model commonly drifts: an unknown energy reads as
/// `focused`, a non-array `tags` reads as empty, non-string or blank tags are
/// dropped and `best_for` is accepted as an alias of `bestFor`.
pub fn validate_analysis(value: &Value) -> Result<AiAnalysis, SchemaError> {
    if !value.is_object() {
        return Err(SchemaError::NotAnObject(type_name(value)));
    }

    let energy = value
        .get("energy")
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<Energy>().ok())
        .unwrap_or(Energy::Focused);

    let mut tags = Vec::new();
    if let Some(items) = value.get("tags").and_then(Value::as_array) {
        for tag in items.iter().filter_map(Value::as_str) {
            let tag = tag.trim();
            if !tag.is_empty() {
                push_unique(&mut tags, tag);
            }
        }
    }

    Ok(AiAnalysis {
        description: string_field(value, &["description"])?,
        energy,
        tags,
        best_for: string_field(value, &["bestFor", "best_for"])?,
    })
}

/// Ordered union: heuristic keywords first, then AI tags not already present
pub fn merge_tags(keywords: &[String], ai_tags: &[String]) -> Vec<String> {
    let mut merged = Vec::with_capacity(keywords.len() + ai_tags.len());
    for tag in keywords.iter().chain(ai_tags) {
        let tag = tag.trim();
        if !tag.is_empty() {
            push_unique(&mut merged, tag);
        }
    }
    merged
}
