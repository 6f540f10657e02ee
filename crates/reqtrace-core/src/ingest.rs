//! Test-case ingress.
//!
//! Uploaded test cases arrive as loosely shaped JSON. Every element is
//! converted to a [`TestCase`] here, once; anything that is not an object
//! with a non-empty `id` is rejected and logged, never passed on.

use serde_json::{Map, Value};
use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::types::TestCase;

/// Outcome of parsing one uploaded batch.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub accepted: Vec<TestCase>,
    /// Position and reason for every rejected element.
    pub rejected: Vec<(usize, String)>,
}

/// Parse a JSON document that must contain an array of test-case objects.
pub fn parse_test_cases(json: &str) -> Result<IngestReport> {
    let value: Value = serde_json::from_str(json)
        .map_err(|e| Error::MalformedRecord(format!("test cases are not valid JSON: {e}")))?;
    let Value::Array(items) = value else {
        return Err(Error::MalformedRecord("test cases file must contain a JSON array".into()));
    };
    Ok(ingest_values(items))
}

pub fn ingest_values(items: Vec<Value>) -> IngestReport {
    let mut report = IngestReport::default();
    for (position, item) in items.into_iter().enumerate() {
        match test_case_from_value(item) {
            Ok(tc) => report.accepted.push(tc),
            Err(err) => {
                tracing::warn!(position, error = %err, "skipping malformed test case");
                report.rejected.push((position, err.to_string()));
            }
        }
    }
    tracing::debug!(accepted = report.accepted.len(), rejected = report.rejected.len(), "ingested test cases");
    report
}

/// Convert a single JSON value into a `TestCase`.
pub fn test_case_from_value(value: Value) -> Result<TestCase> {
    let map = match value {
        Value::Object(map) => map,
        other => return Err(Error::MalformedRecord(format!("expected an object, got {}", kind_of(&other)))),
    };
    let id = text_field(&map, "id")
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| Error::MalformedRecord("test case has no id".into()))?;

    let mut tc = TestCase::new(id, text_field(&map, "title").unwrap_or_else(|| "Untitled".into()));
    tc.description = text_field(&map, "description").unwrap_or_default();
    tc.steps = steps_field(map.get("steps").or_else(|| map.get("test_steps")));
    tc.expected = text_field(&map, "expected")
        .or_else(|| text_field(&map, "expected_result"))
        .unwrap_or_default();
    if let Some(priority) = text_field(&map, "priority") { tc.priority = priority; }
    if let Some(case_type) = text_field(&map, "type") { tc.case_type = case_type; }
    if let Some(status) = text_field(&map, "status") { tc.status = status; }
    tc.requirement_id = text_field(&map, "requirement_id").filter(|s| !s.trim().is_empty());
    tc.query = text_field(&map, "query").filter(|s| !s.is_empty());
    tc.chunk_source = text_field(&map, "chunk_source");
    Ok(tc)
}

/// Append records whose id is not yet present. Returns how many were added.
pub fn merge_test_cases(existing: &mut Vec<TestCase>, incoming: Vec<TestCase>) -> usize {
    let mut seen: HashSet<String> = existing.iter().map(|tc| tc.id.clone()).collect();
    let before = existing.len();
    for tc in incoming {
        if seen.insert(tc.id.clone()) {
            existing.push(tc);
        }
    }
    existing.len() - before
}

fn text_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(value_to_text)
}

fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => Some(items.iter().filter_map(value_to_text).collect::<Vec<_>>().join(" ")),
        other => Some(other.to_string()),
    }
}

fn steps_field(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(value_to_text).collect(),
        Some(Value::String(s)) => s.lines().map(str::trim).filter(|l| !l.is_empty()).map(String::from).collect(),
        Some(other) => value_to_text(other).into_iter().collect(),
        None => Vec::new(),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
