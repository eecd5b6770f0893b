use serde_json::Value;

use crate::{CandidateRecord, PageResult};

/// Parses one candidate-list response body.
///
/// A missing or malformed `rowList` yields an empty page. `rowCount` may be a
/// number, a numeric string or null; anything that is not a positive count is
/// reported as `None`.
pub fn parse_page(body: &Value) -> PageResult {
    let total = body.get("rowCount").and_then(parse_count).filter(|n| *n > 0);
    let records = body
        .get("rowList")
        .and_then(Value::as_array)
        .map(|rows| rows.iter().map(parse_row).collect())
        .unwrap_or_default();
    PageResult { total, records }
}

fn parse_row(row: &Value) -> CandidateRecord {
    let field = |key: &str| row.get(key).and_then(value_to_string);
    CandidateRecord {
        job_id: field("postId"),
        job_title: field("enPostName")
            .or_else(|| field("cnPostName"))
            .or_else(|| field("postName")),
        recruit_type: field("recruitType"),
        display_name: field("name"),
        apply_id: field("applyId"),
        resume_id: field("resumeId"),
    }
}

fn parse_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().map(|f| f.max(0.0) as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Renders an identifier-like JSON value as a string.
///
/// Servers send ids as either numbers or strings. Null, empty strings and
/// non-scalar values are treated as absent.
pub fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
