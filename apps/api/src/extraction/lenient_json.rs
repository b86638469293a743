//! Best-effort recovery of a single JSON object from free model text.
//!
//! Model answers may wrap the object in code fences or surround it with prose.
//! The recovery is deliberately simple: strip one layer of fencing, slice from the
//! first `{` to the last `}`, parse. Anything that does not survive is rejected.

use serde_json::{Map, Value};

/// Strips a single layer of leading/trailing backtick fencing, including an
/// optional `json` language tag after the opening fence.
pub fn strip_fences(text: &str) -> &str {
    let text = text.trim();
    if !text.starts_with('`') {
        return text;
    }
    let inner = text.trim_matches('`');
    let inner = inner
        .strip_prefix("json")
        .or_else(|| inner.strip_prefix("JSON"))
        .unwrap_or(inner);
    inner.trim()
}

/// Slice between the first `{` and the last `}` inclusive.
pub fn brace_slice(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end > start {
        Some(&text[start..=end])
    } else {
        None
    }
}

/// Recovers the JSON object embedded in `text`, or explains why it could not.
pub fn extract_object(text: &str) -> Result<Map<String, Value>, String> {
    let stripped = strip_fences(text);
    let slice = brace_slice(stripped)
        .ok_or_else(|| "response contains no JSON object (no '{' ... '}' pair)".to_string())?;

    match serde_json::from_str::<Value>(slice) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err("response JSON is not an object".to_string()),
        Err(e) => Err(e.to_string()),
    }
}
