use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Structured biographical profile of one candidate.
///
/// Field names follow the extraction schema (`name`, `roll_no`, `education`, ...)
/// but the record is open: whatever the document service or the operator puts in
/// is kept, in the order it arrived. Absent fields stay absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateRecord(Map<String, Value>);

impl CandidateRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Parses operator-edited text. Only a JSON object is a valid record.
    pub fn from_json_text(text: &str) -> Result<Self, String> {
        match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(fields)) => Ok(Self(fields)),
            Ok(other) => Err(format!(
                "expected a JSON object, found {}",
                json_kind(&other)
            )),
            Err(e) => Err(e.to_string()),
        }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// The candidate's name as display text, if present.
    pub fn name(&self) -> Option<String> {
        self.0.get("name").and_then(display_text)
    }

    /// The roll number as display text, if present and non-empty.
    pub fn roll_no(&self) -> Option<String> {
        self.0.get("roll_no").and_then(display_text)
    }

    /// Replaces a missing or falsy `roll_no` with `fallback`.
    /// An upstream value that is already set wins.
    pub fn apply_roll_no_fallback(&mut self, fallback: &str) {
        let missing = self.0.get("roll_no").map_or(true, is_falsy);
        if missing {
            self.0
                .insert("roll_no".to_string(), Value::String(fallback.to_string()));
        }
    }

    /// Pretty JSON with two-space indentation. Non-ASCII text is kept as-is.
    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(&self.0).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Strings are shown raw, everything else as compact JSON; null and blank are absent.
fn display_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
