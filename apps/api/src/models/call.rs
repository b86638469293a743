//! Read-only views of the voice platform's call payloads.
//! Every field is optional: in-progress calls omit most of them.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// One entry of the call-listing endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CallSummary {
    pub id: String,
    pub assistant_id: Option<String>,
    pub started_at: Option<String>,
    pub ended_at: Option<String>,
    pub updated_at: Option<String>,
    pub created_at: Option<String>,
}

impl CallSummary {
    /// Timestamp used to decide which call concluded last:
    /// `endedAt`, else `updatedAt`, else `createdAt`, else empty.
    pub fn conclusion_key(&self) -> &str {
        self.ended_at
            .as_deref()
            .or(self.updated_at.as_deref())
            .or(self.created_at.as_deref())
            .unwrap_or("")
    }
}

/// The call-listing endpoint answers with either a bare array or `{"items": [...]}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CallListResponse {
    Bare(Vec<CallSummary>),
    Paged { items: Vec<CallSummary> },
}

impl CallListResponse {
    pub fn into_calls(self) -> Vec<CallSummary> {
        match self {
            CallListResponse::Bare(calls) => calls,
            CallListResponse::Paged { items } => items,
        }
    }
}

/// Full call record from the call-detail endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CallRecord {
    pub id: String,
    pub assistant_id: Option<String>,
    pub started_at: Option<String>,
    pub ended_at: Option<String>,
    pub ended_reason: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub analysis: CallAnalysis,
    #[serde(deserialize_with = "null_as_default")]
    pub artifact: CallArtifact,
}

/// The platform sends `null` for blocks it has not produced yet.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CallAnalysis {
    pub summary: Option<String>,
    pub structured_data: Option<Map<String, Value>>,
    /// An object with `overallRating` / `justification` (or `reason`), though
    /// some rubrics return a bare string.
    pub success_evaluation: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CallArtifact {
    pub transcript: Option<String>,
    pub recording: Option<Recording>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Recording {
    pub mono: Option<MonoRecording>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MonoRecording {
    pub combined_url: Option<String>,
}

impl CallRecord {
    pub fn recording_url(&self) -> Option<&str> {
        self.artifact
            .recording
            .as_ref()
            .and_then(|r| r.mono.as_ref())
            .and_then(|m| m.combined_url.as_deref())
            .filter(|url| !url.is_empty())
    }
}
