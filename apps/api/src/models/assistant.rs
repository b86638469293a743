//! Request body for the voice platform's agent-creation endpoint.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::{TranscriberSettings, VoiceSettings};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantPayload {
    pub name: String,
    pub voice: VoiceSettings,
    pub max_duration_seconds: u32,
    pub model: ChatModelBlock,
    pub first_message: String,
    pub voicemail_message: String,
    pub end_call_message: String,
    pub transcriber: TranscriberSettings,
    pub analysis_plan: AnalysisPlan,
    pub metadata: AssistantMetadata,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatModelBlock {
    pub provider: String,
    pub model: String,
    pub messages: Vec<PlanMessage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanMessage {
    pub role: String,
    pub content: String,
}

impl PlanMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisPlan {
    pub summary_plan: SummaryPlan,
    pub structured_data_plan: StructuredDataPlan,
    pub success_evaluation_plan: SuccessEvaluationPlan,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryPlan {
    pub messages: Vec<PlanMessage>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StructuredDataPlan {
    pub enabled: bool,
    pub schema: Value,
    pub messages: Vec<PlanMessage>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SuccessEvaluationPlan {
    pub rubric: String,
    pub messages: Vec<PlanMessage>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssistantMetadata {
    pub roll_no: String,
    pub app: String,
}

/// The only part of the creation response this service reads.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedAssistant {
    pub id: Option<String>,
}
