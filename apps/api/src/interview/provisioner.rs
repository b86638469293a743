//! Agent Provisioner: creates the remote voice agent for one candidate.
//!
//! Every call creates a brand-new agent on the platform. The local agent map
//! keeps only the newest id per roll number; the displaced agent is reported
//! and, when `DELETE_REPLACED_AGENTS` is on, deleted.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{info, warn};

use crate::config::{ChatModelSettings, Config, TranscriberSettings, VoiceSettings};
use crate::errors::AppError;
use crate::interview::prompts::{
    agent_display_name, APP_IDENTIFIER, ASSESSMENT_CRITERIA, END_CALL_MESSAGE, FIRST_MESSAGE,
    STRUCTURED_DATA_SYSTEM_TEMPLATE, SUCCESS_EVALUATION_SYSTEM, SUCCESS_EVALUATION_SYSTEM_PROMPT,
    SUCCESS_EVALUATION_TRANSCRIPT, SUCCESS_RUBRIC, SUMMARY_SYSTEM, TRANSCRIPT_AND_REASON,
    VOICEMAIL_MESSAGE,
};
use crate::models::assistant::{
    AnalysisPlan, AssistantMetadata, AssistantPayload, ChatModelBlock, PlanMessage,
    StructuredDataPlan, SuccessEvaluationPlan, SummaryPlan,
};
use crate::voice_platform::{VoiceError, VoicePlatform};

/// Voice, transcription and model configuration for a new agent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentSettings {
    pub voice: VoiceSettings,
    pub transcriber: TranscriberSettings,
    pub chat_model: ChatModelSettings,
    pub max_duration_seconds: u32,
}

/// Per-request operator overrides of the configured defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AgentOverrides {
    pub voice: Option<VoiceSettings>,
    pub transcriber: Option<TranscriberSettings>,
    pub chat_model: Option<ChatModelSettings>,
}

impl AgentSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            voice: config.voice.clone(),
            transcriber: config.transcriber.clone(),
            chat_model: config.chat_model.clone(),
            max_duration_seconds: config.max_call_duration_secs,
        }
    }

    pub fn with_overrides(mut self, overrides: AgentOverrides) -> Self {
        if let Some(voice) = overrides.voice {
            self.voice = voice;
        }
        if let Some(transcriber) = overrides.transcriber {
            self.transcriber = transcriber;
        }
        if let Some(chat_model) = overrides.chat_model {
            self.chat_model = chat_model;
        }
        self
    }
}

/// JSON-Schema-like object declaring the twelve assessment fields as strings.
pub fn structured_data_schema() -> Value {
    let properties: Map<String, Value> = ASSESSMENT_CRITERIA
        .iter()
        .map(|(field, _)| (field.to_string(), json!({"type": "string"})))
        .collect();
    json!({"type": "object", "properties": properties})
}

/// Builds the full agent-creation request body.
pub fn build_assistant_payload(
    name: &str,
    system_prompt: &str,
    settings: &AgentSettings,
    roll_no: &str,
) -> AssistantPayload {
    let schema = structured_data_schema();
    let structured_system = STRUCTURED_DATA_SYSTEM_TEMPLATE.replace("{schema}", &schema.to_string());

    AssistantPayload {
        name: name.to_string(),
        voice: settings.voice.clone(),
        max_duration_seconds: settings.max_duration_seconds,
        model: ChatModelBlock {
            provider: settings.chat_model.provider.clone(),
            model: settings.chat_model.model.clone(),
            messages: vec![PlanMessage::system(system_prompt)],
        },
        first_message: FIRST_MESSAGE.to_string(),
        voicemail_message: VOICEMAIL_MESSAGE.to_string(),
        end_call_message: END_CALL_MESSAGE.to_string(),
        transcriber: settings.transcriber.clone(),
        analysis_plan: AnalysisPlan {
            summary_plan: SummaryPlan {
                messages: vec![
                    PlanMessage::system(SUMMARY_SYSTEM),
                    PlanMessage::user(TRANSCRIPT_AND_REASON),
                ],
            },
            structured_data_plan: StructuredDataPlan {
                enabled: true,
                schema,
                messages: vec![
                    PlanMessage::system(structured_system),
                    PlanMessage::user(TRANSCRIPT_AND_REASON),
                ],
            },
            success_evaluation_plan: SuccessEvaluationPlan {
                rubric: SUCCESS_RUBRIC.to_string(),
                messages: vec![
                    PlanMessage::system(SUCCESS_EVALUATION_SYSTEM),
                    PlanMessage::user(SUCCESS_EVALUATION_TRANSCRIPT),
                    PlanMessage::user(SUCCESS_EVALUATION_SYSTEM_PROMPT),
                ],
            },
        },
        metadata: AssistantMetadata {
            roll_no: roll_no.to_string(),
            app: APP_IDENTIFIER.to_string(),
        },
    }
}

/// Creates the agent and returns its platform id. No retry on failure.
pub async fn provision_agent(
    platform: &dyn VoicePlatform,
    roll_no: &str,
    prompt: &str,
    settings: &AgentSettings,
) -> Result<String, AppError> {
    if prompt.trim().is_empty() {
        return Err(AppError::Validation(
            "interview prompt cannot be empty".to_string(),
        ));
    }

    let name = agent_display_name(roll_no);
    let payload = build_assistant_payload(&name, prompt, settings, roll_no);

    info!(
        "Creating agent '{name}' (voice: {}/{}, model: {}/{})",
        settings.voice.provider,
        settings.voice.voice_id,
        settings.chat_model.provider,
        settings.chat_model.model
    );
    let agent_id = platform
        .create_assistant(&payload)
        .await
        .map_err(provisioning_error)?;
    info!("Agent {agent_id} created for roll_no {roll_no}");
    Ok(agent_id)
}

fn provisioning_error(err: VoiceError) -> AppError {
    match err {
        VoiceError::Api { status, body } | VoiceError::MissingId { status, body } => {
            AppError::AgentProvisioning { status, body }
        }
        other => AppError::AgentProvisioning {
            status: 0,
            body: other.to_string(),
        },
    }
}

/// Deletes an agent that a newer one replaced. Failures are logged, not returned:
/// the new agent already exists and the operator can proceed.
pub async fn retire_agent(platform: &dyn VoicePlatform, agent_id: &str) -> bool {
    match platform.delete_assistant(agent_id).await {
        Ok(()) => {
            info!("Deleted replaced agent {agent_id}");
            true
        }
        Err(e) => {
            warn!("Could not delete replaced agent {agent_id}: {e}");
            false
        }
    }
}
