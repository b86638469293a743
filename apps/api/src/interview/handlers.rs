//! Axum route handlers for prompt composition and agent provisioning.

use axum::{extract::State, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::AppError;
use crate::interview::composer::{compose_prompt, DEFAULT_CANDIDATE_NAME};
use crate::interview::provisioner::{provision_agent, retire_agent, AgentOverrides, AgentSettings};
use crate::session::AgentRecord;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ComposePromptResponse {
    pub prompt: String,
    pub candidate_name: String,
    pub roll_no: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateAgentRequest {
    /// Operator-edited prompt. When absent the prompt is composed from the record.
    pub prompt: Option<String>,
    #[serde(flatten)]
    pub overrides: AgentOverrides,
}

#[derive(Debug, Serialize)]
pub struct CreateAgentResponse {
    pub agent: AgentRecord,
    /// Agent id this one displaced for the same roll number, if any.
    pub replaced_agent_id: Option<String>,
    pub replaced_agent_deleted: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/prompt
///
/// Renders the interviewer prompt for the current record so the operator can
/// review and edit it before provisioning.
pub async fn handle_compose_prompt(
    State(state): State<AppState>,
) -> Result<Json<ComposePromptResponse>, AppError> {
    let session = state.session.lock().await;
    let record = session.record().ok_or_else(no_record)?;
    let roll_no = session.effective_roll_no();

    Ok(Json(ComposePromptResponse {
        prompt: compose_prompt(record, &roll_no),
        candidate_name: record
            .name()
            .unwrap_or_else(|| DEFAULT_CANDIDATE_NAME.to_string()),
        roll_no,
    }))
}

/// POST /api/v1/agents
///
/// Creates a new voice agent for the current candidate. The new agent becomes
/// the selected one; an older agent for the same roll number is forgotten
/// (and deleted remotely when configured to).
pub async fn handle_create_agent(
    State(state): State<AppState>,
    Json(request): Json<CreateAgentRequest>,
) -> Result<Json<CreateAgentResponse>, AppError> {
    // Snapshot what we need and release the lock before the network call.
    let (record, roll_no, prompt) = {
        let session = state.session.lock().await;
        let record = session.record().ok_or_else(no_record)?.clone();
        let roll_no = session.effective_roll_no();
        let prompt = match request.prompt {
            Some(edited) => edited,
            None => compose_prompt(&record, &roll_no),
        };
        (record, roll_no, prompt)
    };

    let settings = AgentSettings::from_config(&state.config).with_overrides(request.overrides);
    let agent_id = provision_agent(state.voice.as_ref(), &roll_no, &prompt, &settings).await?;

    let agent = AgentRecord {
        agent_id,
        roll_no: roll_no.clone(),
        candidate_name: record
            .name()
            .unwrap_or_else(|| DEFAULT_CANDIDATE_NAME.to_string()),
        candidate: record,
        created_at: Utc::now(),
    };
    let displaced = state.session.lock().await.insert_agent(agent.clone());

    let replaced_agent_id = displaced.map(|old| old.agent_id);
    let mut replaced_agent_deleted = false;
    if let Some(old_id) = &replaced_agent_id {
        if state.config.delete_replaced_agents {
            replaced_agent_deleted = retire_agent(state.voice.as_ref(), old_id).await;
        } else {
            warn!("Agent {old_id} for roll_no {roll_no} was replaced and is left on the platform");
        }
    }

    Ok(Json(CreateAgentResponse {
        agent,
        replaced_agent_id,
        replaced_agent_deleted,
    }))
}

fn no_record() -> AppError {
    AppError::Conflict("No candidate record yet; extract or enter one first".to_string())
}
