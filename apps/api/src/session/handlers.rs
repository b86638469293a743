//! Axum route handlers for the candidate record, agent selection and the
//! session marker.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::models::candidate::CandidateRecord;
use crate::session::{SessionMarker, SessionStatus};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct CandidateResponse {
    pub record: Option<CandidateRecord>,
    pub registration_no: String,
    pub roll_no: String,
}

#[derive(Debug, Serialize)]
pub struct AgentListEntry {
    pub agent_id: String,
    pub roll_no: String,
    pub candidate_name: String,
    pub created_at: DateTime<Utc>,
    pub selected: bool,
}

/// What the external session launcher needs to start the voice call.
#[derive(Debug, Serialize)]
pub struct LaunchResponse {
    pub assistant_id: String,
    pub public_key: String,
    pub candidate_name: String,
    pub roll_no: String,
    pub started_at: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: SessionStatus,
}

#[derive(Debug, Serialize)]
pub struct SessionView {
    #[serde(flatten)]
    pub marker: SessionMarker,
    pub selected_roll_no: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/candidate
pub async fn handle_get_candidate(State(state): State<AppState>) -> Json<CandidateResponse> {
    let session = state.session.lock().await;
    Json(CandidateResponse {
        record: session.record().cloned(),
        registration_no: session.registration_no().to_string(),
        roll_no: session.effective_roll_no(),
    })
}

/// PUT /api/v1/candidate
///
/// Body is the operator-edited record as raw JSON text. Invalid JSON leaves
/// the stored record as it was.
pub async fn handle_replace_candidate(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<CandidateRecord>, AppError> {
    let mut session = state.session.lock().await;
    let record = session.replace_record_from_text(&body)?.clone();
    info!("Candidate record replaced by operator edit ({} fields)", record.fields().len());
    Ok(Json(record))
}

/// GET /api/v1/agents
pub async fn handle_list_agents(State(state): State<AppState>) -> Json<Vec<AgentListEntry>> {
    let session = state.session.lock().await;
    let selected = session.selected_roll_no();
    let entries = session
        .agents()
        .into_iter()
        .map(|agent| AgentListEntry {
            agent_id: agent.agent_id.clone(),
            roll_no: agent.roll_no.clone(),
            candidate_name: agent.candidate_name.clone(),
            created_at: agent.created_at,
            selected: selected == Some(agent.roll_no.as_str()),
        })
        .collect();
    Json(entries)
}

/// POST /api/v1/agents/:roll_no/select
pub async fn handle_select_agent(
    State(state): State<AppState>,
    Path(roll_no): Path<String>,
) -> Result<Json<AgentListEntry>, AppError> {
    let mut session = state.session.lock().await;
    let agent = session.select_agent(&roll_no)?;
    Ok(Json(AgentListEntry {
        agent_id: agent.agent_id.clone(),
        roll_no: agent.roll_no.clone(),
        candidate_name: agent.candidate_name.clone(),
        created_at: agent.created_at,
        selected: true,
    }))
}

/// POST /api/v1/session/launch
///
/// Stamps the session start and hands the launcher the agent id and public key.
/// Calls that started before this moment are ignored when fetching feedback.
pub async fn handle_launch_session(
    State(state): State<AppState>,
) -> Result<Json<LaunchResponse>, AppError> {
    let mut session = state.session.lock().await;
    let agent = session.require_current_agent()?.clone();
    let marker = session.begin_session(Utc::now());
    let started_at = marker.started_at.clone().unwrap_or_default();
    info!(
        "Interview session launched for roll_no {} at {started_at}",
        agent.roll_no
    );

    Ok(Json(LaunchResponse {
        assistant_id: agent.agent_id,
        public_key: state.config.vapi_public_key.clone(),
        candidate_name: agent.candidate_name,
        roll_no: agent.roll_no,
        started_at,
    }))
}

/// POST /api/v1/session/status
///
/// Launcher/operator events (`active`, `completed`, `error`, ...). Taken at face
/// value; nothing here checks the platform's actual call state.
pub async fn handle_update_status(
    State(state): State<AppState>,
    Json(update): Json<StatusUpdate>,
) -> Json<SessionView> {
    let mut session = state.session.lock().await;
    session.set_status(update.status);
    Json(SessionView {
        marker: session.marker().clone(),
        selected_roll_no: session.selected_roll_no().map(String::from),
    })
}

/// GET /api/v1/session
pub async fn handle_get_session(State(state): State<AppState>) -> Json<SessionView> {
    let session = state.session.lock().await;
    Json(SessionView {
        marker: session.marker().clone(),
        selected_roll_no: session.selected_roll_no().map(String::from),
    })
}

/// POST /api/v1/session/reset
pub async fn handle_reset_session(State(state): State<AppState>) -> Json<SessionView> {
    let mut session = state.session.lock().await;
    session.reset();
    Json(SessionView {
        marker: session.marker().clone(),
        selected_roll_no: session.selected_roll_no().map(String::from),
    })
}
