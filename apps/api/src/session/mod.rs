//! Session context: the operator's working state for one running service.
//!
//! Holds the candidate record store, the selected-candidate pointer, the agent
//! map keyed by roll number, and the global session marker. Nothing here is
//! persisted; a restart starts from an empty context.

pub mod handlers;

use std::collections::HashMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::candidate::CandidateRecord;

/// Threshold used by the feedback retriever when no session was ever launched.
pub const EPOCH_TIMESTAMP: &str = "1970-01-01T00:00:00.000Z";

/// Formats a timestamp the way the voice platform does (UTC, millisecond
/// precision, `Z` suffix) so that string comparison orders them correctly.
pub fn platform_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// One provisioned agent. Keyed by roll number; a newer agent for the same
/// roll number replaces the older entry.
#[derive(Debug, Clone, Serialize)]
pub struct AgentRecord {
    pub agent_id: String,
    pub roll_no: String,
    pub candidate_name: String,
    pub candidate: CandidateRecord,
    pub created_at: DateTime<Utc>,
}

/// Operator-reported state of the current interview.
///
/// This is a hint driven by operator/launcher events, not a reflection of the
/// platform's actual call state; only a feedback fetch for a call the platform
/// reports as ended moves it to `Completed` on evidence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Idle,
    Starting,
    Active,
    Completed,
    Error,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionMarker {
    pub started_at: Option<String>,
    pub status: SessionStatus,
}

impl SessionMarker {
    /// Calls that started before this are ignored by the feedback retriever.
    pub fn threshold(&self) -> &str {
        self.started_at.as_deref().unwrap_or(EPOCH_TIMESTAMP)
    }
}

#[derive(Debug, Default)]
pub struct SessionContext {
    candidate: Option<CandidateRecord>,
    registration_no: String,
    selected_roll_no: Option<String>,
    agents: HashMap<String, AgentRecord>,
    marker: SessionMarker,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self) -> Option<&CandidateRecord> {
        self.candidate.as_ref()
    }

    /// The registration number the operator supplied with the last extraction.
    pub fn registration_no(&self) -> &str {
        &self.registration_no
    }

    /// Replaces the whole record with a freshly extracted one.
    pub fn replace_record(&mut self, record: CandidateRecord, registration_no: &str) {
        self.registration_no = registration_no.to_string();
        self.candidate = Some(record);
    }

    /// Replaces the record with operator-edited JSON text. On a parse failure the
    /// previous record is left untouched.
    pub fn replace_record_from_text(&mut self, text: &str) -> Result<&CandidateRecord, AppError> {
        let record = CandidateRecord::from_json_text(text).map_err(AppError::InvalidJson)?;
        let stored = self.candidate.insert(record);
        Ok(&*stored)
    }

    /// Roll number for the current record, falling back to the registration number.
    pub fn effective_roll_no(&self) -> String {
        self.candidate
            .as_ref()
            .and_then(CandidateRecord::roll_no)
            .unwrap_or_else(|| self.registration_no.clone())
    }

    /// Stores an agent, selects it, and returns whatever entry it displaced.
    pub fn insert_agent(&mut self, agent: AgentRecord) -> Option<AgentRecord> {
        let roll_no = agent.roll_no.clone();
        let previous = self.agents.insert(roll_no.clone(), agent);
        self.selected_roll_no = Some(roll_no);
        previous
    }

    pub fn agents(&self) -> Vec<&AgentRecord> {
        let mut agents: Vec<_> = self.agents.values().collect();
        agents.sort_by(|a, b| a.roll_no.cmp(&b.roll_no));
        agents
    }

    pub fn select_agent(&mut self, roll_no: &str) -> Result<&AgentRecord, AppError> {
        let agent = self.agents.get(roll_no).ok_or_else(|| {
            AppError::NotFound(format!("No agent has been created for roll number {roll_no}"))
        })?;
        self.selected_roll_no = Some(roll_no.to_string());
        Ok(agent)
    }

    pub fn selected_roll_no(&self) -> Option<&str> {
        self.selected_roll_no.as_deref()
    }

    pub fn current_agent(&self) -> Option<&AgentRecord> {
        self.selected_roll_no
            .as_deref()
            .and_then(|roll_no| self.agents.get(roll_no))
    }

    /// Like `current_agent`, but a missing agent is an error for the caller.
    pub fn require_current_agent(&self) -> Result<&AgentRecord, AppError> {
        self.current_agent().ok_or_else(|| {
            AppError::Conflict("No interview agent is selected; create one first".to_string())
        })
    }

    pub fn marker(&self) -> &SessionMarker {
        &self.marker
    }

    /// Stamps a new session start, overwriting any previous marker.
    pub fn begin_session(&mut self, at: DateTime<Utc>) -> &SessionMarker {
        self.marker = SessionMarker {
            started_at: Some(platform_timestamp(at)),
            status: SessionStatus::Starting,
        };
        &self.marker
    }

    pub fn set_status(&mut self, status: SessionStatus) {
        self.marker.status = status;
    }

    /// Clears the marker back to idle with no start time.
    pub fn reset(&mut self) {
        self.marker = SessionMarker::default();
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    fn record(value: serde_json::Value) -> CandidateRecord {
        CandidateRecord::from_json_text(&value.to_string()).unwrap()
    }

    fn agent(roll_no: &str, id: &str) -> AgentRecord {
        AgentRecord {
            agent_id: id.to_string(),
            roll_no: roll_no.to_string(),
            candidate_name: "Asha Rao".to_string(),
            candidate: record(json!({"name": "Asha Rao", "roll_no": roll_no})),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_invalid_edit_leaves_previous_record() {
        let mut ctx = SessionContext::new();
        ctx.replace_record(record(json!({"name": "Asha Rao"})), "X07");

        let err = ctx.replace_record_from_text("{\"name\": \"Asha").unwrap_err();
        assert!(matches!(err, AppError::InvalidJson(_)));
        assert_eq!(ctx.record().unwrap().name().as_deref(), Some("Asha Rao"));
    }

    #[test]
    fn test_valid_edit_replaces_whole_record() {
        let mut ctx = SessionContext::new();
        ctx.replace_record(record(json!({"name": "Asha Rao", "hobbies": ["chess"]})), "X07");

        ctx.replace_record_from_text(r#"{"name": "Asha R."}"#).unwrap();
        let current = ctx.record().unwrap();
        assert_eq!(current.name().as_deref(), Some("Asha R."));
        assert!(current.fields().get("hobbies").is_none());
    }

    #[test]
    fn test_effective_roll_no_falls_back_to_registration_number() {
        let mut ctx = SessionContext::new();
        ctx.replace_record(record(json!({"name": "Asha Rao"})), " X07 ");
        assert_eq!(ctx.effective_roll_no(), "X07");
    }

    #[test]
    fn test_insert_agent_overwrites_same_roll_no() {
        let mut ctx = SessionContext::new();
        assert!(ctx.insert_agent(agent("R1", "asst_1")).is_none());
        let displaced = ctx.insert_agent(agent("R1", "asst_2")).unwrap();

        assert_eq!(displaced.agent_id, "asst_1");
        assert_eq!(ctx.agents().len(), 1);
        assert_eq!(ctx.current_agent().unwrap().agent_id, "asst_2");
    }

    #[test]
    fn test_select_unknown_agent_is_not_found() {
        let mut ctx = SessionContext::new();
        ctx.insert_agent(agent("R1", "asst_1"));
        assert!(matches!(ctx.select_agent("R2"), Err(AppError::NotFound(_))));
        assert_eq!(ctx.selected_roll_no(), Some("R1"));
    }

    #[test]
    fn test_begin_session_overwrites_and_reset_clears() {
        let mut ctx = SessionContext::new();
        assert_eq!(ctx.marker().threshold(), EPOCH_TIMESTAMP);

        let first = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
        ctx.begin_session(first);
        ctx.set_status(SessionStatus::Active);
        let second = Utc.with_ymd_and_hms(2024, 5, 1, 11, 0, 0).unwrap();
        let marker = ctx.begin_session(second).clone();

        assert_eq!(marker.started_at.as_deref(), Some("2024-05-01T11:00:00.000Z"));
        assert_eq!(marker.status, SessionStatus::Starting);

        ctx.reset();
        assert_eq!(ctx.marker(), &SessionMarker::default());
    }

    #[test]
    fn test_platform_timestamp_sorts_like_platform_strings() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
        let ours = platform_timestamp(at);
        assert!("2024-05-01T09:30:00.001Z" >= ours.as_str());
        assert!("2024-05-01T09:29:59.999Z" < ours.as_str());
        assert!(EPOCH_TIMESTAMP < ours.as_str());
    }
}
