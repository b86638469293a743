//! Axum route handlers for the Feedback API.

use std::time::Duration;

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::Deserialize;

use crate::errors::AppError;
use crate::feedback::report::{render_report, render_transcript};
use crate::feedback::retriever::{
    poll_feedback, retrieve_feedback, FeedbackOutcome, FeedbackReport,
};
use crate::session::{AgentRecord, SessionStatus};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct FeedbackQuery {
    /// Keep re-checking until a call shows up or the poll budget runs out.
    #[serde(default)]
    pub poll: bool,
}

/// Runs the retriever for the selected agent and records the outcome on the
/// session marker. The session lock is not held while the platform is queried.
async fn fetch_current(
    state: &AppState,
    poll: bool,
) -> Result<(AgentRecord, FeedbackOutcome), AppError> {
    let (agent, since) = {
        let session = state.session.lock().await;
        let agent = session.require_current_agent()?.clone();
        (agent, session.marker().threshold().to_string())
    };

    let platform = state.voice.as_ref();
    let result = if poll {
        poll_feedback(
            platform,
            &agent.agent_id,
            &since,
            Duration::from_secs(state.config.feedback_poll_interval_secs),
            state.config.feedback_poll_max_attempts,
        )
        .await
    } else {
        retrieve_feedback(platform, &agent.agent_id, &since).await
    };

    let mut session = state.session.lock().await;
    match &result {
        Ok(FeedbackOutcome::Ready { feedback }) if feedback.ended_at.is_some() => {
            session.set_status(SessionStatus::Completed)
        }
        Ok(_) => {}
        Err(_) => session.set_status(SessionStatus::Error),
    }
    drop(session);

    Ok((agent, result?))
}

fn require_report(outcome: FeedbackOutcome) -> Result<FeedbackReport, AppError> {
    match outcome {
        FeedbackOutcome::Ready { feedback } => Ok(feedback),
        FeedbackOutcome::Waiting => Err(AppError::NotFound(
            "No completed call yet for the selected candidate".to_string(),
        )),
    }
}

/// Roll numbers end up in a header value; keep only filename-safe characters.
fn filename_part(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

fn text_attachment(filename: String, body: String) -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
}

/// GET /api/v1/feedback
///
/// Returns `{"state": "waiting"}` until a call for the selected agent exists
/// since the last launch, then the full feedback report.
pub async fn handle_get_feedback(
    State(state): State<AppState>,
    Query(query): Query<FeedbackQuery>,
) -> Result<Json<FeedbackOutcome>, AppError> {
    let (_, outcome) = fetch_current(&state, query.poll).await?;
    Ok(Json(outcome))
}

/// GET /api/v1/feedback/transcript
pub async fn handle_download_transcript(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let (agent, outcome) = fetch_current(&state, false).await?;
    let report = require_report(outcome)?;
    let transcript = report
        .transcript
        .ok_or_else(|| AppError::NotFound("Transcript is not available yet".to_string()))?;

    let now = Utc::now();
    let body = render_transcript(&agent.candidate_name, &agent.roll_no, &transcript, now);
    let filename = format!(
        "transcript_{}_{}.txt",
        filename_part(&agent.roll_no),
        now.format("%Y%m%d")
    );
    Ok(text_attachment(filename, body))
}

/// GET /api/v1/feedback/report
pub async fn handle_download_report(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let (agent, outcome) = fetch_current(&state, false).await?;
    let report = require_report(outcome)?;

    let now = Utc::now();
    let body = render_report(&agent.candidate_name, &agent.roll_no, &report, now);
    let filename = format!(
        "interview_report_{}_{}.txt",
        filename_part(&agent.roll_no),
        now.format("%Y%m%d")
    );
    Ok(text_attachment(filename, body))
}
