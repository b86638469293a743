//! Feedback Retriever: finds the candidate's most recent call and reads its analysis.
//!
//! Algorithm:
//! 1. List calls filtered by agent id (limit 50); if that request fails, list
//!    unfiltered and filter locally.
//! 2. Keep calls of this agent whose `startedAt` is at or after the session
//!    threshold. Both sides are UTC ISO-8601 strings with millisecond precision,
//!    so string order is time order.
//! 3. Pick the call with the greatest `endedAt | updatedAt | createdAt | ""`;
//!    on ties the first one the platform listed wins.
//! 4. Nothing left → `Waiting`. Otherwise fetch the call and build the report.
//!
//! Read-only and safe to re-run at any time.

use std::time::Duration;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::errors::AppError;
use crate::interview::prompts::ASSESSMENT_CRITERIA;
use crate::models::call::{CallRecord, CallSummary};
use crate::voice_platform::{VoiceError, VoicePlatform};

pub const CALL_LIST_LIMIT: u32 = 50;

pub const PENDING_CRITERION: &str = "Status";
pub const PENDING_FEEDBACK: &str = "Analysis in progress. Please wait for interview completion.";

/// Overall suitability verdict of the success-evaluation plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Suitability {
    HighlySuitable,
    Suitable,
    Borderline,
    Unsuitable,
    /// Any label outside the rubric, kept verbatim.
    Other(String),
}

impl Suitability {
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "highly suitable" => Suitability::HighlySuitable,
            "suitable" => Suitability::Suitable,
            "borderline" => Suitability::Borderline,
            "unsuitable" => Suitability::Unsuitable,
            _ => Suitability::Other(label.trim().to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Suitability::HighlySuitable => "Highly Suitable",
            Suitability::Suitable => "Suitable",
            Suitability::Borderline => "Borderline",
            Suitability::Unsuitable => "Unsuitable",
            Suitability::Other(label) => label,
        }
    }
}

impl Serialize for Suitability {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    pub rating: Option<Suitability>,
    pub justification: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CriterionFeedback {
    pub criterion: String,
    pub feedback: String,
}

/// Everything the operator sees about one analysed call.
#[derive(Debug, Clone, Serialize)]
pub struct FeedbackReport {
    pub call_id: String,
    pub started_at: Option<String>,
    pub ended_at: Option<String>,
    pub summary: Option<String>,
    pub verdict: Option<Verdict>,
    pub criteria: Vec<CriterionFeedback>,
    pub recording_url: Option<String>,
    pub transcript: Option<String>,
}

impl FeedbackReport {
    /// The call has ended and the platform has finished its structured analysis.
    pub fn is_final(&self) -> bool {
        self.ended_at.is_some() && !self.analysis_pending()
    }

    /// Only the stand-in row is present, so the criteria analysis is not in yet.
    pub fn analysis_pending(&self) -> bool {
        matches!(self.criteria.as_slice(), [row] if row.criterion == PENDING_CRITERION)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FeedbackOutcome {
    /// No call for this agent since the session started. Not an error.
    Waiting,
    Ready { feedback: FeedbackReport },
}

/// Lists calls for `agent_id`, falling back to an unfiltered listing when the
/// filtered request fails.
pub async fn list_agent_calls(
    platform: &dyn VoicePlatform,
    agent_id: &str,
) -> Result<Vec<CallSummary>, AppError> {
    match platform.list_calls(Some(agent_id), CALL_LIST_LIMIT).await {
        Ok(calls) => Ok(calls),
        Err(e) => {
            warn!("Filtered call listing failed ({e}); retrying without filter");
            platform
                .list_calls(None, CALL_LIST_LIMIT)
                .await
                .map_err(platform_error)
        }
    }
}

/// Calls of `agent_id` that started at or after `since`, in listing order.
pub fn filter_calls(calls: Vec<CallSummary>, agent_id: &str, since: &str) -> Vec<CallSummary> {
    calls
        .into_iter()
        .filter(|call| call.assistant_id.as_deref() == Some(agent_id))
        .filter(|call| call.started_at.as_deref().unwrap_or("") >= since)
        .collect()
}

/// The most recently concluded call; the first listed wins ties.
pub fn latest_call(calls: &[CallSummary]) -> Option<&CallSummary> {
    let mut best: Option<&CallSummary> = None;
    for call in calls {
        match best {
            Some(current) if call.conclusion_key() <= current.conclusion_key() => {}
            _ => best = Some(call),
        }
    }
    best
}

/// Criterion rows in fixed display order, skipping missing or empty fields.
/// With nothing to show, a single pending row stands in.
pub fn criteria_rows(structured: Option<&Map<String, Value>>) -> Vec<CriterionFeedback> {
    let mut rows: Vec<CriterionFeedback> = ASSESSMENT_CRITERIA
        .iter()
        .filter_map(|(field, label)| {
            let text = structured?.get(*field).and_then(value_text)?;
            Some(CriterionFeedback {
                criterion: label.to_string(),
                feedback: text,
            })
        })
        .collect();

    if rows.is_empty() {
        rows.push(CriterionFeedback {
            criterion: PENDING_CRITERION.to_string(),
            feedback: PENDING_FEEDBACK.to_string(),
        });
    }
    rows
}

/// Reads the success evaluation. The rubric normally yields an object with
/// `overallRating` and `justification` (or `reason`); a bare string, or a string
/// holding that object as JSON, is accepted too.
pub fn parse_verdict(evaluation: Option<&Value>) -> Option<Verdict> {
    let verdict = match evaluation? {
        Value::Object(fields) => verdict_from_object(fields),
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(fields)) => verdict_from_object(&fields),
            _ => Verdict {
                rating: None,
                justification: non_blank(text),
            },
        },
        _ => return None,
    };
    if verdict.rating.is_none() && verdict.justification.is_none() {
        None
    } else {
        Some(verdict)
    }
}

fn verdict_from_object(fields: &Map<String, Value>) -> Verdict {
    let rating = fields
        .get("overallRating")
        .and_then(value_text)
        .map(|label| Suitability::from_label(&label));
    let justification = fields
        .get("justification")
        .and_then(value_text)
        .or_else(|| fields.get("reason").and_then(value_text));
    Verdict {
        rating,
        justification,
    }
}

pub fn build_report(call: &CallRecord) -> FeedbackReport {
    let analysis = &call.analysis;
    FeedbackReport {
        call_id: call.id.clone(),
        started_at: call.started_at.clone(),
        ended_at: call.ended_at.clone(),
        summary: analysis.summary.as_deref().and_then(non_blank),
        verdict: parse_verdict(analysis.success_evaluation.as_ref()),
        criteria: criteria_rows(analysis.structured_data.as_ref()),
        recording_url: call.recording_url().map(String::from),
        transcript: call.artifact.transcript.as_deref().and_then(non_blank),
    }
}

/// One retrieval pass for `agent_id`, ignoring calls started before `since`.
pub async fn retrieve_feedback(
    platform: &dyn VoicePlatform,
    agent_id: &str,
    since: &str,
) -> Result<FeedbackOutcome, AppError> {
    let calls = list_agent_calls(platform, agent_id).await?;
    let listed = calls.len();
    let relevant = filter_calls(calls, agent_id, since);
    debug!(
        "{} of {listed} listed calls belong to agent {agent_id} since {since}",
        relevant.len()
    );

    let Some(latest) = latest_call(&relevant) else {
        return Ok(FeedbackOutcome::Waiting);
    };

    let call = platform
        .get_call(&latest.id)
        .await
        .map_err(platform_error)?;
    info!("Feedback retrieved from call {}", call.id);
    Ok(FeedbackOutcome::Ready {
        feedback: build_report(&call),
    })
}

/// Re-runs the retriever every `interval` until the latest call has ended and
/// been analysed, or `max_attempts` passes are used. The last outcome is
/// returned either way. Errors end the polling immediately.
pub async fn poll_feedback(
    platform: &dyn VoicePlatform,
    agent_id: &str,
    since: &str,
    interval: Duration,
    max_attempts: u32,
) -> Result<FeedbackOutcome, AppError> {
    let attempts = max_attempts.max(1);
    for attempt in 1..=attempts {
        let outcome = retrieve_feedback(platform, agent_id, since).await?;
        let finished = match &outcome {
            FeedbackOutcome::Ready { feedback } => feedback.is_final(),
            FeedbackOutcome::Waiting => false,
        };
        if finished || attempt == attempts {
            return Ok(outcome);
        }
        debug!("No finished call yet for agent {agent_id} (attempt {attempt}/{attempts})");
        tokio::time::sleep(interval).await;
    }
    Ok(FeedbackOutcome::Waiting)
}

fn platform_error(err: VoiceError) -> AppError {
    match err {
        VoiceError::Api { status, body } | VoiceError::MissingId { status, body } => {
            AppError::VoicePlatform { status, body }
        }
        other => AppError::VoicePlatform {
            status: 0,
            body: other.to_string(),
        },
    }
}

/// Strings as-is, other non-empty values as compact JSON.
fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => non_blank(s),
        Value::Array(a) if a.is_empty() => None,
        Value::Object(o) if o.is_empty() => None,
        other => Some(other.to_string()),
    }
}

fn non_blank(text: &str) -> Option<String> {
    if text.trim().is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serde_json::json;

    use super::*;
    use crate::voice_platform::fake::FakeVoicePlatform;

    const T1: &str = "2024-05-01T09:00:00.000Z";
    const T2: &str = "2024-05-01T10:00:00.000Z";
    const T3: &str = "2024-05-01T11:00:00.000Z";

    fn summary(id: &str, agent: &str, started: &str, ended: Option<&str>) -> CallSummary {
        CallSummary {
            id: id.to_string(),
            assistant_id: Some(agent.to_string()),
            started_at: Some(started.to_string()),
            ended_at: ended.map(String::from),
            ..Default::default()
        }
    }

    fn detail(id: &str, analysis: Value) -> CallRecord {
        serde_json::from_value(json!({
            "id": id,
            "assistantId": "A",
            "startedAt": T2,
            "endedAt": T3,
            "analysis": analysis,
            "artifact": {
                "transcript": "AI: Welcome, please be seated.\nUser: Thank you.",
                "recording": {"mono": {"combinedUrl": format!("https://rec.example/{id}.wav")}}
            }
        }))
        .unwrap()
    }

    fn full_analysis() -> Value {
        json!({
            "summary": "The board discussed water governance and the candidate's hobby of birding.",
            "successEvaluation": {
                "overallRating": "Suitable",
                "justification": "Balanced answers with minor gaps on current affairs."
            },
            "structuredData": {
                "overallFeedback": "Composed and honest.",
                "clarityOfExpression": "Clear and concise.",
                "ethicalJudgment": ""
            }
        })
    }

    #[test]
    fn test_filter_keeps_only_target_agent_since_threshold() {
        let calls = vec![
            summary("c1", "A", T1, Some(T1)),
            summary("c2", "A", T2, Some(T3)),
            summary("c3", "B", T3, Some(T3)),
        ];
        let kept = filter_calls(calls, "A", T1);
        let ids: Vec<_> = kept.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c1", "c2"]);
        assert_eq!(latest_call(&kept).unwrap().id, "c2");
    }

    #[test]
    fn test_calls_before_threshold_are_dropped() {
        let calls = vec![summary("c1", "A", T1, None), summary("c2", "A", T2, None)];
        assert!(filter_calls(calls, "A", T3).is_empty());
    }

    #[test]
    fn test_call_without_started_at_is_dropped_after_a_launch() {
        let mut call = summary("c1", "A", T2, None);
        call.started_at = None;
        assert!(filter_calls(vec![call], "A", T1).is_empty());
    }

    #[test]
    fn test_latest_prefers_ended_then_updated_then_created() {
        let mut by_update = summary("c1", "A", T1, None);
        by_update.updated_at = Some(T3.to_string());
        let by_end = summary("c2", "A", T1, Some(T2));
        let calls = vec![by_end, by_update];
        assert_eq!(latest_call(&calls).unwrap().id, "c1");
    }

    #[test]
    fn test_latest_tie_goes_to_first_listed() {
        let calls = vec![summary("c1", "A", T1, Some(T2)), summary("c2", "A", T1, Some(T2))];
        assert_eq!(latest_call(&calls).unwrap().id, "c1");
        assert!(latest_call(&[]).is_none());
    }

    #[test]
    fn test_criteria_follow_display_order_and_skip_blanks() {
        let structured = full_analysis()["structuredData"].as_object().cloned().unwrap();
        let rows = criteria_rows(Some(&structured));
        let labels: Vec<_> = rows.iter().map(|r| r.criterion.as_str()).collect();
        assert_eq!(labels, vec!["Clarity of Expression", "Overall Feedback"]);
    }

    #[test]
    fn test_missing_criteria_become_pending_row() {
        for structured in [None, Some(Map::new())] {
            let rows = criteria_rows(structured.as_ref());
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0].criterion, PENDING_CRITERION);
            assert_eq!(rows[0].feedback, PENDING_FEEDBACK);
        }
    }

    #[test]
    fn test_verdict_variants() {
        let v = parse_verdict(Some(&json!({"overallRating": "Borderline", "reason": "Hesitant."})))
            .unwrap();
        assert_eq!(v.rating, Some(Suitability::Borderline));
        assert_eq!(v.justification.as_deref(), Some("Hesitant."));

        let v = parse_verdict(Some(&json!(
            "{\"overallRating\": \"Highly Suitable\", \"justification\": \"Excellent.\"}"
        )))
        .unwrap();
        assert_eq!(v.rating, Some(Suitability::HighlySuitable));

        let v = parse_verdict(Some(&json!("Suitable overall, good poise."))).unwrap();
        assert_eq!(v.rating, None);
        assert_eq!(v.justification.as_deref(), Some("Suitable overall, good poise."));

        assert!(parse_verdict(None).is_none());
        assert!(parse_verdict(Some(&json!({}))).is_none());
    }

    #[test]
    fn test_unknown_rating_label_is_kept() {
        let rating = Suitability::from_label("Needs Review");
        assert_eq!(rating, Suitability::Other("Needs Review".to_string()));
        assert_eq!(serde_json::to_value(&rating).unwrap(), json!("Needs Review"));
        assert_eq!(Suitability::from_label(" unsuitable "), Suitability::Unsuitable);
    }

    #[tokio::test]
    async fn test_retrieve_selects_latest_and_builds_report() {
        let platform = FakeVoicePlatform {
            calls: vec![
                summary("c1", "A", T1, Some(T1)),
                summary("c2", "A", T2, Some(T3)),
                summary("c3", "B", T3, Some(T3)),
            ],
            details: HashMap::from([("c2".to_string(), detail("c2", full_analysis()))]),
            ..Default::default()
        };

        let outcome = retrieve_feedback(&platform, "A", T1).await.unwrap();
        let FeedbackOutcome::Ready { feedback } = outcome else {
            panic!("expected a report");
        };
        assert_eq!(feedback.call_id, "c2");
        assert!(feedback.summary.unwrap().contains("water governance"));
        assert_eq!(feedback.verdict.unwrap().rating, Some(Suitability::Suitable));
        assert_eq!(feedback.criteria.len(), 2);
        assert_eq!(
            feedback.recording_url.as_deref(),
            Some("https://rec.example/c2.wav")
        );
        assert!(feedback.transcript.unwrap().starts_with("AI: Welcome"));
    }

    #[tokio::test]
    async fn test_no_calls_since_threshold_is_waiting() {
        let platform = FakeVoicePlatform {
            calls: vec![summary("c1", "A", T1, Some(T1)), summary("c2", "A", T2, Some(T2))],
            ..Default::default()
        };
        let outcome = retrieve_feedback(&platform, "A", T3).await.unwrap();
        assert!(matches!(outcome, FeedbackOutcome::Waiting));
    }

    #[tokio::test]
    async fn test_filtered_listing_failure_falls_back_to_unfiltered() {
        let platform = FakeVoicePlatform {
            filtered_list_fails: true,
            calls: vec![summary("c1", "A", T2, Some(T2)), summary("c9", "Z", T2, Some(T3))],
            details: HashMap::from([("c1".to_string(), detail("c1", json!({})))]),
            ..Default::default()
        };

        let outcome = retrieve_feedback(&platform, "A", T1).await.unwrap();
        assert!(matches!(outcome, FeedbackOutcome::Ready { ref feedback } if feedback.call_id == "c1"));
        assert_eq!(
            *platform.list_requests.lock().unwrap(),
            vec![Some("A".to_string()), None]
        );
    }

    #[tokio::test]
    async fn test_listing_failure_is_reported_with_status() {
        let platform = FakeVoicePlatform {
            list_fails: true,
            ..Default::default()
        };
        let err = retrieve_feedback(&platform, "A", T1).await.unwrap_err();
        assert!(matches!(err, AppError::VoicePlatform { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_detail_failure_is_reported() {
        let platform = FakeVoicePlatform {
            calls: vec![summary("c1", "A", T2, Some(T2))],
            ..Default::default()
        };
        let err = retrieve_feedback(&platform, "A", T1).await.unwrap_err();
        assert!(matches!(err, AppError::VoicePlatform { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_poll_gives_up_after_max_attempts() {
        let platform = FakeVoicePlatform::default();
        let outcome = poll_feedback(&platform, "A", T1, Duration::ZERO, 3).await.unwrap();
        assert!(matches!(outcome, FeedbackOutcome::Waiting));
        assert_eq!(platform.list_requests.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_poll_stops_at_first_finished_report() {
        let platform = FakeVoicePlatform {
            calls: vec![summary("c1", "A", T2, Some(T2))],
            details: HashMap::from([("c1".to_string(), detail("c1", full_analysis()))]),
            ..Default::default()
        };
        let outcome = poll_feedback(&platform, "A", T1, Duration::ZERO, 5).await.unwrap();
        assert!(matches!(outcome, FeedbackOutcome::Ready { .. }));
        assert_eq!(platform.list_requests.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_poll_keeps_going_while_call_is_running() {
        let mut running = detail("c1", json!({}));
        running.ended_at = None;
        let platform = FakeVoicePlatform {
            calls: vec![summary("c1", "A", T2, None)],
            details: HashMap::from([("c1".to_string(), running)]),
            ..Default::default()
        };

        let outcome = poll_feedback(&platform, "A", T1, Duration::ZERO, 4).await.unwrap();
        let FeedbackOutcome::Ready { feedback } = outcome else {
            panic!("expected the running call to be reported");
        };
        assert!(feedback.ended_at.is_none());
        assert!(!feedback.is_final());
        assert_eq!(platform.list_requests.lock().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_poll_keeps_going_while_analysis_is_pending() {
        let platform = FakeVoicePlatform {
            calls: vec![summary("c1", "A", T2, Some(T3))],
            details: HashMap::from([("c1".to_string(), detail("c1", json!({"summary": "Short call."})))]),
            ..Default::default()
        };

        let outcome = poll_feedback(&platform, "A", T1, Duration::ZERO, 3).await.unwrap();
        let FeedbackOutcome::Ready { feedback } = outcome else {
            panic!("expected a report");
        };
        assert!(feedback.analysis_pending());
        assert_eq!(feedback.criteria[0].criterion, PENDING_CRITERION);
        assert_eq!(platform.list_requests.lock().unwrap().len(), 3);
    }

    #[test]
    fn test_report_is_final_only_once_ended_and_analysed() {
        let mut report = build_report(&detail("c1", full_analysis()));
        assert!(report.is_final());
        report.ended_at = None;
        assert!(!report.is_final());
        let pending = build_report(&detail("c1", json!({})));
        assert!(pending.analysis_pending());
        assert!(!pending.is_final());
    }
}
