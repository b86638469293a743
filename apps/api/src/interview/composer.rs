//! Prompt Composer: renders the interviewer persona for one candidate.
//!
//! Total: any record, including `{}`, yields a prompt. The record is serialized
//! once with its own JSON escaping and spliced in as an opaque block, so field
//! values cannot break the surrounding template.

use crate::interview::prompts::INTERVIEW_PROMPT_TEMPLATE;
use crate::models::candidate::CandidateRecord;

pub const DEFAULT_CANDIDATE_NAME: &str = "Candidate";

/// Builds the system instructions for the voice agent.
///
/// `fallback_roll_no` is used when the record carries no roll number
/// (normally the registration number the operator typed in).
pub fn compose_prompt(record: &CandidateRecord, fallback_roll_no: &str) -> String {
    let name = record
        .name()
        .unwrap_or_else(|| DEFAULT_CANDIDATE_NAME.to_string());
    let roll_no = record
        .roll_no()
        .unwrap_or_else(|| fallback_roll_no.to_string());
    let candidate_json = record.to_pretty_json();

    // Placeholders are substituted one pass at a time, with the candidate JSON
    // last, so text inside the JSON is never re-scanned for placeholders.
    let (head, tail) = INTERVIEW_PROMPT_TEMPLATE
        .split_once("{candidate_json}")
        .unwrap_or((INTERVIEW_PROMPT_TEMPLATE, ""));
    let head = head.replace("{roll_no}", &roll_no);
    let head = head.replace("{name}", &name);

    let mut prompt = String::with_capacity(head.len() + candidate_json.len() + tail.len());
    prompt.push_str(&head);
    prompt.push_str(&candidate_json);
    prompt.push_str(tail);
    prompt
}
