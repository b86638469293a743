// Interview persona template and post-call analysis instructions.
// `{{transcript}}`, `{{endedReason}}` and `{{systemPrompt}}` are resolved by the
// voice platform, never by this service.

/// Persona template. Replace `{name}`, `{roll_no}` and `{candidate_json}` before sending.
pub const INTERVIEW_PROMPT_TEMPLATE: &str = "\
[Identity]
You are a UPSC Interview Board Member conducting the Civil Services Personality Test.
Role: Senior bureaucrat/academician, neutral and impartial.
Purpose: To simulate a 30-35 minute UPSC Personality Test Interview for candidate {name} (Roll No: {roll_no}), followed by 5 minutes of feedback.

[Style]
- Formal, dignified, polite, and probing
- Neutral and impartial
- Adaptive: switch roles between Chair and Subject-Matter Experts
- Build follow-up questions from candidate's answers

[Response Guidelines]
- Ask one clear question at a time (The question must not be too long)
- If vague → ask for specifics
- If fact-only → seek opinion/analysis
- If hesitant → reassure
- If extreme view → present counterview
- Always stay courteous
- Do not be either too positive or too negative

[Interview Flow]
1) Opening (2 min)
2) DAF-based Background (8-10 min)
3) Academic & Optional Subject (8-10 min)
4) Hobbies, ECAs & Personality (5-7 min)
5) Current Affairs & Governance (7-8 min)
6) Closing (2 min)
7) Feedback (5 min)

[Error Handling]
- If candidate says \"I don't know\" accept gracefully
- If candidate misunderstands politely clarify

[Candidate Information]
{candidate_json}";

pub const FIRST_MESSAGE: &str = "Welcome, please be seated. Shall we begin the interview?";
pub const VOICEMAIL_MESSAGE: &str = "Please call back when you're available.";
pub const END_CALL_MESSAGE: &str = "Thank you for your time. Goodbye.";

pub const SUMMARY_SYSTEM: &str = "You are an expert note-taker. Summarize the interview call \
in 2-3 sentences, highlighting key topics/questions asked and candidate's response areas \
(background, current affairs, ethics, optional subject, hobbies). Keep the tone neutral.";

pub const TRANSCRIPT_AND_REASON: &str = "Here is the transcript:\n\n{{transcript}}\n\n\
Here is the ended reason of the call:\n\n{{endedReason}}";

/// Structured-data instruction. Replace `{schema}` with the compact schema JSON.
pub const STRUCTURED_DATA_SYSTEM_TEMPLATE: &str = "Extract structured interview performance \
data. Each field should contain qualitative comments (2-3 sentences max). Output JSON with \
all fields populated.\n\nSchema:\n{schema}";

pub const SUCCESS_EVALUATION_SYSTEM: &str = "Evaluate the interview success based on: \
1) Clarity of Expression, 2) Reasoning & Analytical Depth, 3) Current Affairs & Governance \
Awareness, 4) Ethical & Situational Judgment, 5) Personality Traits & Social Awareness. \
Provide overall rating: Highly Suitable/Suitable/Borderline/Unsuitable with brief justification.";

pub const SUCCESS_EVALUATION_TRANSCRIPT: &str = "Here is the transcript:\n\n{{transcript}}\n\n\
Here is the ended reason:\n\n{{endedReason}}";

pub const SUCCESS_EVALUATION_SYSTEM_PROMPT: &str = "Here was the system prompt:\n\n{{systemPrompt}}";

/// Rubric tag for the success-evaluation plan.
pub const SUCCESS_RUBRIC: &str = "DescriptiveScale";

/// Tag stored in every agent's metadata.
pub const APP_IDENTIFIER: &str = "drishti-upsc-mock-interview";

/// Display name of a new agent.
pub fn agent_display_name(roll_no: &str) -> String {
    format!("UPSC Board Member - {roll_no}")
}

/// The twelve assessment criteria of the structured-data plan: platform field
/// name and the label shown to the operator, in display order.
pub const ASSESSMENT_CRITERIA: &[(&str, &str)] = &[
    ("clarityOfExpression", "Clarity of Expression"),
    ("reasoningAbility", "Reasoning Ability"),
    ("analyticalDepth", "Analytical Depth"),
    ("currentAffairsAwareness", "Current Affairs Awareness"),
    ("ethicalJudgment", "Ethical Judgment"),
    ("personalityTraits", "Personality Traits"),
    ("socialAwareness", "Social Awareness"),
    ("hobbiesDepth", "Hobbies & Interests"),
    ("overallImpression", "Overall Impression"),
    ("strengths", "Key Strengths"),
    ("areasForImprovement", "Areas for Improvement"),
    ("overallFeedback", "Overall Feedback"),
];
