// Document extraction prompt template and target schema.

/// Target fields and their expected JSON kinds, in the order the model should emit them.
pub const CANDIDATE_SCHEMA: &[(&str, &str)] = &[
    ("name", "string"),
    ("roll_no", "string"),
    ("dob", "string"),
    ("gender", "string"),
    ("community", "string"),
    ("religion", "string"),
    ("mother_tongue", "string"),
    ("birth_place", "string"),
    ("home_city", "string"),
    ("marital_status", "string"),
    ("employment_status", "string"),
    ("number_of_attempts", "integer"),
    ("service_preferences", "array"),
    ("cadre_preferences", "array"),
    ("assets", "string"),
    ("education", "object"),
    ("optional_subject", "string"),
    ("language_medium", "string"),
    ("hobbies", "array"),
    ("achievements", "array"),
    ("parents", "object"),
    ("address", "object"),
    ("email", "string"),
    ("phone", "string"),
    ("work_experience", "array"),
    ("positions_of_responsibility", "array"),
    ("extracurriculars", "array"),
    ("sports", "array"),
    ("certifications", "array"),
    ("awards", "array"),
    ("languages_known", "array"),
    ("preferred_languages_for_interview", "array"),
    ("coaching", "string"),
    ("career_gap_explanations", "string"),
    ("notable_projects", "array"),
    ("publications", "array"),
    ("social_work", "array"),
    ("disciplinary_actions", "string"),
];

/// Extraction instruction. Replace `{schema}` and `{reg_no}` before sending.
pub const EXTRACTION_PROMPT_TEMPLATE: &str = "\
You are an expert UPSC DAF parser. Extract a single JSON from DAF-1 and DAF-2 following this schema:
{schema}

Candidate roll/registration no.: {reg_no}

Rules:
- Return valid JSON only
- Populate all available fields from the documents
- If a field is absent, omit it from the JSON
- Extract detailed information for all arrays and objects";

/// Renders the schema as an indented JSON object of `field: kind`.
pub fn schema_json() -> String {
    let map: serde_json::Map<String, serde_json::Value> = CANDIDATE_SCHEMA
        .iter()
        .map(|(field, kind)| (field.to_string(), serde_json::Value::from(*kind)))
        .collect();
    serde_json::to_string_pretty(&map).unwrap_or_default()
}

pub fn extraction_prompt(reg_no: &str) -> String {
    let reg_no = match reg_no.trim() {
        "" => "UNKNOWN",
        other => other,
    };
    EXTRACTION_PROMPT_TEMPLATE
        .replace("{schema}", &schema_json())
        .replace("{reg_no}", reg_no)
}
