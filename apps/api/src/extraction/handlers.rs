use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;
use tracing::debug;

use crate::errors::AppError;
use crate::extraction::{extract_candidate, DocumentBlob};
use crate::models::candidate::CandidateRecord;
use crate::state::AppState;

/// Multipart text field carrying the operator-supplied registration number.
const REG_NO_FIELD: &str = "reg_no";

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub record: CandidateRecord,
    pub roll_no: String,
    pub documents: Vec<String>,
}

/// POST /api/v1/candidate/extract
///
/// Multipart upload: every part with a filename is a document, the `reg_no`
/// text part is the registration number. On success the extracted record
/// replaces the current one; on failure the current record is untouched.
pub async fn handle_extract(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ExtractResponse>, AppError> {
    let mut documents = Vec::new();
    let mut reg_no = String::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid upload: {e}")))?
    {
        let filename = field.file_name().map(String::from);
        let name = field.name().unwrap_or_default().to_string();
        match filename {
            Some(filename) => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Could not read '{filename}': {e}")))?;
                debug!("Received document '{filename}' ({} bytes)", bytes.len());
                documents.push(DocumentBlob::new(filename, bytes));
            }
            None if name == REG_NO_FIELD => {
                reg_no = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Invalid reg_no field: {e}")))?;
            }
            None => debug!("Ignoring unexpected form field '{name}'"),
        }
    }

    let record = extract_candidate(state.documents.as_ref(), &documents, &reg_no).await?;

    let mut session = state.session.lock().await;
    session.replace_record(record.clone(), &reg_no);
    let roll_no = session.effective_roll_no();

    Ok(Json(ExtractResponse {
        record,
        roll_no,
        documents: documents.into_iter().map(|d| d.filename).collect(),
    }))
}
