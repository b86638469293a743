//! Document Extractor: turns uploaded application documents into a CandidateRecord.
//!
//! Flow: validate uploads → build instruction → document service →
//!       lenient JSON recovery → roll number fallback.
//!
//! No retries and no partial records: a response that does not yield a JSON
//! object fails the whole extraction and the operator re-submits.

pub mod handlers;
pub mod lenient_json;
pub mod prompts;

use bytes::Bytes;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::llm_client::{Attachment, DocumentService};
use crate::models::candidate::CandidateRecord;

/// Minimum number of documents per extraction (DAF-1 and DAF-2).
pub const MIN_DOCUMENTS: usize = 2;

/// One uploaded document.
#[derive(Debug, Clone)]
pub struct DocumentBlob {
    pub filename: String,
    pub mime_type: &'static str,
    pub bytes: Bytes,
}

impl DocumentBlob {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        let filename = filename.into();
        Self {
            mime_type: mime_type_for(&filename),
            filename,
            bytes: bytes.into(),
        }
    }
}

/// MIME type from the filename extension. Unknown extensions degrade to a
/// generic binary type instead of failing.
pub fn mime_type_for(filename: &str) -> &'static str {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => "application/pdf",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        _ => "application/octet-stream",
    }
}

/// Runs one extraction round-trip and returns the validated record.
pub async fn extract_candidate(
    service: &dyn DocumentService,
    documents: &[DocumentBlob],
    reg_no: &str,
) -> Result<CandidateRecord, AppError> {
    if documents.len() < MIN_DOCUMENTS {
        return Err(AppError::Validation(format!(
            "at least {MIN_DOCUMENTS} documents are required, got {}",
            documents.len()
        )));
    }
    if let Some(empty) = documents.iter().find(|d| d.bytes.is_empty()) {
        return Err(AppError::Validation(format!(
            "document '{}' is empty",
            empty.filename
        )));
    }

    let instruction = prompts::extraction_prompt(reg_no);
    let attachments: Vec<Attachment<'_>> = documents
        .iter()
        .map(|d| Attachment {
            mime_type: d.mime_type,
            bytes: d.bytes.as_ref(),
        })
        .collect();

    info!(
        "Extracting candidate record from {} documents (reg_no: {:?})",
        documents.len(),
        reg_no
    );
    let text = service
        .generate(&instruction, &attachments)
        .await
        .map_err(|e| AppError::Llm(format!("Extraction request failed: {e}")))?;

    let fields = lenient_json::extract_object(&text).map_err(|reason| {
        warn!("Extraction response was not usable JSON ({} chars)", text.len());
        AppError::MalformedExtraction(reason)
    })?;

    let mut record = CandidateRecord::new(fields);
    record.apply_roll_no_fallback(reg_no);
    info!(
        "Extracted {} fields for roll_no {:?}",
        record.fields().len(),
        record.roll_no()
    );
    Ok(record)
}
