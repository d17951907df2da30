//! Upload pipeline: text extraction → information extraction → session store.
//!
//! Files are processed one at a time. Every per-file failure is reduced to a
//! `Notice` and processing moves on to the next file.

use axum::extract::Multipart;
use serde::Serialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::extraction::{extract_text, UploadedDocument};
use crate::information::extract_information;
use crate::llm_client::{ApiKey, CompletionClient};
use crate::session::SessionStore;

pub const MISSING_KEY_MESSAGE: &str = "Please enter your OpenAI API key to continue.";
pub const UNSUPPORTED_FORMAT_MESSAGE: &str =
    "Unsupported file format. Please upload PDF, DOC or DOCX files only.";

/// Multipart field carrying the API key.
pub const API_KEY_FIELD: &str = "api_key";
/// Multipart field (repeatable) carrying resume files.
pub const RESUMES_FIELD: &str = "resumes";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

impl NoticeLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoticeLevel::Info => "info",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "error",
        }
    }
}

/// A user-visible, non-fatal message about one upload event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub file_name: Option<String>,
    pub message: String,
}

impl Notice {
    pub fn info(file_name: &str, message: impl Into<String>) -> Self {
        Self::for_file(NoticeLevel::Info, file_name, message)
    }

    pub fn warning(file_name: &str, message: impl Into<String>) -> Self {
        Self::for_file(NoticeLevel::Warning, file_name, message)
    }

    pub fn error(file_name: &str, message: impl Into<String>) -> Self {
        Self::for_file(NoticeLevel::Error, file_name, message)
    }

    fn for_file(level: NoticeLevel, file_name: &str, message: impl Into<String>) -> Self {
        Self {
            level,
            file_name: Some(file_name.to_string()),
            message: message.into(),
        }
    }

    /// A notice that is not about any particular file.
    pub fn general(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            file_name: None,
            message: message.into(),
        }
    }
}

#[derive(Debug, Default, Serialize)]
pub struct UploadOutcome {
    /// Files added to the session by this upload.
    pub processed: Vec<String>,
    /// Files already in the session, not re-extracted.
    pub skipped: Vec<String>,
    pub notices: Vec<Notice>,
}

/// Runs every new document through extraction and stores the results.
pub async fn process_uploads(
    store: &mut SessionStore,
    documents: Vec<UploadedDocument>,
    llm: &dyn CompletionClient,
    api_key: &ApiKey,
) -> UploadOutcome {
    let mut outcome = UploadOutcome::default();

    for document in documents {
        let file_name = document.file_name.clone();
        if store.has(&file_name) {
            info!(file_name = %file_name, "Already processed in this session, skipping");
            outcome.notices.push(Notice::info(
                &file_name,
                "Already processed in this session; showing the existing result.",
            ));
            outcome.skipped.push(file_name);
            continue;
        }

        match process_document(document, llm, api_key).await {
            Ok(record) => {
                store.put(file_name.clone(), record);
                info!(file_name = %file_name, "Resume processed");
                outcome.processed.push(file_name);
            }
            Err(notice) => {
                warn!(file_name = %file_name, "{}", notice.message);
                outcome.notices.push(notice);
            }
        }
    }

    info!(
        processed = outcome.processed.len(),
        skipped = outcome.skipped.len(),
        notices = outcome.notices.len(),
        session_files = store.len(),
        "Upload event complete"
    );
    outcome
}

/// One file through both stages; any failure comes back as its notice.
async fn process_document(
    document: UploadedDocument,
    llm: &dyn CompletionClient,
    api_key: &ApiKey,
) -> Result<crate::information::ExtractedRecord, Notice> {
    let file_name = document.file_name.as_str();
    let format = document
        .format()
        .ok_or_else(|| Notice::error(file_name, UNSUPPORTED_FORMAT_MESSAGE))?;

    let text = extract_text(document.bytes.clone(), format)
        .await
        .map_err(|e| Notice::error(file_name, format!("Error extracting text from file: {e}")))?;
    if text.trim().is_empty() {
        return Err(Notice::warning(
            file_name,
            "No text found in file; nothing to extract.",
        ));
    }

    let record = extract_information(&text, llm, api_key)
        .await
        .map_err(|e| Notice::error(file_name, format!("Error extracting information: {e}")))?;
    if record.is_empty() {
        return Err(Notice::warning(
            file_name,
            "No resume information could be extracted from this file.",
        ));
    }

    Ok(record)
}

/// The fields of one upload form submission.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub api_key: Option<ApiKey>,
    pub documents: Vec<UploadedDocument>,
}

impl UploadForm {
    /// The key, or the warning that halts the upload.
    pub fn require_api_key(&self) -> Result<&ApiKey, AppError> {
        self.api_key
            .as_ref()
            .ok_or_else(|| AppError::Validation(MISSING_KEY_MESSAGE.to_string()))
    }
}

/// Reads the `api_key` field and every `resumes` file from a multipart body.
/// Unknown fields are drained and ignored; file inputs left empty by the
/// browser are skipped.
pub async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await? {
        match field.name().unwrap_or("") {
            API_KEY_FIELD => {
                let raw = field.text().await?;
                form.api_key = ApiKey::parse(&raw);
            }
            RESUMES_FIELD => {
                let file_name = field.file_name().unwrap_or("").trim().to_string();
                let bytes = field.bytes().await?;
                if file_name.is_empty() && bytes.is_empty() {
                    continue;
                }
                tracing::debug!(file_name = %file_name, bytes = bytes.len(), "File received");
                form.documents.push(UploadedDocument::new(file_name, bytes));
            }
            _ => {
                field.bytes().await?;
            }
        }
    }

    Ok(form)
}
