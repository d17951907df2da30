//! Text extraction: pulls plain text out of uploaded resume documents.
//!
//! One `TextExtractor` capability, two variants (PDF, Word), selected by the
//! `DocumentFormat` derived from the file name. Parsing is CPU-bound and the
//! parser libraries may panic on hostile input, so `extract_text` runs the
//! variant on the blocking pool and turns a panic into an `ExtractError`.

pub mod pdf;
pub mod word;

use std::path::Path;

use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;

pub use pdf::PdfExtractor;
pub use word::WordExtractor;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to parse PDF: {0}")]
    Pdf(String),

    #[error("failed to open Word document: {0}")]
    Container(String),

    #[error("malformed Word document: {0}")]
    Markup(String),

    #[error("legacy binary Word format (.doc) is not supported; save the file as .docx")]
    LegacyWord,

    #[error("extraction task failed: {0}")]
    Task(String),
}

/// Document formats accepted for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Doc,
}

impl DocumentFormat {
    /// Derives the format from the file name's extension, case-insensitively.
    /// Returns `None` for anything other than `.pdf`, `.docx` and `.doc`.
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())?
            .to_ascii_lowercase();
        match extension.as_str() {
            "pdf" => Some(DocumentFormat::Pdf),
            "docx" => Some(DocumentFormat::Docx),
            "doc" => Some(DocumentFormat::Doc),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Docx => "docx",
            DocumentFormat::Doc => "doc",
        }
    }
}

/// A file received from the upload control. Lives only for one upload event.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub file_name: String,
    pub bytes: Bytes,
}

impl UploadedDocument {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn format(&self) -> Option<DocumentFormat> {
        DocumentFormat::from_file_name(&self.file_name)
    }
}

/// The extraction capability shared by both variants.
pub trait TextExtractor: Send + Sync {
    /// Returns the document's visible text in reading order.
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractError>;
}

/// Picks the variant for a format tag.
pub fn extractor_for(format: DocumentFormat) -> &'static dyn TextExtractor {
    match format {
        DocumentFormat::Pdf => &PdfExtractor,
        DocumentFormat::Docx | DocumentFormat::Doc => &WordExtractor,
    }
}

/// Extracts text from `bytes` on the blocking pool.
#[tracing::instrument(skip_all, fields(format = format.as_str(), size = bytes.len()))]
pub async fn extract_text(bytes: Bytes, format: DocumentFormat) -> Result<String, ExtractError> {
    let text = tokio::task::spawn_blocking(move || extractor_for(format).extract(&bytes))
        .await
        .map_err(|e| ExtractError::Task(e.to_string()))??;

    tracing::debug!(chars = text.len(), "Text extraction complete");
    Ok(text)
}
