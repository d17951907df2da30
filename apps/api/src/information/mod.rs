//! Information extractor: turns resume text into an `ExtractedRecord` via
//! one LLM round-trip.

pub mod prompts;
pub mod record;

use thiserror::Error;

use crate::information::prompts::RESUME_PARSE_PROMPT;
use crate::llm_client::prompts::{JSON_ONLY_INSTRUCTION, NO_FABRICATION_INSTRUCTION};
use crate::llm_client::{ApiKey, CompletionClient, LlmError};

pub use record::{Education, Experience, ExtractedRecord};

#[derive(Debug, Error)]
pub enum InformationError {
    #[error("{0}")]
    Llm(#[from] LlmError),

    #[error("model reply is not valid JSON: {0}")]
    MalformedJson(#[source] serde_json::Error),

    #[error("model reply is JSON but not an object")]
    NotAnObject,
}

/// Builds the extraction instruction around the resume text.
pub fn build_prompt(resume_text: &str) -> String {
    RESUME_PARSE_PROMPT
        .replace("{no_fabrication}", NO_FABRICATION_INSTRUCTION)
        .replace("{json_only}", JSON_ONLY_INSTRUCTION)
        .replace("{resume_text}", resume_text)
}

/// Parses the model's JSON text into a record. Anything that is not a JSON
/// object is rejected; inside the object every field is read leniently.
pub fn parse_reply(reply: &str) -> Result<ExtractedRecord, InformationError> {
    let value: serde_json::Value =
        serde_json::from_str(reply).map_err(InformationError::MalformedJson)?;
    let obj = value.as_object().ok_or(InformationError::NotAnObject)?;
    Ok(ExtractedRecord::from_object(obj))
}

/// Sends the resume text to the model and maps its reply onto a record.
pub async fn extract_information(
    resume_text: &str,
    llm: &dyn CompletionClient,
    api_key: &ApiKey,
) -> Result<ExtractedRecord, InformationError> {
    let prompt = build_prompt(resume_text);
    let reply = llm.complete_json(api_key, &prompt).await?;
    parse_reply(&reply)
}
