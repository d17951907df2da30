// Shared prompt fragments.
// Each service that needs LLM calls defines its own prompts.rs alongside it;
// requests carry a single user message, so fragments are spliced into it.

/// Instruction that pins the reply to a single JSON object.
pub const JSON_ONLY_INSTRUCTION: &str = "Return the data in JSON format. \
    Respond with a single JSON object only, with no text outside it.";

/// Instruction against fabricating fields the source does not contain.
pub const NO_FABRICATION_INSTRUCTION: &str = "Ensure consistency in format and field names. \
    If data does not exist in the resume, leave it empty. Do NOT infer or invent details.";
