//! The structured record produced from a resume, and its lenient mapping from
//! whatever JSON the model returned.
//!
//! The model's output is only guaranteed to be valid JSON. Every field is
//! read defensively: absent or wrongly typed values default to empty instead
//! of failing the whole record.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Education {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub institution: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub degree: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_description: Option<String>,
}

/// Fixed-schema record extracted from one resume. Created once per file
/// name and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub education: Vec<Education>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub languages: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub experience: Vec<Experience>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub certificates: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub visas: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl ExtractedRecord {
    /// Maps a model reply onto the record. Unknown keys are dropped.
    pub fn from_object(obj: &Map<String, Value>) -> Self {
        ExtractedRecord {
            name: obj.get("name").and_then(text),
            education: entries(obj.get("education"), education_from),
            nationality: obj.get("nationality").and_then(text),
            date_of_birth: obj
                .get("date_of_birth")
                .or_else(|| obj.get("dob"))
                .and_then(text),
            languages: string_list(obj.get("languages")),
            location: obj.get("location").and_then(text),
            experience: entries(obj.get("experience"), experience_from),
            certificates: string_list(obj.get("certificates")),
            visas: string_list(obj.get("visas")),
            summary: obj.get("summary").and_then(text),
        }
    }

    /// True when nothing at all was found.
    pub fn is_empty(&self) -> bool {
        *self == ExtractedRecord::default()
    }
}

fn education_from(obj: &Map<String, Value>) -> Education {
    Education {
        institution: obj.get("institution").and_then(text),
        location: obj.get("location").and_then(text),
        degree: obj.get("degree").and_then(text),
        date: obj.get("date").and_then(text),
    }
}

fn experience_from(obj: &Map<String, Value>) -> Experience {
    Experience {
        company_name: obj.get("company_name").and_then(text),
        position: obj.get("position").and_then(text),
        duration: obj.get("duration").and_then(text),
        job_description: obj.get("job_description").and_then(multiline_text),
    }
}

/// Scalar → trimmed string. Blank strings, nulls and containers are absent.
fn text(value: &Value) -> Option<String> {
    let s = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    (!s.is_empty()).then_some(s)
}

/// Like `text`, but a list of strings is joined one per line.
fn multiline_text(value: &Value) -> Option<String> {
    match value {
        Value::Array(items) => {
            let lines: Vec<String> = items.iter().filter_map(text).collect();
            (!lines.is_empty()).then(|| lines.join("\n"))
        }
        other => text(other),
    }
}

/// List of strings; a lone scalar counts as a one-element list.
fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(text).collect(),
        Some(other) => text(other).into_iter().collect(),
        None => Vec::new(),
    }
}

/// List of objects; a lone object counts as a one-element list, non-objects
/// and entries with no recognised field are skipped.
fn entries<T, F>(value: Option<&Value>, map: F) -> Vec<T>
where
    T: Default + PartialEq,
    F: Fn(&Map<String, Value>) -> T,
{
    let items: Vec<&Value> = match value {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(obj @ Value::Object(_)) => vec![obj],
        _ => Vec::new(),
    };
    items
        .into_iter()
        .filter_map(Value::as_object)
        .map(map)
        .filter(|entry| *entry != T::default())
        .collect()
}
