//! Presentation: maps an `ExtractedRecord` onto a renderable section tree.
//!
//! Pure: no mutation of the record and no I/O. The same tree feeds the JSON
//! API and the HTML page template.

pub mod page;

use serde::Serialize;

use crate::information::{Education, Experience, ExtractedRecord};

const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    BasicInfo,
    Summary,
    Experience,
    Education,
    Languages,
    Certificates,
    Visas,
}

impl SectionKind {
    pub fn heading(&self) -> &'static str {
        match self {
            SectionKind::BasicInfo => "Basic Information",
            SectionKind::Summary => "Professional Summary",
            SectionKind::Experience => "Work Experience",
            SectionKind::Education => "Education",
            SectionKind::Languages => "Languages",
            SectionKind::Certificates => "Certificates",
            SectionKind::Visas => "Work Visas",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub label: &'static str,
    pub value: String,
}

/// One visual block inside a section: an optional title, labeled fields, a
/// paragraph and a bullet list, each possibly empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Block {
    pub title: Option<String>,
    pub fields: Vec<Field>,
    pub text: Option<String>,
    pub bullets: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub kind: SectionKind,
    pub heading: &'static str,
    pub blocks: Vec<Block>,
}

impl Section {
    fn new(kind: SectionKind, blocks: Vec<Block>) -> Self {
        Self {
            kind,
            heading: kind.heading(),
            blocks,
        }
    }

    /// Experience entries render as expandable blocks.
    pub fn is_collapsible(&self) -> bool {
        self.kind == SectionKind::Experience
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResumeView {
    pub title: String,
    pub file_name: String,
    pub sections: Vec<Section>,
}

impl ResumeView {
    pub fn section(&self, kind: SectionKind) -> Option<&Section> {
        self.sections.iter().find(|s| s.kind == kind)
    }
}

/// Lays out one record. Basic info is always present; every other section
/// appears only when its field is non-empty.
pub fn render_record(file_name: &str, record: &ExtractedRecord) -> ResumeView {
    let mut sections = vec![Section::new(
        SectionKind::BasicInfo,
        vec![Block {
            fields: vec![
                field("Name", &record.name),
                field("Location", &record.location),
                field("Nationality", &record.nationality),
                field("Date of Birth", &record.date_of_birth),
            ],
            ..Default::default()
        }],
    )];

    if let Some(summary) = non_blank(&record.summary) {
        sections.push(Section::new(
            SectionKind::Summary,
            vec![Block {
                text: Some(summary.to_string()),
                ..Default::default()
            }],
        ));
    }

    if !record.experience.is_empty() {
        sections.push(Section::new(
            SectionKind::Experience,
            record.experience.iter().map(experience_block).collect(),
        ));
    }

    if !record.education.is_empty() {
        sections.push(Section::new(
            SectionKind::Education,
            record.education.iter().map(education_block).collect(),
        ));
    }

    if !record.languages.is_empty() {
        sections.push(Section::new(
            SectionKind::Languages,
            vec![Block {
                text: Some(record.languages.join(", ")),
                ..Default::default()
            }],
        ));
    }

    if !record.certificates.is_empty() {
        sections.push(bullet_section(SectionKind::Certificates, &record.certificates));
    }

    if !record.visas.is_empty() {
        sections.push(bullet_section(SectionKind::Visas, &record.visas));
    }

    ResumeView {
        title: format!("Resume Analysis: {file_name}"),
        file_name: file_name.to_string(),
        sections,
    }
}

fn experience_block(exp: &Experience) -> Block {
    let position = non_blank(&exp.position).unwrap_or("Role");
    let company = non_blank(&exp.company_name).unwrap_or("Company");
    Block {
        title: Some(format!("{position} at {company}")),
        fields: vec![field("Duration", &exp.duration)],
        text: None,
        bullets: exp
            .job_description
            .as_deref()
            .map(split_bullets)
            .unwrap_or_default(),
    }
}

fn education_block(edu: &Education) -> Block {
    Block {
        title: Some(non_blank(&edu.degree).unwrap_or("Degree").to_string()),
        fields: vec![
            field("Institution", &edu.institution),
            field("Location", &edu.location),
            field("Completion Date", &edu.date),
        ],
        ..Default::default()
    }
}

fn bullet_section(kind: SectionKind, items: &[String]) -> Section {
    Section::new(
        kind,
        vec![Block {
            bullets: items.to_vec(),
            ..Default::default()
        }],
    )
}

fn field(label: &'static str, value: &Option<String>) -> Field {
    Field {
        label,
        value: non_blank(value).unwrap_or(NOT_AVAILABLE).to_string(),
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// One bullet per non-blank line, with leading list markers removed.
fn split_bullets(description: &str) -> Vec<String> {
    description
        .lines()
        .map(|line| line.trim().trim_start_matches(&['-', '•', '*'][..]).trim())
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}
