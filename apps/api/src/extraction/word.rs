use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use zip::ZipArchive;

use super::{ExtractError, TextExtractor};

const DOCUMENT_PART: &str = "word/document.xml";
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Word variant. Reads the main document part of an OOXML package and emits
/// one line per paragraph.
///
/// `.doc` uploads go through here too: plenty of them are OOXML packages with
/// the old extension. A real OLE compound file is reported as `LegacyWord`.
#[derive(Debug, Default, Clone, Copy)]
pub struct WordExtractor;

impl TextExtractor for WordExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractError> {
        if bytes.starts_with(OLE_MAGIC) {
            return Err(ExtractError::LegacyWord);
        }
        if !bytes.starts_with(ZIP_MAGIC) {
            return Err(ExtractError::Container(
                "not a Word document package".to_string(),
            ));
        }

        let mut archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| ExtractError::Container(e.to_string()))?;
        let mut part = archive
            .by_name(DOCUMENT_PART)
            .map_err(|e| ExtractError::Container(format!("{DOCUMENT_PART}: {e}")))?;

        let mut xml = String::new();
        part.read_to_string(&mut xml)
            .map_err(|e| ExtractError::Container(format!("{DOCUMENT_PART}: {e}")))?;

        paragraphs_from_xml(&xml)
    }
}

/// Walks WordprocessingML and collects run text per paragraph.
///
/// Paragraphs nest when a text box (`w:txbxContent`) sits inside one, so open
/// paragraphs are kept on a stack and each is emitted when it closes. The
/// `mc:Fallback` branch of markup-compatibility blocks repeats the text box
/// content of `mc:Choice` and is skipped.
fn paragraphs_from_xml(xml: &str) -> Result<String, ExtractError> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs: Vec<String> = Vec::new();
    let mut open: Vec<String> = Vec::new();
    let mut run_depth = 0usize;
    let mut fallback_depth = 0usize;
    let mut in_text = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| ExtractError::Markup(e.to_string()))?;

        match event {
            Event::Start(e) if e.name().as_ref() == b"mc:Fallback" => fallback_depth += 1,
            Event::End(e) if e.name().as_ref() == b"mc:Fallback" => {
                fallback_depth = fallback_depth.saturating_sub(1)
            }
            _ if fallback_depth > 0 => {}
            Event::Start(e) => match e.name().as_ref() {
                b"w:p" => open.push(String::new()),
                b"w:r" => run_depth += 1,
                b"w:t" => in_text = true,
                _ => {}
            },
            Event::End(e) => match e.name().as_ref() {
                b"w:p" => {
                    if let Some(paragraph) = open.pop() {
                        paragraphs.push(paragraph);
                    }
                }
                b"w:r" => run_depth = run_depth.saturating_sub(1),
                b"w:t" => in_text = false,
                _ => {}
            },
            Event::Empty(e) => {
                let name = e.name();
                match (name.as_ref(), open.last_mut()) {
                    (b"w:p", _) => paragraphs.push(String::new()),
                    // Tab stops in `w:pPr/w:tabs` share the name; only run content counts.
                    (b"w:tab", Some(current)) if run_depth > 0 => current.push('\t'),
                    (b"w:br" | b"w:cr", Some(current)) if run_depth > 0 => current.push('\n'),
                    _ => {}
                }
            }
            Event::Text(t) if in_text => {
                let text = t
                    .unescape()
                    .map_err(|e| ExtractError::Markup(e.to_string()))?;
                if let Some(current) = open.last_mut() {
                    current.push_str(&text);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(join_paragraphs(paragraphs))
}

/// Joins paragraphs with newlines and drops the leading/trailing empties
/// Word inserts around section breaks.
fn join_paragraphs(paragraphs: Vec<String>) -> String {
    let lines: Vec<&str> = paragraphs.iter().map(|p| p.trim_end()).collect();
    let start = lines.iter().position(|l| !l.trim().is_empty());
    let end = lines.iter().rposition(|l| !l.trim().is_empty());
    match (start, end) {
        (Some(start), Some(end)) => lines[start..=end].join("\n"),
        _ => String::new(),
    }
}
