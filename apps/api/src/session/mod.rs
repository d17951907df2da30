//! Per-session store of processed resumes.
//!
//! Append-only map from file name to `ExtractedRecord`, kept in upload order,
//! plus a "currently selected" pointer for the viewer. Lives in memory for
//! one session and is dropped when the session ends.

pub mod handlers;
pub mod registry;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::information::ExtractedRecord;
use crate::ingest::Notice;

pub use registry::SessionRegistry;

#[derive(Debug)]
pub struct SessionStore {
    records: HashMap<String, Arc<ExtractedRecord>>,
    order: Vec<String>,
    selected: Option<String>,
    last_notices: Vec<Notice>,
    created_at: DateTime<Utc>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            records: HashMap::new(),
            order: Vec::new(),
            selected: None,
            last_notices: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// True if `file_name` was already processed in this session.
    pub fn has(&self, file_name: &str) -> bool {
        self.records.contains_key(file_name)
    }

    /// Inserts a record. There is no update path: returns `false` and leaves
    /// the existing record untouched if the name is already present.
    pub fn put(&mut self, file_name: impl Into<String>, record: ExtractedRecord) -> bool {
        let file_name = file_name.into();
        if self.has(&file_name) {
            return false;
        }
        self.order.push(file_name.clone());
        self.records.insert(file_name, Arc::new(record));
        true
    }

    /// Points the viewer at `file_name`. No-op unless the name is present.
    pub fn select(&mut self, file_name: &str) -> bool {
        if !self.has(file_name) {
            return false;
        }
        self.selected = Some(file_name.to_string());
        true
    }

    /// The explicit selection, else the first processed file.
    pub fn selected(&self) -> Option<&str> {
        self.selected
            .as_deref()
            .or_else(|| self.order.first().map(String::as_str))
    }

    pub fn selected_record(&self) -> Option<(&str, Arc<ExtractedRecord>)> {
        let name = self.selected()?;
        self.get(name).map(|record| (name, record))
    }

    pub fn get(&self, file_name: &str) -> Option<Arc<ExtractedRecord>> {
        self.records.get(file_name).cloned()
    }

    /// Processed file names in upload order.
    pub fn file_names(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn set_last_notices(&mut self, notices: Vec<Notice>) {
        self.last_notices = notices;
    }

    /// Notices from the most recent upload event.
    pub fn last_notices(&self) -> &[Notice] {
        &self.last_notices
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
