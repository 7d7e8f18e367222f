//! Recent-documents cache shown on the landing view.
//!
//! The file keeps two flat lists, `savedSummaries` and `savedDocuments`,
//! plus a `schemaVersion`. Files written before the version field existed
//! are read as version 1. Entries that fail validation are dropped on load
//! instead of failing the whole file.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use lexsum_core::{ResultPayload, SessionRecord, TabKind};
use lexsum_logging::{lexsum_debug, lexsum_warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::persist::{DataDir, PersistError};

pub const RECENT_FILENAME: &str = "recent_documents.json";
pub const SCHEMA_VERSION: u32 = 1;

const SUMMARY_EXCERPT_CHARS: usize = 280;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentDocumentRecord {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub parties: String,
    #[serde(default)]
    pub jurisdiction: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

impl RecentDocumentRecord {
    pub fn validate(&self) -> Result<(), RecentStoreError> {
        if self.title.trim().is_empty() {
            return Err(RecentStoreError::InvalidRecord {
                id: self.id,
                reason: "title is empty".to_string(),
            });
        }
        if self.request_id.as_deref().is_some_and(|id| id.trim().is_empty()) {
            return Err(RecentStoreError::InvalidRecord {
                id: self.id,
                reason: "request id is blank".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecentList {
    Summaries,
    Documents,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecentDocuments {
    pub summaries: Vec<RecentDocumentRecord>,
    pub documents: Vec<RecentDocumentRecord>,
}

impl RecentDocuments {
    pub fn list(&self, list: RecentList) -> &[RecentDocumentRecord] {
        match list {
            RecentList::Summaries => &self.summaries,
            RecentList::Documents => &self.documents,
        }
    }

    fn list_mut(&mut self, list: RecentList) -> &mut Vec<RecentDocumentRecord> {
        match list {
            RecentList::Summaries => &mut self.summaries,
            RecentList::Documents => &mut self.documents,
        }
    }

    fn next_id(&self) -> u64 {
        self.summaries
            .iter()
            .chain(self.documents.iter())
            .map(|record| record.id)
            .max()
            .map_or(1, |max| max + 1)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RecentStoreError {
    #[error(transparent)]
    Persist(#[from] PersistError),
    #[error("recent documents file is corrupt: {0}")]
    Corrupt(String),
    #[error("recent documents file has schema version {found}; newest supported is {supported}")]
    UnsupportedSchema { found: u32, supported: u32 },
    #[error("invalid record {id}: {reason}")]
    InvalidRecord { id: u64, reason: String },
    #[error("failed to serialize recent documents: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredFile {
    #[serde(rename = "schemaVersion", default = "legacy_schema_version")]
    schema_version: u32,
    #[serde(rename = "savedSummaries", default)]
    saved_summaries: Vec<Value>,
    #[serde(rename = "savedDocuments", default)]
    saved_documents: Vec<Value>,
}

fn legacy_schema_version() -> u32 {
    1
}

pub type Clock = Arc<dyn Fn() -> String + Send + Sync>;

/// Typed repository over the recent-documents file.
#[derive(Clone)]
pub struct RecentDocumentStore {
    data: DataDir,
    clock: Clock,
}

impl fmt::Debug for RecentDocumentStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecentDocumentStore")
            .field("dir", &self.data.path())
            .finish()
    }
}

impl RecentDocumentStore {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            data: DataDir::new(dir),
            clock: Arc::new(String::new),
        }
    }

    /// Source of the `date` stamped on records written by `record_session`.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn load(&self) -> Result<RecentDocuments, RecentStoreError> {
        let Some(text) = self.data.read(RECENT_FILENAME)? else {
            return Ok(RecentDocuments::default());
        };
        let stored: StoredFile =
            serde_json::from_str(&text).map_err(|err| RecentStoreError::Corrupt(err.to_string()))?;
        if stored.schema_version > SCHEMA_VERSION {
            return Err(RecentStoreError::UnsupportedSchema {
                found: stored.schema_version,
                supported: SCHEMA_VERSION,
            });
        }
        Ok(RecentDocuments {
            summaries: parse_entries(stored.saved_summaries, "savedSummaries"),
            documents: parse_entries(stored.saved_documents, "savedDocuments"),
        })
    }

    pub fn list(&self, list: RecentList) -> Result<Vec<RecentDocumentRecord>, RecentStoreError> {
        Ok(self.load()?.list(list).to_vec())
    }

    /// Inserts a record at the front of `list`, replacing any entry with the same id.
    pub fn upsert(
        &self,
        list: RecentList,
        record: RecentDocumentRecord,
    ) -> Result<(), RecentStoreError> {
        record.validate()?;
        let mut docs = self.load()?;
        let entries = docs.list_mut(list);
        entries.retain(|existing| existing.id != record.id);
        entries.insert(0, record);
        self.save(&docs)
    }

    /// Returns whether a record was removed.
    pub fn remove(&self, list: RecentList, id: u64) -> Result<bool, RecentStoreError> {
        let mut docs = self.load()?;
        let entries = docs.list_mut(list);
        let before = entries.len();
        entries.retain(|existing| existing.id != id);
        if entries.len() == before {
            return Ok(false);
        }
        self.save(&docs)?;
        Ok(true)
    }

    /// Writes or updates the summary entry for a session, keyed by request id.
    pub fn record_session(
        &self,
        session: &SessionRecord,
        payload: Option<&ResultPayload>,
    ) -> Result<RecentDocumentRecord, RecentStoreError> {
        let mut docs = self.load()?;
        let next_id = docs.next_id();
        let date = (self.clock)();
        let summaries = docs.list_mut(RecentList::Summaries);

        let position = summaries
            .iter()
            .position(|existing| existing.request_id.as_deref() == Some(session.request_id.as_str()));
        let mut record = match position {
            Some(index) => summaries.remove(index),
            None => RecentDocumentRecord {
                id: next_id,
                title: title_from_file_name(&session.file_name),
                summary: String::new(),
                parties: String::new(),
                jurisdiction: String::new(),
                date: String::new(),
                status: String::new(),
                request_id: Some(session.request_id.clone()),
                file_name: Some(session.file_name.clone()),
            },
        };
        record.status = session.status.label().to_string();
        record.date = date;
        if let Some(payload) = payload {
            apply_payload(&mut record, payload);
        }
        record.validate()?;
        summaries.insert(0, record.clone());
        self.save(&docs)?;
        lexsum_debug!(
            "recorded session {} request_id={} status={}",
            session.session,
            session.request_id,
            record.status
        );
        Ok(record)
    }

    fn save(&self, docs: &RecentDocuments) -> Result<(), RecentStoreError> {
        let stored = StoredFile {
            schema_version: SCHEMA_VERSION,
            saved_summaries: to_values(&docs.summaries)?,
            saved_documents: to_values(&docs.documents)?,
        };
        let text = serde_json::to_string_pretty(&stored)?;
        self.data.write(RECENT_FILENAME, &text)?;
        Ok(())
    }
}

fn parse_entries(values: Vec<Value>, list_name: &str) -> Vec<RecentDocumentRecord> {
    values
        .into_iter()
        .filter_map(|value| {
            let record = match serde_json::from_value::<RecentDocumentRecord>(value) {
                Ok(record) => record,
                Err(err) => {
                    lexsum_warn!("dropping unreadable entry in {}: {}", list_name, err);
                    return None;
                }
            };
            match record.validate() {
                Ok(()) => Some(record),
                Err(err) => {
                    lexsum_warn!("dropping entry in {}: {}", list_name, err);
                    None
                }
            }
        })
        .collect()
}

fn to_values(records: &[RecentDocumentRecord]) -> Result<Vec<Value>, serde_json::Error> {
    records.iter().map(serde_json::to_value).collect()
}

fn title_from_file_name(file_name: &str) -> String {
    let stem = match file_name.rsplit_once('.') {
        Some((stem, _)) if !stem.trim().is_empty() => stem,
        _ => file_name,
    };
    let title = stem.trim();
    if title.is_empty() {
        "Untitled document".to_string()
    } else {
        title.to_string()
    }
}

fn apply_payload(record: &mut RecentDocumentRecord, payload: &ResultPayload) {
    let Some(summary) = payload.slice(TabKind::Summary) else {
        return;
    };
    if let Some(text) = summary_text(summary) {
        record.summary = excerpt(text, SUMMARY_EXCERPT_CHARS);
    }
    if let Some(parties) = summary.get("parties").and_then(parties_text) {
        record.parties = parties;
    }
    if let Some(jurisdiction) = ["jurisdiction", "governing_law"]
        .iter()
        .find_map(|key| summary.get(*key).and_then(Value::as_str))
    {
        record.jurisdiction = jurisdiction.to_string();
    }
}

fn summary_text(summary: &Value) -> Option<&str> {
    if let Some(text) = summary.as_str() {
        return Some(text);
    }
    ["summary", "executive_summary", "overview"]
        .iter()
        .find_map(|key| summary.get(*key).and_then(Value::as_str))
}

fn parties_text(parties: &Value) -> Option<String> {
    match parties {
        Value::String(text) => Some(text.clone()),
        Value::Array(items) => {
            let names: Vec<&str> = items
                .iter()
                .filter_map(|item| {
                    item.as_str()
                        .or_else(|| item.get("name").and_then(Value::as_str))
                })
                .collect();
            (!names.is_empty()).then(|| names.join(", "))
        }
        _ => None,
    }
}

fn excerpt(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}…", text[..cut].trim_end()),
        None => text.to_string(),
    }
}
