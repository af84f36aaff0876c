//! Persistence of [`Record`]s.
//!
//! Both backends buffer writes in a [`RecordBuffer`] and commit each full
//! batch as a single all-or-nothing unit.

pub mod buffer;
pub mod json;
pub mod sqlite;

pub use buffer::{RecordBuffer, DEFAULT_BATCH_SIZE};
pub use json::JsonStorage;
pub use sqlite::SqliteStorage;

use crate::error::Result;
use crate::model::Record;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub trait Storage {
    /// Queue `records`; a full buffer is flushed before returning.
    fn put_records(&mut self, records: Vec<Record>) -> Result<()>;

    /// The record set of the latest persisted day for `project`, empty if none.
    fn last_records(&self, project: &str) -> Result<Vec<Record>>;

    /// All persisted records, optionally for one project, sorted by key.
    fn records(&self, project: Option<&str>) -> Result<Vec<Record>>;

    /// Flush whatever is still buffered.
    fn finalize(&mut self) -> Result<()>;
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    Json,
    Sqlite,
}

impl StorageKind {
    pub fn default_file_name(&self) -> &'static str {
        match self {
            StorageKind::Json => "data.json",
            StorageKind::Sqlite => "data.db",
        }
    }
}

pub fn open_storage(kind: StorageKind, path: &Path, batch_size: usize) -> Result<Box<dyn Storage>> {
    let buffer = RecordBuffer::new(batch_size);
    Ok(match kind {
        StorageKind::Json => Box::new(JsonStorage::open(path, buffer)?),
        StorageKind::Sqlite => Box::new(SqliteStorage::open(path, buffer)?),
    })
}

fn latest_day_of(records: Vec<Record>) -> Vec<Record> {
    let Some(last_day) = records.iter().map(|r| r.date).max() else {
        return Vec::new();
    };
    records.into_iter().filter(|r| r.date == last_day).collect()
}
