use super::{latest_day_of, RecordBuffer, Storage};
use crate::error::{PulseError, Result};
use crate::model::Record;
use log::debug;
use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// A single JSON file holding an array of every persisted record.
pub struct JsonStorage {
    path: PathBuf,
    buffer: RecordBuffer,
}

impl JsonStorage {
    /// A missing file is an empty store; it is created on the first flush.
    pub fn open<P: AsRef<Path>>(path: P, buffer: RecordBuffer) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        Ok(Self { path, buffer })
    }

    fn load(&self) -> Result<Vec<Record>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&content).map_err(|e| {
            PulseError::Persistence(format!("Failed to parse {}: {e}", self.path.display()))
        })
    }

    fn flush(&mut self, batch: Vec<Record>) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }
        let mut all = self.load()?;

        let mut keys: HashSet<_> = all.iter().map(|r| r.key()).collect();
        for record in &batch {
            if !keys.insert(record.key()) {
                return Err(PulseError::Persistence(format!(
                    "Duplicate record for {} / {} / {}",
                    record.date, record.project, record.language
                )));
            }
        }
        drop(keys);

        debug!("Flushing {} records to {}", batch.len(), self.path.display());
        all.extend(batch);

        // write-then-rename so a failed write never truncates the store
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec(&all)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl Storage for JsonStorage {
    fn put_records(&mut self, records: Vec<Record>) -> Result<()> {
        match self.buffer.push(records) {
            Some(batch) => self.flush(batch),
            None => Ok(()),
        }
    }

    fn last_records(&self, project: &str) -> Result<Vec<Record>> {
        let mut records = latest_day_of(self.records(Some(project))?);
        records.sort_by(|a, b| a.language.cmp(&b.language));
        Ok(records)
    }

    fn records(&self, project: Option<&str>) -> Result<Vec<Record>> {
        let mut records: Vec<Record> = self
            .load()?
            .into_iter()
            .filter(|r| project.is_none_or(|p| r.project == p))
            .collect();
        records.sort_by(|a, b| a.key().cmp(&b.key()));
        Ok(records)
    }

    fn finalize(&mut self) -> Result<()> {
        let batch = self.buffer.drain();
        self.flush(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::tests::{exercise_backend, exercise_duplicate_rollback, record};
    use crate::storage::StorageKind;

    #[test]
    fn shared_backend_behaviour() {
        exercise_backend(StorageKind::Json);
    }

    #[test]
    fn duplicate_batch_is_rejected_whole() {
        exercise_duplicate_rollback(StorageKind::Json);
    }

    #[test]
    fn file_is_a_plain_camel_case_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("data.json");
        let mut storage = JsonStorage::open(&path, RecordBuffer::new(10)).unwrap();
        storage.put_records(vec![record("2024-01-01", "demo", "Rust", 10)]).unwrap();
        assert!(!path.exists());
        storage.finalize().unwrap();

        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        let first = &value.as_array().unwrap()[0];
        assert_eq!(first["dateTime"], "2024-01-01");
        assert_eq!(first["codeLines"], 10);
        assert_eq!(first["fileCount"], 1);
    }

    #[test]
    fn corrupt_file_is_a_persistence_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        fs::write(&path, "{ not json").unwrap();
        let storage = JsonStorage::open(&path, RecordBuffer::default()).unwrap();
        assert!(matches!(storage.last_records("demo"), Err(PulseError::Persistence(_))));
    }
}
