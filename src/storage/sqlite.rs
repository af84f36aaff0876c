use super::{RecordBuffer, Storage};
use crate::error::{PulseError, Result};
use crate::model::{Record, SCHEMA_VERSION};
use chrono::NaiveDate;
use log::debug;
use rusqlite::{params, Connection, Row, ToSql};
use std::path::Path;

const SELECT_COLUMNS: &str =
    "SELECT dateTime, project, language, fileCount, blankLines, commentLines, codeLines FROM ClocRecords";

/// A relational store with a single `ClocRecords` table.
pub struct SqliteStorage {
    conn: Connection,
    buffer: RecordBuffer,
}

impl SqliteStorage {
    pub fn open<P: AsRef<Path>>(path: P, buffer: RecordBuffer) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        let mut storage = Self { conn, buffer };
        storage.initialize()?;
        Ok(storage)
    }

    fn initialize(&mut self) -> Result<()> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS ClocRecords (
                dateTime TEXT NOT NULL,
                project TEXT NOT NULL,
                language TEXT NOT NULL,
                fileCount INTEGER NOT NULL,
                blankLines INTEGER NOT NULL,
                commentLines INTEGER NOT NULL,
                codeLines INTEGER NOT NULL,
                PRIMARY KEY (dateTime, project, language)
            );
            CREATE INDEX IF NOT EXISTS idx_records_project ON ClocRecords(project, dateTime);
            ",
        )?;
        self.check_schema_version()?;
        Ok(())
    }

    fn check_schema_version(&mut self) -> Result<()> {
        let user_version: i64 = self
            .conn
            .query_row("PRAGMA user_version;", [], |row| row.get(0))?;

        if user_version == 0 {
            let set_stmt = format!("PRAGMA user_version = {SCHEMA_VERSION};");
            self.conn.execute_batch(&set_stmt)?;
        } else if user_version != SCHEMA_VERSION as i64 {
            return Err(PulseError::Persistence(format!(
                "Schema version mismatch: expected {}, found {}",
                SCHEMA_VERSION, user_version
            )));
        }

        Ok(())
    }

    fn flush(&mut self, batch: Vec<Record>) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }
        debug!("Flushing {} records to sqlite", batch.len());

        // dropping `tx` without commit rolls the whole batch back
        let tx = self.conn.transaction()?;
        {
            let mut insert_stmt = tx.prepare(
                "INSERT INTO ClocRecords (dateTime, project, language, fileCount, blankLines, commentLines, codeLines)
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )?;
            for r in &batch {
                insert_stmt
                    .execute(params![
                        r.date,
                        r.project,
                        r.language,
                        r.file_count,
                        r.blank_lines,
                        r.comment_lines,
                        r.code_lines
                    ])
                    .map_err(|e| duplicate_as_persistence(e, r))?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn query(&self, sql: &str, bind: &[&dyn ToSql]) -> Result<Vec<Record>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(bind, row_to_record)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}

fn duplicate_as_persistence(err: rusqlite::Error, record: &Record) -> PulseError {
    if err.sqlite_error_code() == Some(rusqlite::ErrorCode::ConstraintViolation) {
        return PulseError::Persistence(format!(
            "Duplicate record for {} / {} / {}",
            record.date, record.project, record.language
        ));
    }
    err.into()
}

fn row_to_record(row: &Row) -> rusqlite::Result<Record> {
    Ok(Record {
        date: row.get(0)?,
        project: row.get(1)?,
        language: row.get(2)?,
        file_count: row.get(3)?,
        blank_lines: row.get(4)?,
        comment_lines: row.get(5)?,
        code_lines: row.get(6)?,
    })
}

impl Storage for SqliteStorage {
    fn put_records(&mut self, records: Vec<Record>) -> Result<()> {
        match self.buffer.push(records) {
            Some(batch) => self.flush(batch),
            None => Ok(()),
        }
    }

    fn last_records(&self, project: &str) -> Result<Vec<Record>> {
        let last_day: Option<NaiveDate> = self.conn.query_row(
            "SELECT MAX(dateTime) FROM ClocRecords WHERE project = ?",
            params![project],
            |row| row.get(0),
        )?;
        let Some(last_day) = last_day else {
            return Ok(Vec::new());
        };

        self.query(
            &format!("{SELECT_COLUMNS} WHERE dateTime = ? AND project = ? ORDER BY language"),
            &[&last_day, &project],
        )
    }

    fn records(&self, project: Option<&str>) -> Result<Vec<Record>> {
        match project {
            Some(project) => self.query(
                &format!("{SELECT_COLUMNS} WHERE project = ? ORDER BY dateTime, project, language"),
                &[&project],
            ),
            None => self.query(
                &format!("{SELECT_COLUMNS} ORDER BY dateTime, project, language"),
                &[],
            ),
        }
    }

    fn finalize(&mut self) -> Result<()> {
        let batch = self.buffer.drain();
        self.flush(batch)
    }
}
