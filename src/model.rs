use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub const SCHEMA_VERSION: u32 = 1;

/// One line of `git log`, after noise filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commit {
    pub date_time: DateTime<FixedOffset>,
    pub short_hash: String,
    pub author_email: String,
}

impl Commit {
    /// Calendar day of the commit, taken in UTC.
    pub fn day(&self) -> NaiveDate {
        crate::util::day_of(&self.date_time)
    }
}

/// A calendar day in the reconstructed timeline.
///
/// Days that carry a commit are counted fresh; days without one ("shadow"
/// days) repeat the previous day's results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyCommit {
    pub date: NaiveDate,
    pub commit: Option<Commit>,
}

impl DailyCommit {
    pub fn snapshot(date: NaiveDate, commit: Commit) -> Self {
        Self { date, commit: Some(commit) }
    }

    pub fn shadow(date: NaiveDate) -> Self {
        Self { date, commit: None }
    }

    pub fn is_shadow(&self) -> bool {
        self.commit.is_none()
    }
}

/// Per-language counts reported by the line counter for one working tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageStats {
    pub language: String,
    pub file_count: u64,
    pub blank_lines: u64,
    pub comment_lines: u64,
    pub code_lines: u64,
}

/// Persisted row, keyed by `(date, project, language)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    #[serde(rename = "dateTime")]
    pub date: NaiveDate,
    pub project: String,
    pub language: String,
    pub file_count: u64,
    pub blank_lines: u64,
    pub comment_lines: u64,
    pub code_lines: u64,
}

impl Record {
    pub fn from_stats(date: NaiveDate, project: &str, stats: &LanguageStats) -> Self {
        Self {
            date,
            project: project.to_string(),
            language: stats.language.clone(),
            file_count: stats.file_count,
            blank_lines: stats.blank_lines,
            comment_lines: stats.comment_lines,
            code_lines: stats.code_lines,
        }
    }

    pub fn redated(&self, date: NaiveDate) -> Self {
        Self { date, ..self.clone() }
    }

    pub fn key(&self) -> (NaiveDate, &str, &str) {
        (self.date, &self.project, &self.language)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub project: String,
    pub backfilled_days: u64,
    pub counted_days: u64,
    pub shadow_days: u64,
    pub records_written: u64,
    pub first_day: Option<NaiveDate>,
    pub last_day: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncOutput {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub repository_path: String,
    pub since: Option<NaiveDate>,
    pub elapsed: String,
    pub summary: RunSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusOutput {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub project: String,
    pub last_day: Option<NaiveDate>,
    pub records: Vec<Record>,
}

/// Which count of a [`Record`] a time series is built from.
#[derive(clap::ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    #[default]
    Code,
    Comment,
    Blank,
    Files,
}

impl Metric {
    pub fn of(&self, record: &Record) -> u64 {
        match self {
            Metric::Code => record.code_lines,
            Metric::Comment => record.comment_lines,
            Metric::Blank => record.blank_lines,
            Metric::Files => record.file_count,
        }
    }
}

/// One language's values, one per day from `start_date` to `end_date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesData {
    pub language: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub date: Vec<NaiveDate>,
    pub data: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesDataset {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Sorted by language.
    pub data: Vec<TimeSeriesData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesOutput {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub project: Option<String>,
    pub metric: Metric,
    pub dataset: Option<TimeSeriesDataset>,
}
