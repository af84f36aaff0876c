//! Turns raw `git log` output into an ascending list of [`Commit`]s.

use crate::error::{PulseError, Result};
use crate::model::Commit;
use chrono::{DateTime, NaiveDate};

/// Strict ISO author date, abbreviated hash and author email, space separated.
pub const LOG_FORMAT: &str = "%aI %h %ae";

/// Author emails containing any of these are bots or anonymised no-reply addresses.
pub const DEFAULT_NOISE_PATTERNS: &[&str] = &["users.noreply.github.com", "noreply@github.com", "[bot]@"];

#[derive(Debug, Clone)]
pub struct LogFilter {
    pub since: Option<NaiveDate>,
    pub noise_patterns: Vec<String>,
}

impl LogFilter {
    pub fn new(noise_patterns: Vec<String>) -> Self {
        Self {
            since: None,
            noise_patterns: noise_patterns.into_iter().map(|p| p.to_lowercase()).collect(),
        }
    }

    pub fn with_since(mut self, since: Option<NaiveDate>) -> Self {
        self.since = since;
        self
    }

    fn is_noise(&self, email: &str) -> bool {
        let email = email.to_lowercase();
        self.noise_patterns.iter().any(|p| email.contains(p.as_str()))
    }

    fn keeps(&self, commit: &Commit) -> bool {
        if self.is_noise(&commit.author_email) {
            return false;
        }
        match self.since {
            Some(since) => commit.day() >= since,
            None => true,
        }
    }
}

impl Default for LogFilter {
    fn default() -> Self {
        Self::new(DEFAULT_NOISE_PATTERNS.iter().map(|p| p.to_string()).collect())
    }
}

/// Parse `raw` (one commit per line in [`LOG_FORMAT`]), drop filtered commits
/// and sort ascending by timestamp. Commits with equal timestamps keep their
/// log order.
pub fn parse_log(raw: &str, filter: &LogFilter) -> Result<Vec<Commit>> {
    let mut commits = Vec::new();
    for (index, line) in raw.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let commit = parse_line(line)
            .map_err(|e| PulseError::Parse(format!("git log line {}: {e}", index + 1)))?;
        if filter.keeps(&commit) {
            commits.push(commit);
        }
    }
    commits.sort_by_key(|c| c.date_time);
    Ok(commits)
}

fn parse_line(line: &str) -> std::result::Result<Commit, String> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let [date, hash, email] = fields.as_slice() else {
        return Err(format!("expected 3 fields, found {} in '{line}'", fields.len()));
    };
    let date_time = DateTime::parse_from_rfc3339(date).map_err(|e| format!("bad timestamp '{date}': {e}"))?;

    Ok(Commit {
        date_time,
        short_hash: hash.to_string(),
        author_email: email.to_string(),
    })
}
