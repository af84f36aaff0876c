//! The external line counter.

use crate::error::{PulseError, Result};
use crate::model::LanguageStats;
use crate::process;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

pub const DEFAULT_CLOC: &str = "cloc";

/// Keys in cloc's JSON report that are not languages.
const PSEUDO_LANGUAGES: &[&str] = &["header", "SUM"];

pub trait Counter {
    /// Count the working tree rooted at `dir`, one entry per language.
    fn count(&self, dir: &Path) -> Result<Vec<LanguageStats>>;
}

#[derive(Debug, Clone, Default)]
pub struct CountOptions {
    /// File listing the paths to count instead of the whole tree.
    pub list_file: Option<PathBuf>,
    pub exclude_dirs: Vec<String>,
    pub exclude_langs: Vec<String>,
}

pub struct Cloc {
    binary: String,
    options: CountOptions,
}

impl Cloc {
    pub fn new(binary: impl Into<String>, options: CountOptions) -> Self {
        Self {
            binary: binary.into(),
            options,
        }
    }

    fn args(&self) -> Vec<String> {
        let mut args = vec!["--json".to_string(), "--quiet".to_string()];
        if !self.options.exclude_dirs.is_empty() {
            args.push(format!("--exclude-dir={}", self.options.exclude_dirs.join(",")));
        }
        if !self.options.exclude_langs.is_empty() {
            args.push(format!("--exclude-lang={}", self.options.exclude_langs.join(",")));
        }
        match &self.options.list_file {
            Some(list) => args.push(format!("--list-file={}", list.display())),
            None => args.push(".".to_string()),
        }
        args
    }
}

impl Counter for Cloc {
    fn count(&self, dir: &Path) -> Result<Vec<LanguageStats>> {
        let stdout = process::run(&self.binary, self.args(), dir).into_stdout(&self.binary)?;
        parse_cloc_json(&stdout)
    }
}

#[derive(Deserialize)]
struct ClocEntry {
    #[serde(rename = "nFiles")]
    n_files: u64,
    blank: u64,
    comment: u64,
    code: u64,
}

/// Parse cloc's `--json` report. An empty report (nothing counted) has no languages.
pub fn parse_cloc_json(raw: &str) -> Result<Vec<LanguageStats>> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    let report: Map<String, Value> =
        serde_json::from_str(raw).map_err(|e| PulseError::Parse(format!("cloc output: {e}")))?;

    let mut stats = Vec::with_capacity(report.len());
    for (language, value) in report {
        if PSEUDO_LANGUAGES.contains(&language.as_str()) {
            continue;
        }
        let entry: ClocEntry = serde_json::from_value(value)
            .map_err(|e| PulseError::Parse(format!("cloc entry for {language}: {e}")))?;
        stats.push(LanguageStats {
            language,
            file_count: entry.n_files,
            blank_lines: entry.blank,
            comment_lines: entry.comment,
            code_lines: entry.code,
        });
    }
    stats.sort_by(|a, b| a.language.cmp(&b.language));
    Ok(stats)
}
