//! Settings from an optional `pulse.toml`, overridden by command-line flags.

use crate::cli::CommonArgs;
use crate::cloc::DEFAULT_CLOC;
use crate::error::{PulseError, Result};
use crate::git::DEFAULT_NOISE_PATTERNS;
use crate::storage::{StorageKind, DEFAULT_BATCH_SIZE};
use log::{debug, info};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "pulse.toml";
pub const DEFAULT_MAIN_BRANCH: &str = "main";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub workspace: Option<PathBuf>,
    pub storage: Option<StorageKind>,
    pub storage_path: Option<PathBuf>,
    pub cloc: Option<String>,
    pub main_branch: Option<String>,
    pub batch_size: Option<usize>,
    pub exclude_dirs: Vec<String>,
    pub exclude_langs: Vec<String>,
    pub noise_patterns: Option<Vec<String>>,
}

/// Candidate config files, most specific first.
pub fn discover_config_files(workspace: Option<&Path>) -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(CONFIG_FILE_NAME)];
    if let Some(workspace) = workspace {
        paths.push(workspace.join(CONFIG_FILE_NAME));
    }
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("pulse").join("config.toml"));
    }
    paths
}

impl FileConfig {
    /// Load `explicit` if given (it must exist), otherwise the first discovered file.
    pub fn load(explicit: Option<&Path>, workspace: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from_file(path);
        }

        for path in discover_config_files(workspace) {
            debug!("Looking for configuration at {}", path.display());
            if path.is_file() {
                info!("Loading configuration from {}", path.display());
                return Self::load_from_file(&path);
            }
        }

        debug!("No configuration file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| PulseError::Config(format!("Failed to read {}: {e}", path.display())))?;
        Self::parse(&content).map_err(|e| PulseError::Config(format!("{}: {e}", path.display())))
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| PulseError::Config(e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub workspace: PathBuf,
    pub storage: StorageKind,
    pub storage_path: PathBuf,
    pub cloc: String,
    pub main_branch: String,
    pub batch_size: usize,
    pub exclude_dirs: Vec<String>,
    pub exclude_langs: Vec<String>,
    pub noise_patterns: Vec<String>,
}

impl Settings {
    pub fn load(common: &CommonArgs) -> Result<Self> {
        let file = FileConfig::load(common.config.as_deref(), common.workspace.as_deref())?;
        Self::resolve(common, file, std::env::var("CLOC").ok())
    }

    /// Flags win over the file; `cloc_env` (the `CLOC` variable) only fills
    /// in when the file does not name a counter.
    pub fn resolve(common: &CommonArgs, file: FileConfig, cloc_env: Option<String>) -> Result<Self> {
        let workspace = common
            .workspace
            .clone()
            .or(file.workspace)
            .ok_or_else(|| {
                PulseError::Config(format!(
                    "No workspace: pass --workspace or set `workspace` in {CONFIG_FILE_NAME}"
                ))
            })?;

        let storage = common.storage.or(file.storage).unwrap_or(StorageKind::Sqlite);
        let storage_path = common
            .storage_path
            .clone()
            .or(file.storage_path)
            .unwrap_or_else(|| workspace.join(storage.default_file_name()));

        let batch_size = file.batch_size.unwrap_or(DEFAULT_BATCH_SIZE);
        if batch_size == 0 {
            return Err(PulseError::Config("batch_size must be at least 1".to_string()));
        }

        Ok(Self {
            workspace,
            storage,
            storage_path,
            cloc: file.cloc.or(cloc_env).unwrap_or_else(|| DEFAULT_CLOC.to_string()),
            main_branch: file.main_branch.unwrap_or_else(|| DEFAULT_MAIN_BRANCH.to_string()),
            batch_size,
            exclude_dirs: file.exclude_dirs,
            exclude_langs: file.exclude_langs,
            noise_patterns: file
                .noise_patterns
                .unwrap_or_else(|| DEFAULT_NOISE_PATTERNS.iter().map(|p| p.to_string()).collect()),
        })
    }
}
