use crate::cli::CommonArgs;
use crate::cloc::{Cloc, CountOptions};
use crate::config::Settings;
use crate::git::{parse_log, GitRepo, LogFilter, LOG_FORMAT};
use crate::history::{bucket_commits, last_persisted_day, reconcile, Orchestrator};
use crate::model::{RunSummary, SyncOutput, SCHEMA_VERSION};
use crate::storage::open_storage;
use crate::util::parse_day;
use anyhow::Context;
use chrono::{NaiveDate, Utc};
use console::style;
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

pub struct SyncArgs {
    pub repo: String,
    pub name: String,
    pub main_branch: Option<String>,
    pub cloc_list: Option<PathBuf>,
    pub cloc: Option<String>,
    pub since: Option<String>,
    pub exclude_dirs: Vec<String>,
    pub exclude_langs: Vec<String>,
    pub json: bool,
    pub progress: bool,
}

pub fn exec(common: CommonArgs, args: SyncArgs) -> anyhow::Result<()> {
    let started = Instant::now();
    let settings = Settings::load(&common).context("Failed to load configuration")?;

    fs::create_dir_all(&settings.workspace)
        .with_context(|| format!("Failed to create workspace {}", settings.workspace.display()))?;
    let workspace = fs::canonicalize(&settings.workspace)
        .with_context(|| format!("Failed to resolve workspace {}", settings.workspace.display()))?;

    let mut storage = open_storage(settings.storage, &settings.storage_path, settings.batch_size)
        .context("Failed to open record store")?;

    let main_branch = args.main_branch.as_deref().unwrap_or(&settings.main_branch);
    let repo = GitRepo::sync(&remote_location(&args.repo), &args.name, &workspace, main_branch)
        .with_context(|| format!("Failed to prepare working copy for {}", args.name))?;

    let last = storage
        .last_records(&args.name)
        .context("Failed to read the last recorded day")?;
    let since = resolve_since(last_persisted_day(&last), args.since.as_deref())?;
    debug!("Collecting history of {} since {:?}", args.name, since);

    let raw = repo.log(LOG_FORMAT, since).context("Failed to read git log")?;
    let filter = LogFilter::new(settings.noise_patterns.clone()).with_since(since);
    let commits = parse_log(&raw, &filter).context("Failed to parse git log")?;
    info!("{} commit(s) to consider for {}", commits.len(), args.name);

    let reconciled = reconcile(&last, bucket_commits(&commits));

    let exclude_dirs = flag_or_file(args.exclude_dirs, settings.exclude_dirs);
    let exclude_langs = flag_or_file(args.exclude_langs, settings.exclude_langs);
    let list_file = match args.cloc_list {
        Some(path) => Some(
            fs::canonicalize(&path).with_context(|| format!("Cannot find cloc list {}", path.display()))?,
        ),
        None => None,
    };
    let counter = Cloc::new(
        args.cloc.unwrap_or(settings.cloc),
        CountOptions {
            list_file,
            exclude_dirs,
            exclude_langs,
        },
    );

    let summary = Orchestrator::new(&repo, &counter, storage.as_mut(), &args.name)
        .with_progress(args.progress && !args.json && !common.quiet)
        .run(reconciled, last)
        .with_context(|| format!("Failed to record history of {}", args.name))?;
    storage.finalize().context("Failed to flush record store")?;

    let elapsed = humantime::format_duration(std::time::Duration::from_millis(
        started.elapsed().as_millis() as u64,
    ))
    .to_string();

    if args.json {
        output_json(&repo, since, elapsed, summary)?;
    } else {
        output_text(&summary, &elapsed);
    }
    Ok(())
}

/// The last recorded day wins over `--since`; the flag only seeds a first run.
fn resolve_since(last_day: Option<NaiveDate>, flag: Option<&str>) -> crate::error::Result<Option<NaiveDate>> {
    match (last_day, flag) {
        (Some(day), _) => Ok(Some(day)),
        (None, Some(raw)) => parse_day(raw).map(Some),
        (None, None) => Ok(None),
    }
}

/// A list given on the command line replaces the configured one.
fn flag_or_file(flag: Vec<String>, file: Vec<String>) -> Vec<String> {
    if flag.is_empty() {
        file
    } else {
        flag
    }
}

/// Local paths are made absolute since `git clone` runs inside the workspace.
fn remote_location(repo: &str) -> String {
    let path = Path::new(repo);
    if path.exists() {
        if let Ok(absolute) = fs::canonicalize(path) {
            return absolute.to_string_lossy().to_string();
        }
    }
    repo.to_string()
}

fn output_json(repo: &GitRepo, since: Option<NaiveDate>, elapsed: String, summary: RunSummary) -> anyhow::Result<()> {
    let output = SyncOutput {
        version: SCHEMA_VERSION,
        generated_at: Utc::now(),
        repository_path: repo.path().to_string_lossy().to_string(),
        since,
        elapsed,
        summary,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn output_text(summary: &RunSummary, elapsed: &str) {
    let range = match (summary.first_day, summary.last_day) {
        (Some(first), Some(last)) => format!("{first} .. {last}"),
        _ => "nothing new".to_string(),
    };
    println!("{} {}", style(&summary.project).bold(), style(range).cyan());
    println!("  {:<16} {:>8}", "counted days", summary.counted_days);
    println!("  {:<16} {:>8}", "shadow days", summary.shadow_days);
    println!("  {:<16} {:>8}", "backfilled days", summary.backfilled_days);
    println!("  {:<16} {:>8}", "records", summary.records_written);
    println!("  {:<16} {:>8}", "elapsed", elapsed);
}
