use crate::model::Metric;
use crate::storage::StorageKind;
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pulse")]
#[command(about = "Per-day, per-language code size history for git repositories")]
#[command(version)]
pub struct Cli {
    #[clap(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Clone, Debug, Default)]
pub struct CommonArgs {
    #[arg(long, global = true, help = "Directory holding working copies and the default store")]
    pub workspace: Option<PathBuf>,

    #[arg(long, global = true, value_enum, help = "Storage backend [default: sqlite]")]
    pub storage: Option<StorageKind>,

    #[arg(long, global = true, help = "Path to the record store")]
    pub storage_path: Option<PathBuf>,

    #[arg(long, global = true, help = "Path to a pulse.toml configuration file")]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true, action = clap::ArgAction::Count, help = "More log output (-v debug, -vv trace)")]
    pub verbose: u8,

    #[arg(short, long, global = true, help = "Only log warnings and errors")]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Clone or update a repository and record every day since the last run.
    Sync {
        #[arg(help = "Remote URL or local path of the repository")]
        repo: String,

        #[arg(long, help = "Project name, also the working copy directory")]
        name: String,

        #[arg(long, help = "Branch restored after each run [default: main]")]
        main_branch: Option<String>,

        #[arg(long, help = "File listing the paths to count")]
        cloc_list: Option<PathBuf>,

        #[arg(long, help = "Line counter binary [default: $CLOC or cloc]")]
        cloc: Option<String>,

        #[arg(long, help = "First day to record when nothing is stored (RFC3339, YYYY-MM-DD, or 'N days ago')")]
        since: Option<String>,

        #[arg(long, value_delimiter = ',', help = "Directories the counter skips")]
        exclude_dir: Vec<String>,

        #[arg(long, value_delimiter = ',', help = "Languages the counter skips")]
        exclude_lang: Vec<String>,

        #[arg(long, help = "Output the run summary as JSON")]
        json: bool,

        #[arg(long, help = "Hide the progress bar")]
        no_progress: bool,
    },
    /// Print per-language daily time series built from stored records.
    Series {
        #[arg(long, help = "Only this project")]
        project: Option<String>,

        #[arg(long, value_enum, default_value_t = Metric::Code, help = "Which count to chart")]
        metric: Metric,

        #[arg(long, help = "First day of the window")]
        from: Option<String>,

        #[arg(long, allow_negative_numbers = true, help = "Days after --from to include")]
        days: Option<i64>,

        #[arg(long, help = "Output as JSON")]
        json: bool,

        #[arg(long, help = "Output as NDJSON, one language per line")]
        ndjson: bool,
    },
    /// Show the latest recorded day of a project.
    Status {
        #[arg(long, help = "Project name")]
        project: String,

        #[arg(long, help = "Output as JSON")]
        json: bool,
    },
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn execute(self) -> Result<()> {
        match self.command {
            Commands::Sync {
                repo,
                name,
                main_branch,
                cloc_list,
                cloc,
                since,
                exclude_dir,
                exclude_lang,
                json,
                no_progress,
            } => crate::sync::exec(
                self.common,
                crate::sync::SyncArgs {
                    repo,
                    name,
                    main_branch,
                    cloc_list,
                    cloc,
                    since,
                    exclude_dirs: exclude_dir,
                    exclude_langs: exclude_lang,
                    json,
                    progress: !no_progress,
                },
            ),
            Commands::Series {
                project,
                metric,
                from,
                days,
                json,
                ndjson,
            } => crate::series::exec(self.common, project, metric, from, days, json, ndjson),
            Commands::Status { project, json } => crate::status::exec(self.common, project, json),
        }
    }
}
