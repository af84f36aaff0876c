use anyhow::{Context, Result};
use env_logger::{Builder, Env};
use log::LevelFilter;

/// Level used when `RUST_LOG` is not set.
pub fn default_level(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Warn;
    }
    match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Log to stderr so stdout stays clean for JSON output.
pub fn init(verbose: u8, quiet: bool) -> Result<()> {
    let level = default_level(verbose, quiet);
    Builder::from_env(Env::default().default_filter_or(level.as_str()))
        .format_timestamp_secs()
        .format_target(false)
        .try_init()
        .context("Failed to initialize logger")
}
