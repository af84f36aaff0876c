use crate::cli::CommonArgs;
use crate::config::Settings;
use crate::history::last_persisted_day;
use crate::model::{Record, StatusOutput, SCHEMA_VERSION};
use crate::storage::open_storage;
use anyhow::Context;
use chrono::Utc;
use console::style;

pub fn exec(common: CommonArgs, project: String, json: bool) -> anyhow::Result<()> {
    let settings = Settings::load(&common).context("Failed to load configuration")?;
    let storage = open_storage(settings.storage, &settings.storage_path, settings.batch_size)
        .context("Failed to open record store")?;
    let records = storage
        .last_records(&project)
        .with_context(|| format!("Failed to read the last recorded day of {project}"))?;

    if json {
        let output = StatusOutput {
            version: SCHEMA_VERSION,
            generated_at: Utc::now(),
            last_day: last_persisted_day(&records),
            project,
            records,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        output_table(&project, &records);
    }
    Ok(())
}

fn output_table(project: &str, records: &[Record]) {
    let Some(day) = last_persisted_day(records) else {
        println!("{} has no recorded days", style(project).bold());
        return;
    };

    println!("{} last recorded {}", style(project).bold(), style(day).cyan());
    println!(
        "{:<24} {:>8} {:>10} {:>10} {:>10}",
        style("Language").bold(),
        style("Files").bold(),
        style("Blank").bold(),
        style("Comment").bold(),
        style("Code").bold()
    );
    println!("{}", "─".repeat(66));
    for r in records {
        println!(
            "{:<24} {:>8} {:>10} {:>10} {:>10}",
            r.language, r.file_count, r.blank_lines, r.comment_lines, r.code_lines
        );
    }
}
