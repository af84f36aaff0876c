use crate::cli::CommonArgs;
use crate::config::Settings;
use crate::model::{Metric, SeriesOutput, TimeSeriesDataset, SCHEMA_VERSION};
use crate::storage::open_storage;
use crate::timeseries::to_dataset;
use crate::util::{days_between, parse_day};
use anyhow::Context;
use chrono::{NaiveDate, Utc};
use console::style;

pub fn exec(
    common: CommonArgs,
    project: Option<String>,
    metric: Metric,
    from: Option<String>,
    days: Option<i64>,
    json: bool,
    ndjson: bool,
) -> anyhow::Result<()> {
    let settings = Settings::load(&common).context("Failed to load configuration")?;
    let storage = open_storage(settings.storage, &settings.storage_path, settings.batch_size)
        .context("Failed to open record store")?;

    let records = storage
        .records(project.as_deref())
        .context("Failed to read records")?;
    let from = from.as_deref().map(parse_day).transpose()?;

    let dataset = match to_dataset(&records, metric) {
        Some(dataset) if from.is_some() || days.is_some() => Some(
            window(&dataset, from, days).context("Invalid series window")?,
        ),
        other => other,
    };

    if json {
        output_json(project, metric, dataset)?;
    } else if ndjson {
        output_ndjson(dataset.as_ref())?;
    } else {
        output_table(dataset.as_ref(), metric);
    }
    Ok(())
}

/// Missing bounds default to the dataset's own start and length.
fn window(
    dataset: &TimeSeriesDataset,
    from: Option<NaiveDate>,
    days: Option<i64>,
) -> crate::error::Result<TimeSeriesDataset> {
    let start = from.unwrap_or(dataset.start_date);
    let count = days.unwrap_or_else(|| days_between(start, dataset.end_date).max(0));
    dataset.slice(start, count)
}

fn output_json(project: Option<String>, metric: Metric, dataset: Option<TimeSeriesDataset>) -> anyhow::Result<()> {
    let output = SeriesOutput {
        version: SCHEMA_VERSION,
        generated_at: Utc::now(),
        project,
        metric,
        dataset,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn output_ndjson(dataset: Option<&TimeSeriesDataset>) -> anyhow::Result<()> {
    if let Some(dataset) = dataset {
        for series in &dataset.data {
            println!("{}", serde_json::to_string(series)?);
        }
    }
    Ok(())
}

fn output_table(dataset: Option<&TimeSeriesDataset>, metric: Metric) {
    let Some(dataset) = dataset else {
        println!("No data to display");
        return;
    };

    println!(
        "{} {} .. {}",
        style(format!("{metric:?}").to_lowercase()).bold(),
        dataset.start_date,
        dataset.end_date
    );
    println!(
        "{:<24} {:>12} {:>12} {:>10} {:>10} {:>6}",
        style("Language").bold(),
        style("From").bold(),
        style("To").bold(),
        style("First").bold(),
        style("Last").bold(),
        style("Days").bold()
    );
    println!("{}", "─".repeat(79));
    for series in &dataset.data {
        let (Some(first), Some(last)) = (series.data.first(), series.data.last()) else {
            println!("{:<24} {:>12}", series.language, style("-").dim());
            continue;
        };
        println!(
            "{:<24} {:>12} {:>12} {:>10} {:>10} {:>6}",
            series.language,
            series.start_date,
            series.end_date,
            first,
            last,
            series.data.len()
        );
    }
}
