use crate::model::{Metric, Record, TimeSeriesData, TimeSeriesDataset};
use crate::util::{add_days, days_between};
use chrono::NaiveDate;
use std::collections::BTreeMap;

impl TimeSeriesData {
    fn starting(language: &str, date: NaiveDate) -> Self {
        Self {
            language: language.to_string(),
            start_date: date,
            end_date: date,
            date: Vec::new(),
            data: Vec::new(),
        }
    }

    fn push(&mut self, date: NaiveDate, value: u64) {
        // several projects can report the same language on the same day
        if self.date.last() == Some(&date) {
            if let Some(last) = self.data.last_mut() {
                *last += value;
            }
            return;
        }
        // a language absent for a while (removed, then reintroduced) reads as zero
        while days_between(self.end_date, date) > 1 {
            self.end_date = add_days(self.end_date, 1);
            self.date.push(self.end_date);
            self.data.push(0);
        }
        self.end_date = date;
        self.date.push(date);
        self.data.push(value);
    }
}

/// Build one gap-free series per language from `records`.
///
/// Returns `None` when there are no records.
pub fn to_dataset(records: &[Record], metric: Metric) -> Option<TimeSeriesDataset> {
    let mut sorted: Vec<&Record> = records.iter().collect();
    sorted.sort_by(|a, b| a.key().cmp(&b.key()));

    let start_date = sorted.first()?.date;
    let end_date = sorted.last()?.date;

    let mut series: BTreeMap<&str, TimeSeriesData> = BTreeMap::new();
    for record in sorted {
        series
            .entry(record.language.as_str())
            .or_insert_with(|| TimeSeriesData::starting(&record.language, record.date))
            .push(record.date, metric.of(record));
    }

    Some(TimeSeriesDataset {
        start_date,
        end_date,
        data: series.into_values().collect(),
    })
}
