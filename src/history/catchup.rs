//! Joins a fresh bucket sequence with what earlier runs already persisted.

use crate::model::{DailyCommit, Record};
use crate::util::days_strictly_between;
use chrono::NaiveDate;

/// The latest day present in `records`.
pub fn last_persisted_day(records: &[Record]) -> Option<NaiveDate> {
    records.iter().map(|r| r.date).max()
}

/// Carry `baseline` forward to `day` unchanged apart from the date.
pub fn shadow_records(baseline: &[Record], day: NaiveDate) -> Vec<Record> {
    baseline.iter().map(|r| r.redated(day)).collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciled {
    /// Days between the last persisted day and the first new bucket.
    pub backfill_days: Vec<NaiveDate>,
    /// Re-dated copies of the last persisted records, one set per backfill day, ascending.
    pub backfill: Vec<Record>,
    /// Buckets still to be processed; all dated after the last persisted day.
    pub buckets: Vec<DailyCommit>,
}

/// Reconcile `buckets` with the last persisted record set of a project.
///
/// Buckets on or before the last persisted day are already recorded and are
/// dropped. When the first remaining bucket is more than a day past the last
/// persisted day, the gap is filled with copies of `last`.
pub fn reconcile(last: &[Record], buckets: Vec<DailyCommit>) -> Reconciled {
    let Some(last_day) = last_persisted_day(last) else {
        return Reconciled {
            buckets,
            ..Reconciled::default()
        };
    };

    let buckets: Vec<DailyCommit> = buckets.into_iter().filter(|b| b.date > last_day).collect();

    let backfill_days: Vec<NaiveDate> = match buckets.first() {
        Some(first) => days_strictly_between(last_day, first.date).collect(),
        None => Vec::new(),
    };
    let backfill = backfill_days
        .iter()
        .flat_map(|day| shadow_records(last, *day))
        .collect();

    Reconciled {
        backfill_days,
        backfill,
        buckets,
    }
}
