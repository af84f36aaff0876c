use crate::error::{PulseError, Result};
use chrono::{DateTime, Days, Duration, NaiveDate, TimeZone, Utc};

pub fn day_of<Tz: TimeZone>(timestamp: &DateTime<Tz>) -> NaiveDate {
    timestamp.with_timezone(&Utc).date_naive()
}

/// Signed number of calendar days from `from` to `to`.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    date + Duration::days(days)
}

/// `date` shifted by `days`, or `None` outside chrono's calendar range.
pub fn checked_add_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    if days >= 0 {
        date.checked_add_days(Days::new(days as u64))
    } else {
        date.checked_sub_days(Days::new(days.unsigned_abs()))
    }
}

/// Days strictly between `after` and `before`, ascending.
pub fn days_strictly_between(after: NaiveDate, before: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    let gap = days_between(after, before).max(1);
    (1..gap).map(move |offset| add_days(after, offset))
}

/// Parses a day given as RFC3339, `YYYY-MM-DD`, or "N days/weeks/months ago".
pub fn parse_day(input: &str) -> Result<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(day_of(&dt));
    }

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Ok(date);
    }

    if let Some(days) = parse_natural_days(input) {
        return days
            .checked_neg()
            .and_then(|back| checked_add_days(Utc::now().date_naive(), back))
            .ok_or_else(|| PulseError::Parse(format!("Date '{input}' is out of range")));
    }

    Err(PulseError::Parse(format!("Invalid date '{input}'")))
}

fn parse_natural_days(input: &str) -> Option<i64> {
    let input = input.trim().to_lowercase();

    let units: [(&str, i64); 3] = [(" days ago", 1), (" weeks ago", 7), (" months ago", 30)];
    for (suffix, factor) in units {
        if let Some(n) = input.strip_suffix(suffix) {
            if let Ok(n) = n.trim().parse::<i64>() {
                return Some(n.saturating_mul(factor));
            }
        }
    }

    None
}
