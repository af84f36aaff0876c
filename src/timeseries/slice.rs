use crate::error::{PulseError, Result};
use crate::model::{TimeSeriesData, TimeSeriesDataset};
use crate::util::{checked_add_days, days_between};
use chrono::NaiveDate;

impl TimeSeriesData {
    /// The part of this series inside `[from, to]`.
    ///
    /// A series with no day in the window comes back empty, dated with the
    /// requested window.
    pub fn window(&self, from: NaiveDate, to: NaiveDate) -> TimeSeriesData {
        let lo = from.max(self.start_date);
        let hi = to.min(self.end_date);
        if lo > hi {
            return TimeSeriesData {
                language: self.language.clone(),
                start_date: from,
                end_date: to,
                date: Vec::new(),
                data: Vec::new(),
            };
        }

        let offset = days_between(self.start_date, lo) as usize;
        let len = days_between(lo, hi) as usize + 1;
        let end = (offset + len).min(self.date.len()).min(self.data.len());
        let offset = offset.min(end);

        TimeSeriesData {
            language: self.language.clone(),
            start_date: lo,
            end_date: hi,
            date: self.date[offset..end].to_vec(),
            data: self.data[offset..end].to_vec(),
        }
    }
}

impl TimeSeriesDataset {
    /// Restrict the dataset to `[start, start + count]`, clipped to its own end.
    ///
    /// Every language is kept, possibly with an empty series.
    pub fn slice(&self, start: NaiveDate, count: i64) -> Result<TimeSeriesDataset> {
        if count < 0 {
            return Err(PulseError::ContractViolation(format!(
                "slice count must not be negative, got {count}"
            )));
        }
        if start < self.start_date {
            return Err(PulseError::ContractViolation(format!(
                "slice start {start} is before dataset start {}",
                self.start_date
            )));
        }

        let end = checked_add_days(start, count)
            .map_or(self.end_date, |end| end.min(self.end_date))
            .max(start);

        Ok(TimeSeriesDataset {
            start_date: start,
            end_date: end,
            data: self.data.iter().map(|series| series.window(start, end)).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Metric, Record};
    use crate::timeseries::to_dataset;
    use crate::util::add_days;
    use pretty_assertions::assert_eq;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn daily(language: &str, from: &str, to: &str) -> Vec<Record> {
        let (from, to) = (d(from), d(to));
        (0..=days_between(from, to))
            .map(|i| Record {
                date: add_days(from, i),
                project: "p".to_string(),
                language: language.to_string(),
                file_count: 1,
                blank_lines: 0,
                comment_lines: 0,
                code_lines: 100 + i as u64,
            })
            .collect()
    }

    fn january() -> TimeSeriesDataset {
        let mut records = daily("Rust", "2024-01-01", "2024-01-31");
        records.extend(daily("Go", "2024-01-10", "2024-01-20"));
        records.extend(daily("C", "2024-01-25", "2024-01-26"));
        to_dataset(&records, Metric::Code).unwrap()
    }

    fn series<'a>(dataset: &'a TimeSeriesDataset, language: &str) -> &'a TimeSeriesData {
        dataset.data.iter().find(|s| s.language == language).unwrap()
    }

    #[test]
    fn window_inside_dataset() {
        let sliced = january().slice(d("2024-01-05"), 7).unwrap();
        assert_eq!((sliced.start_date, sliced.end_date), (d("2024-01-05"), d("2024-01-12")));

        let rust = series(&sliced, "Rust");
        assert_eq!(rust.date.first(), Some(&d("2024-01-05")));
        assert_eq!(rust.date.last(), Some(&d("2024-01-12")));
        assert_eq!(rust.data.len(), 8);
        assert_eq!(rust.data[0], 104);
    }

    #[test]
    fn leading_edge_clips_to_language_start() {
        let sliced = january().slice(d("2024-01-05"), 7).unwrap();
        let go = series(&sliced, "Go");
        assert_eq!((go.start_date, go.end_date), (d("2024-01-10"), d("2024-01-12")));
        assert_eq!(go.data, vec![100, 101, 102]);
    }

    #[test]
    fn trailing_edge_clips_to_language_end() {
        let sliced = january().slice(d("2024-01-18"), 7).unwrap();
        let go = series(&sliced, "Go");
        assert_eq!(go.date, vec![d("2024-01-18"), d("2024-01-19"), d("2024-01-20")]);
        assert_eq!(go.data, vec![108, 109, 110]);
    }

    #[test]
    fn language_outside_window_is_kept_empty() {
        let sliced = january().slice(d("2024-01-01"), 3).unwrap();
        assert_eq!(sliced.data.len(), 3);
        let c = series(&sliced, "C");
        assert!(c.date.is_empty() && c.data.is_empty());
        assert_eq!((c.start_date, c.end_date), (d("2024-01-01"), d("2024-01-04")));
    }

    #[test]
    fn window_past_the_end_is_clipped() {
        let sliced = january().slice(d("2024-01-28"), 7).unwrap();
        assert_eq!(sliced.end_date, d("2024-01-31"));
        assert_eq!(series(&sliced, "Rust").data.len(), 4);
    }

    #[test]
    fn huge_count_clips_to_dataset_end() {
        let sliced = january().slice(d("2024-01-20"), 1_000_000_000).unwrap();
        assert_eq!(sliced.end_date, d("2024-01-31"));
        assert_eq!(series(&sliced, "Rust").data.len(), 12);

        let sliced = january().slice(d("2024-01-20"), i64::MAX).unwrap();
        assert_eq!(sliced.end_date, d("2024-01-31"));
    }

    #[test]
    fn zero_count_is_a_single_day() {
        let sliced = january().slice(d("2024-01-15"), 0).unwrap();
        assert_eq!(series(&sliced, "Rust").date, vec![d("2024-01-15")]);
        assert_eq!(series(&sliced, "Go").data, vec![105]);
    }

    #[test]
    fn start_before_dataset_is_rejected() {
        let err = january().slice(d("2023-12-25"), 7).unwrap_err();
        assert!(matches!(err, PulseError::ContractViolation(_)));
    }

    #[test]
    fn negative_count_is_rejected() {
        let err = january().slice(d("2024-01-05"), -1).unwrap_err();
        assert!(matches!(err, PulseError::ContractViolation(_)));
    }

    #[test]
    fn sliced_series_keep_dates_and_data_aligned() {
        let dataset = january();
        for start in 0..31 {
            let sliced = dataset.slice(add_days(d("2024-01-01"), start), 5).unwrap();
            for s in &sliced.data {
                assert_eq!(s.date.len(), s.data.len());
                for pair in s.date.windows(2) {
                    assert_eq!(days_between(pair[0], pair[1]), 1);
                }
            }
        }
    }
}
