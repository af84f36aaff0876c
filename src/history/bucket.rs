use crate::model::{Commit, DailyCommit};
use crate::util::{days_between, days_strictly_between};

/// Walk ascending `commits` and emit one bucket per calendar day from the
/// first commit's day to the last one's.
///
/// The earliest commit of a day represents it; later commits on the same day
/// (or on an earlier day) are dropped. Days without commits become shadow
/// buckets.
pub fn bucket_commits(commits: &[Commit]) -> Vec<DailyCommit> {
    let mut iter = commits.iter();
    let Some(first) = iter.next() else {
        return Vec::new();
    };

    let mut cursor = first.day();
    let mut buckets = vec![DailyCommit::snapshot(cursor, first.clone())];

    for commit in iter {
        let day = commit.day();
        if days_between(cursor, day) <= 0 {
            continue;
        }
        buckets.extend(days_strictly_between(cursor, day).map(DailyCommit::shadow));
        buckets.push(DailyCommit::snapshot(day, commit.clone()));
        cursor = day;
    }

    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, NaiveDate};
    use pretty_assertions::assert_eq;

    fn commit(ts: &str, hash: &str) -> Commit {
        Commit {
            date_time: DateTime::parse_from_rfc3339(ts).unwrap(),
            short_hash: hash.to_string(),
            author_email: "dev@example.com".to_string(),
        }
    }

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn assert_contiguous(buckets: &[DailyCommit]) {
        for pair in buckets.windows(2) {
            assert_eq!(days_between(pair[0].date, pair[1].date), 1, "{pair:?}");
        }
    }

    #[test]
    fn gap_day_becomes_shadow() {
        let commits = vec![
            commit("2024-01-01T08:00:00+00:00", "first"),
            commit("2024-01-01T17:00:00+00:00", "second"),
            commit("2024-01-03T09:00:00+00:00", "third"),
        ];
        let buckets = bucket_commits(&commits);

        assert_eq!(
            buckets,
            vec![
                DailyCommit::snapshot(d("2024-01-01"), commits[0].clone()),
                DailyCommit::shadow(d("2024-01-02")),
                DailyCommit::snapshot(d("2024-01-03"), commits[2].clone()),
            ]
        );
    }

    #[test]
    fn single_commit_is_one_bucket() {
        let buckets = bucket_commits(&[commit("2024-05-05T12:00:00+00:00", "only")]);
        assert_eq!(buckets.len(), 1);
        assert!(!buckets[0].is_shadow());
        assert_eq!(buckets[0].date, d("2024-05-05"));
    }

    #[test]
    fn same_day_commits_share_a_bucket() {
        let buckets = bucket_commits(&[
            commit("2024-05-05T08:00:00+00:00", "early"),
            commit("2024-05-05T20:00:00+00:00", "late"),
        ]);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].commit.as_ref().unwrap().short_hash, "early");
    }

    #[test]
    fn no_commits_no_buckets() {
        assert!(bucket_commits(&[]).is_empty());
    }

    #[test]
    fn earlier_day_after_cursor_is_dropped() {
        let buckets = bucket_commits(&[
            commit("2024-05-05T08:00:00+00:00", "a"),
            commit("2024-05-04T08:00:00+00:00", "stray"),
            commit("2024-05-06T08:00:00+00:00", "b"),
        ]);
        let hashes: Vec<_> = buckets
            .iter()
            .map(|b| b.commit.as_ref().map(|c| c.short_hash.as_str()))
            .collect();
        assert_eq!(hashes, vec![Some("a"), Some("b")]);
    }

    #[test]
    fn long_history_is_contiguous_and_shadow_iff_no_commit() {
        let commits = vec![
            commit("2023-12-30T10:00:00+00:00", "c1"),
            commit("2023-12-30T11:00:00+00:00", "c2"),
            commit("2024-01-02T10:00:00+00:00", "c3"),
            commit("2024-02-28T10:00:00+00:00", "c4"),
            commit("2024-03-01T10:00:00+00:00", "c5"),
            commit("2024-03-01T23:59:59+00:00", "c6"),
        ];
        let buckets = bucket_commits(&commits);

        assert_contiguous(&buckets);
        assert_eq!(buckets.first().unwrap().date, d("2023-12-30"));
        assert_eq!(buckets.last().unwrap().date, d("2024-03-01"));
        assert_eq!(buckets.len() as i64, days_between(d("2023-12-30"), d("2024-03-01")) + 1);
        assert_eq!(buckets.iter().filter(|b| !b.is_shadow()).count(), 4);
        assert!(!buckets[0].is_shadow());
    }
}
