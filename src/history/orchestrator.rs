use super::catchup::{shadow_records, Reconciled};
use crate::cloc::Counter;
use crate::error::Result;
use crate::git::{RestoreGuard, Vcs};
use crate::model::{Record, RunSummary};
use crate::storage::Storage;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};

/// Replays reconciled buckets against a working copy, one day at a time.
pub struct Orchestrator<'a, V: Vcs + ?Sized, C: Counter + ?Sized, S: Storage + ?Sized> {
    vcs: &'a V,
    counter: &'a C,
    storage: &'a mut S,
    project: String,
    progress: bool,
}

impl<'a, V: Vcs + ?Sized, C: Counter + ?Sized, S: Storage + ?Sized> Orchestrator<'a, V, C, S> {
    pub fn new(vcs: &'a V, counter: &'a C, storage: &'a mut S, project: &str) -> Self {
        Self {
            vcs,
            counter,
            storage,
            project: project.to_string(),
            progress: false,
        }
    }

    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    /// Persist the backfill, then every bucket in order.
    ///
    /// `baseline` is the last persisted record set; shadow days before the
    /// first counted day repeat it. The working copy is back on the main
    /// branch when this returns, whether it succeeded or not.
    pub fn run(&mut self, reconciled: Reconciled, baseline: Vec<Record>) -> Result<RunSummary> {
        let Reconciled {
            backfill_days,
            backfill,
            buckets,
        } = reconciled;

        let mut summary = RunSummary {
            project: self.project.clone(),
            backfilled_days: backfill_days.len() as u64,
            first_day: backfill_days.first().or(buckets.first().map(|b| &b.date)).copied(),
            last_day: buckets.last().map(|b| b.date).or(backfill_days.last().copied()),
            ..RunSummary::default()
        };

        if !backfill.is_empty() {
            info!(
                "Catching up {} day(s) for {} before {}",
                backfill_days.len(),
                self.project,
                buckets.first().map(|b| b.date.to_string()).unwrap_or_default()
            );
            summary.records_written += backfill.len() as u64;
            self.storage.put_records(backfill)?;
        }

        if buckets.is_empty() {
            return Ok(summary);
        }

        let guard = RestoreGuard::new(self.vcs);
        let pb = self.progress_bar(buckets.len() as u64);
        let mut last_result = baseline;

        for bucket in &buckets {
            let records = match &bucket.commit {
                None => {
                    summary.shadow_days += 1;
                    shadow_records(&last_result, bucket.date)
                }
                Some(commit) => {
                    pb.set_message(format!("{} {}", bucket.date, commit.short_hash));
                    self.vcs.checkout(&commit.short_hash)?;
                    let stats = self.counter.count(self.vcs.workdir())?;
                    debug!("{} @ {}: {} language(s)", bucket.date, commit.short_hash, stats.len());

                    let records: Vec<Record> = stats
                        .iter()
                        .map(|s| Record::from_stats(bucket.date, &self.project, s))
                        .collect();
                    last_result = records.clone();
                    summary.counted_days += 1;
                    records
                }
            };
            summary.records_written += records.len() as u64;
            self.storage.put_records(records)?;
            pb.inc(1);
        }

        pb.finish_and_clear();
        guard.restore()?;
        info!(
            "Recorded {} counted and {} shadow day(s) for {}",
            summary.counted_days, summary.shadow_days, self.project
        );
        Ok(summary)
    }

    fn progress_bar(&self, len: u64) -> ProgressBar {
        if !self.progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        pb
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PulseError;
    use crate::history::{bucket_commits, reconcile};
    use crate::model::{Commit, DailyCommit, LanguageStats};
    use chrono::{DateTime, NaiveDate};
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::path::Path;

    struct FakeVcs {
        checkouts: RefCell<Vec<String>>,
    }

    impl FakeVcs {
        fn new() -> Self {
            Self { checkouts: RefCell::new(Vec::new()) }
        }
        fn checkouts(&self) -> Vec<String> {
            self.checkouts.borrow().clone()
        }
    }

    impl Vcs for FakeVcs {
        fn workdir(&self) -> &Path {
            Path::new("/work")
        }
        fn main_branch(&self) -> &str {
            "main"
        }
        fn checkout(&self, reference: &str) -> Result<()> {
            self.checkouts.borrow_mut().push(reference.to_string());
            Ok(())
        }
    }

    /// Reports Rust code lines per checked-out hash; fails on unknown hashes.
    struct FakeCounter<'v> {
        vcs: &'v FakeVcs,
        code_by_hash: HashMap<&'static str, u64>,
    }

    impl Counter for FakeCounter<'_> {
        fn count(&self, _dir: &Path) -> Result<Vec<LanguageStats>> {
            let current = self.vcs.checkouts().pop().unwrap_or_default();
            let code = self
                .code_by_hash
                .get(current.as_str())
                .ok_or_else(|| PulseError::tool("cloc", format!("cannot count {current}")))?;
            Ok(vec![LanguageStats {
                language: "Rust".to_string(),
                file_count: 1,
                blank_lines: 0,
                comment_lines: 0,
                code_lines: *code,
            }])
        }
    }

    #[derive(Default)]
    struct MemoryStorage {
        puts: Vec<Vec<Record>>,
    }

    impl Storage for MemoryStorage {
        fn put_records(&mut self, records: Vec<Record>) -> Result<()> {
            self.puts.push(records);
            Ok(())
        }
        fn last_records(&self, _project: &str) -> Result<Vec<Record>> {
            Ok(Vec::new())
        }
        fn records(&self, _project: Option<&str>) -> Result<Vec<Record>> {
            Ok(self.puts.concat())
        }
        fn finalize(&mut self) -> Result<()> {
            Ok(())
        }
    }

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn commit(ts: &str, hash: &str) -> Commit {
        Commit {
            date_time: DateTime::parse_from_rfc3339(ts).unwrap(),
            short_hash: hash.to_string(),
            author_email: "dev@example.com".to_string(),
        }
    }

    fn rust(day: &str, code: u64) -> Record {
        Record {
            date: d(day),
            project: "demo".to_string(),
            language: "Rust".to_string(),
            file_count: 1,
            blank_lines: 0,
            comment_lines: 0,
            code_lines: code,
        }
    }

    #[test]
    fn counts_commit_days_and_carries_shadow_days() {
        let vcs = FakeVcs::new();
        let counter = FakeCounter {
            vcs: &vcs,
            code_by_hash: HashMap::from([("aaa", 10), ("ccc", 30)]),
        };
        let mut storage = MemoryStorage::default();

        let buckets = bucket_commits(&[
            commit("2024-01-01T08:00:00+00:00", "aaa"),
            commit("2024-01-01T09:00:00+00:00", "bbb"),
            commit("2024-01-03T08:00:00+00:00", "ccc"),
        ]);
        let summary = Orchestrator::new(&vcs, &counter, &mut storage, "demo")
            .run(reconcile(&[], buckets), Vec::new())
            .unwrap();

        assert_eq!(
            storage.records(None).unwrap(),
            vec![rust("2024-01-01", 10), rust("2024-01-02", 10), rust("2024-01-03", 30)]
        );
        assert_eq!(vcs.checkouts(), vec!["aaa", "ccc", "main"]);
        assert_eq!(summary.counted_days, 2);
        assert_eq!(summary.shadow_days, 1);
        assert_eq!(summary.records_written, 3);
        assert_eq!(summary.first_day, Some(d("2024-01-01")));
        assert_eq!(summary.last_day, Some(d("2024-01-03")));
    }

    #[test]
    fn leading_shadow_days_repeat_baseline() {
        let vcs = FakeVcs::new();
        let counter = FakeCounter { vcs: &vcs, code_by_hash: HashMap::new() };
        let mut storage = MemoryStorage::default();

        let baseline = vec![rust("2024-01-01", 10)];
        let reconciled = Reconciled {
            buckets: vec![DailyCommit::shadow(d("2024-01-02"))],
            ..Reconciled::default()
        };
        Orchestrator::new(&vcs, &counter, &mut storage, "demo")
            .run(reconciled, baseline)
            .unwrap();

        assert_eq!(storage.records(None).unwrap(), vec![rust("2024-01-02", 10)]);
        assert_eq!(vcs.checkouts(), vec!["main"]);
    }

    #[test]
    fn backfill_is_written_before_new_days() {
        let vcs = FakeVcs::new();
        let counter = FakeCounter {
            vcs: &vcs,
            code_by_hash: HashMap::from([("new", 50)]),
        };
        let mut storage = MemoryStorage::default();

        let last = vec![rust("2024-03-13", 42)];
        let buckets = bucket_commits(&[commit("2024-03-16T10:00:00+00:00", "new")]);
        let summary = Orchestrator::new(&vcs, &counter, &mut storage, "demo")
            .run(reconcile(&last, buckets), last.clone())
            .unwrap();

        assert_eq!(
            storage.puts,
            vec![
                vec![rust("2024-03-14", 42), rust("2024-03-15", 42)],
                vec![rust("2024-03-16", 50)],
            ]
        );
        assert_eq!(summary.backfilled_days, 2);
        assert_eq!(summary.first_day, Some(d("2024-03-14")));
    }

    #[test]
    fn working_copy_is_restored_when_counting_fails() {
        let vcs = FakeVcs::new();
        let counter = FakeCounter {
            vcs: &vcs,
            code_by_hash: HashMap::from([("aaa", 10)]),
        };
        let mut storage = MemoryStorage::default();

        let buckets = bucket_commits(&[
            commit("2024-01-01T08:00:00+00:00", "aaa"),
            commit("2024-01-02T08:00:00+00:00", "broken"),
            commit("2024-01-03T08:00:00+00:00", "ccc"),
        ]);
        let result = Orchestrator::new(&vcs, &counter, &mut storage, "demo").run(reconcile(&[], buckets), Vec::new());

        assert!(matches!(result, Err(PulseError::ExternalTool { .. })));
        assert_eq!(vcs.checkouts(), vec!["aaa", "broken", "main"]);
        assert_eq!(storage.records(None).unwrap(), vec![rust("2024-01-01", 10)]);
    }

    #[test]
    fn nothing_to_do_leaves_working_copy_alone() {
        let vcs = FakeVcs::new();
        let counter = FakeCounter { vcs: &vcs, code_by_hash: HashMap::new() };
        let mut storage = MemoryStorage::default();

        let summary = Orchestrator::new(&vcs, &counter, &mut storage, "demo")
            .run(Reconciled::default(), Vec::new())
            .unwrap();

        assert_eq!(summary.records_written, 0);
        assert!(vcs.checkouts().is_empty());
    }
}
