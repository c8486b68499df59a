//! Hash scheduler: chunked parallel hashing over a bounded worker pool.
//!
//! The candidate set is split into `W` static contiguous chunks
//! (`chunk_size = ceil(n / W)`) and each chunk is owned exclusively by one
//! worker — no two workers ever touch the same path, so hashing needs no
//! locks. Workers run on a rayon pool built with exactly `W` threads for this
//! run and joined before any aggregation happens.
//!
//! Shared state is limited to two concurrency-safe primitives: a crossbeam
//! channel carrying per-worker outcome batches back to the caller, and an
//! atomic counter feeding the progress observer.
//!
//! Chunk assignment is deliberately static rather than work-stealing:
//! candidates within a run tend to hash in comparable time, and determinism
//! keeps tests simple. A work-stealing queue could replace the inner loop
//! without changing this module's contract.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::progress::ProgressObserver;
use crate::scanner::{FileRecord, HashError, Hasher};

/// Default number of hashing workers.
pub const DEFAULT_WORKERS: usize = 4;

/// The per-file result of the hashing phase.
///
/// Produced exactly once per candidate; a failed file is never retried
/// within a run.
#[derive(Debug)]
pub enum HashOutcome {
    /// The file was hashed to completion.
    Success {
        /// Path of the hashed file
        path: std::path::PathBuf,
        /// File size in bytes, carried through for aggregation
        size: u64,
        /// Lowercase hex digest of the full content
        digest: String,
    },
    /// The file could not be fully read; it is excluded from all groups.
    Failure(HashError),
}

/// Everything the hashing phase produced.
#[derive(Debug, Default)]
pub struct HashRun {
    /// One outcome per candidate that was attempted
    pub outcomes: Vec<HashOutcome>,
    /// Whether the run was cut short by the cancellation flag
    pub interrupted: bool,
}

/// Dispatches candidate chunks across the worker pool.
pub struct HashScheduler {
    hasher: Arc<Hasher>,
    workers: usize,
    shutdown_flag: Option<Arc<AtomicBool>>,
    observer: Option<Arc<dyn ProgressObserver>>,
}

impl std::fmt::Debug for HashScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashScheduler")
            .field("hasher", &self.hasher)
            .field("workers", &self.workers)
            .field("shutdown_flag", &self.shutdown_flag)
            .field("observer", &self.observer.as_ref().map(|_| "<observer>"))
            .finish()
    }
}

impl HashScheduler {
    /// Create a scheduler with the given worker count (clamped to >= 1).
    #[must_use]
    pub fn new(hasher: Arc<Hasher>, workers: usize) -> Self {
        Self {
            hasher,
            workers: workers.max(1),
            shutdown_flag: None,
            observer: None,
        }
    }

    /// Set the cancellation flag checked between files.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress observer notified after each chunk completes.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Hash every candidate, returning the collected outcomes.
    ///
    /// Blocks until all workers have finished (the pool scope is the join
    /// barrier the aggregator relies on). Completion order across workers is
    /// unspecified; the outcome vector order is whatever the channel
    /// delivered and carries no meaning.
    #[must_use]
    pub fn run(&self, candidates: Vec<FileRecord>) -> HashRun {
        let total = candidates.len();
        if total == 0 {
            return HashRun::default();
        }

        let chunk_size = total.div_ceil(self.workers);
        log::info!(
            "Hashing {} candidates across {} worker(s), {} per chunk",
            total,
            self.workers,
            chunk_size
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .build()
            .unwrap_or_else(|e| {
                log::warn!("Failed to build {}-thread pool ({}), using fallback", self.workers, e);
                rayon::ThreadPoolBuilder::new().build().expect("fallback thread pool")
            });

        let (tx, rx) = crossbeam_channel::unbounded::<Vec<HashOutcome>>();
        let completed = AtomicUsize::new(0);

        pool.scope(|scope| {
            for chunk in candidates.chunks(chunk_size) {
                let tx = tx.clone();
                let completed = &completed;
                scope.spawn(move |_| {
                    let mut batch = Vec::with_capacity(chunk.len());
                    for record in chunk {
                        if self.is_shutdown_requested() {
                            log::debug!("Worker stopping: shutdown requested");
                            break;
                        }
                        batch.push(self.hash_one(record));
                    }

                    let done = completed.fetch_add(batch.len(), Ordering::SeqCst) + batch.len();
                    if tx.send(batch).is_err() {
                        log::warn!("Result channel closed before worker finished");
                    }
                    if let Some(observer) = &self.observer {
                        notify_observer(observer, done, total);
                    }
                });
            }
        });

        // All workers joined; close our end so the drain below terminates.
        drop(tx);

        let outcomes: Vec<HashOutcome> = rx.into_iter().flatten().collect();
        let interrupted = self.is_shutdown_requested();

        if interrupted {
            log::info!("Hashing interrupted after {} of {} candidates", outcomes.len(), total);
        }

        HashRun {
            outcomes,
            interrupted,
        }
    }

    fn hash_one(&self, record: &FileRecord) -> HashOutcome {
        match self.hasher.hash_file(&record.path) {
            Ok(digest) => HashOutcome::Success {
                path: record.path.clone(),
                size: record.size,
                digest,
            },
            Err(reason) => {
                log::warn!("Failed to hash {}: {}", record.path.display(), reason);
                HashOutcome::Failure(reason)
            }
        }
    }
}

/// Invoke the observer behind a panic barrier.
///
/// A misbehaving observer must never take the run down with it.
fn notify_observer(observer: &Arc<dyn ProgressObserver>, completed: usize, total: usize) {
    let result = catch_unwind(AssertUnwindSafe(|| {
        observer.chunk_completed(completed, total);
    }));
    if result.is_err() {
        log::warn!("Progress observer panicked; further notifications continue");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::DigestAlgorithm;
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use tempfile::TempDir;

    fn make_tree(contents: &[(&str, &[u8])]) -> (TempDir, Vec<FileRecord>) {
        let dir = TempDir::new().unwrap();
        let mut records = Vec::new();
        for (name, content) in contents {
            let path = dir.path().join(name);
            let mut f = std::fs::File::create(&path).unwrap();
            f.write_all(content).unwrap();
            records.push(FileRecord::new(path, content.len() as u64));
        }
        (dir, records)
    }

    fn scheduler(workers: usize) -> HashScheduler {
        HashScheduler::new(Arc::new(Hasher::new(DigestAlgorithm::Md5)), workers)
    }

    #[test]
    fn test_empty_candidate_set() {
        let run = scheduler(4).run(Vec::new());

        assert!(run.outcomes.is_empty());
        assert!(!run.interrupted);
    }

    #[test]
    fn test_all_candidates_hashed_once() {
        let (_dir, records) = make_tree(&[
            ("a", b"one"),
            ("b", b"two"),
            ("c", b"three"),
            ("d", b"four"),
            ("e", b"five"),
        ]);

        let run = scheduler(2).run(records.clone());

        assert_eq!(run.outcomes.len(), records.len());
        let mut hashed: Vec<PathBuf> = run
            .outcomes
            .iter()
            .map(|o| match o {
                HashOutcome::Success { path, .. } => path.clone(),
                HashOutcome::Failure(e) => e.path().to_path_buf(),
            })
            .collect();
        hashed.sort();
        let mut expected: Vec<PathBuf> = records.into_iter().map(|r| r.path).collect();
        expected.sort();
        assert_eq!(hashed, expected);
    }

    #[test]
    fn test_more_workers_than_candidates() {
        let (_dir, records) = make_tree(&[("a", b"x"), ("b", b"y")]);

        let run = scheduler(8).run(records);

        assert_eq!(run.outcomes.len(), 2);
    }

    #[test]
    fn test_identical_content_same_digest() {
        let (_dir, records) = make_tree(&[("a", b"dup"), ("b", b"dup"), ("c", b"not")]);

        let run = scheduler(3).run(records);

        let digests: Vec<&str> = run
            .outcomes
            .iter()
            .filter_map(|o| match o {
                HashOutcome::Success { digest, .. } => Some(digest.as_str()),
                HashOutcome::Failure(_) => None,
            })
            .collect();
        assert_eq!(digests.len(), 3);

        let unique: std::collections::HashSet<&str> = digests.iter().copied().collect();
        assert_eq!(unique.len(), 2);
    }

    #[test]
    fn test_missing_file_yields_failure() {
        let (_dir, mut records) = make_tree(&[("a", b"real")]);
        records.push(FileRecord::new(PathBuf::from("/no/such/file"), 4));

        let run = scheduler(2).run(records);

        assert_eq!(run.outcomes.len(), 2);
        let failures: Vec<_> = run
            .outcomes
            .iter()
            .filter(|o| matches!(o, HashOutcome::Failure(_)))
            .collect();
        assert_eq!(failures.len(), 1);
        assert!(!run.interrupted);
    }

    #[test]
    fn test_preset_shutdown_flag_short_circuits() {
        let (_dir, records) = make_tree(&[("a", b"x"), ("b", b"y"), ("c", b"z")]);

        let flag = Arc::new(AtomicBool::new(true));
        let run = scheduler(1).with_shutdown_flag(flag).run(records);

        assert!(run.interrupted);
        assert!(run.outcomes.is_empty());
    }

    struct RecordingObserver {
        calls: Mutex<Vec<(usize, usize)>>,
    }

    impl ProgressObserver for RecordingObserver {
        fn chunk_completed(&self, completed: usize, total: usize) {
            self.calls.lock().unwrap().push((completed, total));
        }
    }

    #[test]
    fn test_observer_sees_running_totals() {
        let (_dir, records) = make_tree(&[
            ("a", b"1"),
            ("b", b"2"),
            ("c", b"3"),
            ("d", b"4"),
        ]);

        let observer = Arc::new(RecordingObserver {
            calls: Mutex::new(Vec::new()),
        });
        let run = scheduler(2)
            .with_observer(observer.clone() as Arc<dyn ProgressObserver>)
            .run(records);

        assert_eq!(run.outcomes.len(), 4);

        let calls = observer.calls.lock().unwrap();
        // One notification per chunk, all against the same total.
        assert_eq!(calls.len(), 2);
        assert!(calls.iter().all(|(_, total)| *total == 4));
        // The last-reported running total must reach the full count.
        assert_eq!(calls.iter().map(|(c, _)| *c).max(), Some(4));
    }

    struct PanickingObserver;

    impl ProgressObserver for PanickingObserver {
        fn chunk_completed(&self, _completed: usize, _total: usize) {
            panic!("observer bug");
        }
    }

    #[test]
    fn test_panicking_observer_does_not_fail_run() {
        let (_dir, records) = make_tree(&[("a", b"x"), ("b", b"y")]);

        let run = scheduler(2)
            .with_observer(Arc::new(PanickingObserver) as Arc<dyn ProgressObserver>)
            .run(records);

        assert_eq!(run.outcomes.len(), 2);
        assert!(!run.interrupted);
    }

    #[test]
    fn test_worker_count_clamped_to_one() {
        let (_dir, records) = make_tree(&[("a", b"x")]);

        let run = scheduler(0).run(records);

        assert_eq!(run.outcomes.len(), 1);
    }
}
