//! Duplicate finder: orchestrates the detection pipeline.
//!
//! 1. **Enumerate** - walk the tree depth-first, collecting `FileRecord`s
//! 2. **Bucket** - group by exact size, dropping empties and singletons
//! 3. **Hash** - chunked parallel hashing over the bounded worker pool
//! 4. **Aggregate** - merge outcomes into deterministically ordered groups
//!
//! Only an invalid root aborts the run. Every other failure is absorbed at
//! the component where it occurs and surfaced in the summary's warnings list,
//! so the caller always gets either a complete result plus warnings or a
//! single fatal error. Cancellation is a distinct terminal status with no
//! partial groups.
//!
//! # Example
//!
//! ```no_run
//! use dupescan::duplicates::{DuplicateFinder, FinderConfig};
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::new(FinderConfig::default().with_workers(4));
//! let (groups, summary) = finder.find_duplicates(Path::new("/some/path")).unwrap();
//!
//! println!("{} duplicate groups", groups.len());
//! println!("{} bytes reclaimable", summary.reclaimable_bytes);
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::progress::ProgressObserver;
use crate::scanner::{DigestAlgorithm, FileRecord, HashError, Hasher, ScanError, Walker};

use super::groups::{aggregate_outcomes, bucket_by_size, candidate_set, confirm_groups};
use super::scheduler::{HashScheduler, DEFAULT_WORKERS};
use super::DuplicateGroup;

/// A recovered, non-fatal condition recorded during a run.
#[derive(thiserror::Error, Debug)]
pub enum ScanWarning {
    /// An entry could not be enumerated and was skipped.
    #[error(transparent)]
    Walk(#[from] ScanError),

    /// A candidate could not be hashed and was excluded from all groups.
    #[error(transparent)]
    Hash(#[from] HashError),
}

/// Errors that terminate a run.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The root path does not exist or is not a directory.
    #[error("Invalid root directory: {0}")]
    InvalidRoot(PathBuf),

    /// The run was cancelled; partial results are discarded.
    #[error("Scan cancelled")]
    Cancelled,
}

/// Configuration for the duplicate finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// Number of hashing workers (default 4, minimum 1).
    pub workers: usize,
    /// Digest algorithm used for content hashing.
    pub algorithm: DigestAlgorithm,
    /// Confirm groups byte-for-byte before reporting them.
    pub verify: bool,
    /// Optional cancellation flag.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress observer for the hashing phase.
    pub observer: Option<Arc<dyn ProgressObserver>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("workers", &self.workers)
            .field("algorithm", &self.algorithm)
            .field("verify", &self.verify)
            .field("shutdown_flag", &self.shutdown_flag)
            .field("observer", &self.observer.as_ref().map(|_| "<observer>"))
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            algorithm: DigestAlgorithm::default(),
            verify: false,
            shutdown_flag: None,
            observer: None,
        }
    }
}

impl FinderConfig {
    /// Set the worker count (clamped to at least 1).
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Set the digest algorithm.
    #[must_use]
    pub fn with_algorithm(mut self, algorithm: DigestAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Enable byte-for-byte group confirmation.
    #[must_use]
    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    /// Set the cancellation flag.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress observer.
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
}

/// Summary statistics and warnings from a run.
#[derive(Debug, Default)]
pub struct ScanSummary {
    /// Total number of files enumerated
    pub total_files: usize,
    /// Total size of all enumerated files in bytes
    pub total_size: u64,
    /// Zero-byte files skipped
    pub empty_files: usize,
    /// Files eliminated by size bucketing (unique sizes)
    pub eliminated_by_size: usize,
    /// Files that entered the hashing phase
    pub candidates: usize,
    /// Files hashed successfully
    pub hashed_files: usize,
    /// Files that failed to hash
    pub failed_files: usize,
    /// Total bytes fed through the digest
    pub bytes_hashed: u64,
    /// Number of duplicate groups found
    pub duplicate_groups: usize,
    /// Number of redundant copies across all groups
    pub duplicate_files: usize,
    /// Bytes freed by keeping one copy per group
    pub reclaimable_bytes: u64,
    /// Wall-clock duration of the run
    pub scan_duration: Duration,
    /// Every recovered failure, in the order encountered
    pub warnings: Vec<ScanWarning>,
}

impl ScanSummary {
    /// Whether any non-fatal condition was recorded.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Orchestrator for the duplicate detection pipeline.
pub struct DuplicateFinder {
    config: FinderConfig,
    hasher: Arc<Hasher>,
}

impl DuplicateFinder {
    /// Create a finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        let hasher = Arc::new(Hasher::new(config.algorithm));
        Self { config, hasher }
    }

    /// Create a finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// Find all duplicate files under `root`.
    ///
    /// The root is canonicalized up front so reported paths are absolute.
    ///
    /// # Errors
    ///
    /// - [`FinderError::InvalidRoot`] if `root` does not exist or is not a
    ///   directory; returned before any traversal starts.
    /// - [`FinderError::Cancelled`] if the cancellation flag is set at any
    ///   point; partial groups are discarded.
    pub fn find_duplicates(
        &self,
        root: &Path,
    ) -> Result<(Vec<DuplicateGroup>, ScanSummary), FinderError> {
        let root = std::fs::canonicalize(root)
            .map_err(|_| FinderError::InvalidRoot(root.to_path_buf()))?;
        if !root.is_dir() {
            return Err(FinderError::InvalidRoot(root));
        }

        log::info!("Scanning {} for duplicates", root.display());

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Cancelled);
        }

        let mut warnings = Vec::new();
        let mut files = Vec::new();
        let walker = Walker::new(&root);

        for result in walker.walk() {
            if self.config.is_shutdown_requested() {
                return Err(FinderError::Cancelled);
            }
            match result {
                Ok(record) => files.push(record),
                Err(e) => warnings.push(ScanWarning::Walk(e)),
            }
        }

        self.run_pipeline(files, warnings)
    }

    /// Find duplicates among a pre-collected list of records.
    ///
    /// Useful when the caller already enumerated files through another
    /// source. Records with stale sizes simply fail at hashing time and end
    /// up in the warnings list like any other unreadable candidate.
    pub fn find_duplicates_from_records(
        &self,
        records: Vec<FileRecord>,
    ) -> Result<(Vec<DuplicateGroup>, ScanSummary), FinderError> {
        if self.config.is_shutdown_requested() {
            return Err(FinderError::Cancelled);
        }
        self.run_pipeline(records, Vec::new())
    }

    /// Shared tail of the pipeline: bucket, hash, aggregate.
    fn run_pipeline(
        &self,
        files: Vec<FileRecord>,
        mut warnings: Vec<ScanWarning>,
    ) -> Result<(Vec<DuplicateGroup>, ScanSummary), FinderError> {
        let start = std::time::Instant::now();

        let (buckets, bucket_stats) = bucket_by_size(files);

        let mut summary = ScanSummary {
            total_files: bucket_stats.total_files,
            total_size: bucket_stats.total_size,
            empty_files: bucket_stats.empty_files,
            eliminated_by_size: bucket_stats.eliminated_unique,
            candidates: bucket_stats.candidates,
            ..Default::default()
        };

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Cancelled);
        }

        let candidates = candidate_set(buckets);
        if candidates.is_empty() {
            log::info!("No size bucket has more than one file; nothing to hash");
            summary.scan_duration = start.elapsed();
            summary.warnings = warnings;
            return Ok((Vec::new(), summary));
        }

        let mut scheduler = HashScheduler::new(self.hasher.clone(), self.config.workers);
        if let Some(flag) = &self.config.shutdown_flag {
            scheduler = scheduler.with_shutdown_flag(flag.clone());
        }
        if let Some(observer) = &self.config.observer {
            scheduler = scheduler.with_observer(observer.clone());
        }

        let run = scheduler.run(candidates);
        if run.interrupted {
            return Err(FinderError::Cancelled);
        }

        for outcome in &run.outcomes {
            match outcome {
                super::scheduler::HashOutcome::Success { size, .. } => {
                    summary.hashed_files += 1;
                    summary.bytes_hashed += size;
                }
                super::scheduler::HashOutcome::Failure(_) => {
                    summary.failed_files += 1;
                }
            }
        }

        let (mut groups, failures) = aggregate_outcomes(run.outcomes);
        warnings.extend(failures.into_iter().map(ScanWarning::Hash));

        if self.config.verify {
            log::info!("Confirming {} group(s) byte-for-byte", groups.len());
            let (confirmed, verify_failures) = confirm_groups(groups);
            groups = confirmed;
            warnings.extend(verify_failures.into_iter().map(ScanWarning::Hash));
        }

        summary.duplicate_groups = groups.len();
        summary.duplicate_files = groups.iter().map(DuplicateGroup::duplicate_count).sum();
        summary.reclaimable_bytes = groups.iter().map(|g| g.reclaimable_bytes).sum();
        summary.scan_duration = start.elapsed();
        summary.warnings = warnings;

        log::info!(
            "Scan complete: {} groups, {} redundant files, {} bytes reclaimable, {} warning(s)",
            summary.duplicate_groups,
            summary.duplicate_files,
            summary.reclaimable_bytes,
            summary.warnings.len()
        );

        Ok((groups, summary))
    }
}
