//! Size bucketing, duplicate groups, and result aggregation.
//!
//! Size bucketing is the first filter of the pipeline: files with different
//! sizes cannot be duplicates, so grouping by exact byte size eliminates most
//! of the tree without any file I/O. Zero-byte files are excluded outright —
//! content hashing cannot distinguish them and the reference behavior skips
//! them.
//!
//! Aggregation is the last step: hash outcomes are merged into groups keyed
//! by `(size, digest)`, filtered to 2+ members, and ordered deterministically
//! by reclaimable bytes.
//!
//! # Example
//!
//! ```
//! use dupescan::scanner::FileRecord;
//! use dupescan::duplicates::{bucket_by_size, candidate_set};
//! use std::path::PathBuf;
//!
//! let files = vec![
//!     FileRecord::new(PathBuf::from("/file1.txt"), 1024),
//!     FileRecord::new(PathBuf::from("/file2.txt"), 1024),
//!     FileRecord::new(PathBuf::from("/file3.txt"), 2048),
//! ];
//!
//! let (buckets, stats) = bucket_by_size(files);
//! assert_eq!(stats.total_files, 3);
//! assert_eq!(stats.candidates, 2); // the two 1024-byte files
//! assert_eq!(candidate_set(buckets).len(), 2);
//! ```

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::scanner::{FileRecord, HashError, BLOCK_SIZE};

use super::scheduler::HashOutcome;

/// A confirmed group of files with identical size and digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateGroup {
    /// Lowercase hex digest shared by every member
    pub digest: String,
    /// File size in bytes, shared by every member
    pub size: u64,
    /// Member paths, sorted
    pub paths: Vec<PathBuf>,
    /// Bytes freed by keeping one copy: `(paths.len() - 1) * size`
    pub reclaimable_bytes: u64,
}

impl DuplicateGroup {
    /// Create a group; sorts the paths and computes reclaimable bytes.
    #[must_use]
    pub fn new(digest: String, size: u64, mut paths: Vec<PathBuf>) -> Self {
        paths.sort();
        let reclaimable_bytes = size * (paths.len() as u64).saturating_sub(1);
        Self {
            digest,
            size,
            paths,
            reclaimable_bytes,
        }
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Number of redundant copies (total minus one original).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.paths.len().saturating_sub(1)
    }

    /// Total bytes occupied by all members.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.size * self.paths.len() as u64
    }
}

/// Statistics from the size-bucketing pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BucketStats {
    /// Total number of files processed
    pub total_files: usize,
    /// Total size of all files in bytes
    pub total_size: u64,
    /// Number of distinct non-zero sizes seen
    pub unique_sizes: usize,
    /// Number of files surviving into the candidate set
    pub candidates: usize,
    /// Number of files eliminated as the only one of their size
    pub eliminated_unique: usize,
    /// Number of zero-byte files skipped
    pub empty_files: usize,
    /// Number of buckets with 2+ files
    pub candidate_buckets: usize,
}

impl BucketStats {
    /// Percentage of files eliminated without hashing.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            let eliminated = self.total_files - self.candidates;
            (eliminated as f64 / self.total_files as f64) * 100.0
        }
    }
}

/// Group files by exact size, dropping zero-byte files and singleton buckets.
///
/// Single linear pass; no file I/O. The returned map contains only buckets
/// with 2+ members — exactly the files worth hashing.
#[must_use]
pub fn bucket_by_size(
    files: impl IntoIterator<Item = FileRecord>,
) -> (HashMap<u64, Vec<FileRecord>>, BucketStats) {
    let mut all_buckets: HashMap<u64, Vec<FileRecord>> = HashMap::new();
    let mut stats = BucketStats::default();

    for file in files {
        stats.total_files += 1;
        stats.total_size += file.size;

        if file.size == 0 {
            stats.empty_files += 1;
            log::debug!("Skipping empty file: {}", file.path.display());
            continue;
        }

        all_buckets.entry(file.size).or_default().push(file);
    }

    if stats.empty_files > 0 {
        log::warn!(
            "Skipped {} empty file(s) - empty files are never reported as duplicates",
            stats.empty_files
        );
    }

    stats.unique_sizes = all_buckets.len();

    let buckets: HashMap<u64, Vec<FileRecord>> = all_buckets
        .into_iter()
        .filter(|(size, files)| {
            if files.len() == 1 {
                stats.eliminated_unique += 1;
                log::trace!("Eliminated unique size {}: {}", size, files[0].path.display());
                false
            } else {
                stats.candidates += files.len();
                stats.candidate_buckets += 1;
                log::debug!("Size bucket {} bytes: {} candidates", size, files.len());
                true
            }
        })
        .collect();

    log::info!(
        "Size bucketing: {} files -> {} candidates ({:.1}% eliminated)",
        stats.total_files,
        stats.candidates,
        stats.elimination_rate()
    );

    (buckets, stats)
}

/// Flatten surviving buckets into the candidate list handed to the scheduler.
///
/// Buckets are visited in ascending size order and members keep their
/// enumeration order, so chunk assignment is reproducible within a run.
#[must_use]
pub fn candidate_set(buckets: HashMap<u64, Vec<FileRecord>>) -> Vec<FileRecord> {
    let mut buckets: Vec<(u64, Vec<FileRecord>)> = buckets.into_iter().collect();
    buckets.sort_by_key(|(size, _)| *size);
    buckets.into_iter().flat_map(|(_, files)| files).collect()
}

/// Merge hash outcomes into duplicate groups.
///
/// Successes are grouped by `(size, digest)` — keying on size as well means
/// two files that happened to collide on digest but differ in size can never
/// land in the same group. Failures are returned separately for the warnings
/// list. Groups are filtered to 2+ members and sorted by reclaimable bytes
/// descending, digest ascending, first path ascending.
#[must_use]
pub fn aggregate_outcomes(outcomes: Vec<HashOutcome>) -> (Vec<DuplicateGroup>, Vec<HashError>) {
    let mut by_digest: HashMap<(u64, String), Vec<PathBuf>> = HashMap::new();
    let mut failures = Vec::new();

    for outcome in outcomes {
        match outcome {
            HashOutcome::Success { path, size, digest } => {
                by_digest.entry((size, digest)).or_default().push(path);
            }
            HashOutcome::Failure(reason) => {
                failures.push(reason);
            }
        }
    }

    let mut groups: Vec<DuplicateGroup> = by_digest
        .into_iter()
        .filter(|(_, paths)| paths.len() > 1)
        .map(|((size, digest), paths)| DuplicateGroup::new(digest, size, paths))
        .collect();

    sort_groups(&mut groups);

    (groups, failures)
}

/// Impose the deterministic output order.
pub fn sort_groups(groups: &mut [DuplicateGroup]) {
    groups.sort_by(|a, b| {
        b.reclaimable_bytes
            .cmp(&a.reclaimable_bytes)
            .then_with(|| a.digest.cmp(&b.digest))
            .then_with(|| a.paths.cmp(&b.paths))
    });
}

/// Byte-for-byte confirmation of digest-matched groups.
///
/// Digest equality leaves a vanishingly small chance that two distinct files
/// are reported as duplicates. This pass re-partitions each group by actual
/// content equality, splitting out any colliding member. Files that can no
/// longer be read are dropped from their group and reported as failures.
#[must_use]
pub fn confirm_groups(groups: Vec<DuplicateGroup>) -> (Vec<DuplicateGroup>, Vec<HashError>) {
    let mut confirmed = Vec::with_capacity(groups.len());
    let mut failures = Vec::new();

    for group in groups {
        // Partitions of byte-identical members, each led by a representative.
        let mut partitions: Vec<Vec<PathBuf>> = Vec::new();

        'members: for path in group.paths {
            for partition in &mut partitions {
                match files_equal(&partition[0], &path) {
                    Ok(true) => {
                        partition.push(path);
                        continue 'members;
                    }
                    Ok(false) => {}
                    Err(e) => {
                        log::warn!("Dropping {} from group: {}", path.display(), e);
                        failures.push(e);
                        continue 'members;
                    }
                }
            }
            partitions.push(vec![path]);
        }

        if partitions.len() > 1 {
            log::warn!(
                "Digest {} matched {} distinct contents; splitting group",
                group.digest,
                partitions.len()
            );
        }

        for partition in partitions {
            if partition.len() > 1 {
                confirmed.push(DuplicateGroup::new(
                    group.digest.clone(),
                    group.size,
                    partition,
                ));
            }
        }
    }

    sort_groups(&mut confirmed);
    (confirmed, failures)
}

/// Compare two files byte for byte, streaming one block at a time.
fn files_equal(a: &Path, b: &Path) -> Result<bool, HashError> {
    let mut fa = File::open(a).map_err(|e| HashError::from_io(a.to_path_buf(), e))?;
    let mut fb = File::open(b).map_err(|e| HashError::from_io(b.to_path_buf(), e))?;

    let mut buf_a = vec![0u8; BLOCK_SIZE];
    let mut buf_b = vec![0u8; BLOCK_SIZE];

    loop {
        let na = read_full(&mut fa, &mut buf_a).map_err(|e| HashError::from_io(a.to_path_buf(), e))?;
        let nb = read_full(&mut fb, &mut buf_b).map_err(|e| HashError::from_io(b.to_path_buf(), e))?;

        if na != nb || buf_a[..na] != buf_b[..nb] {
            return Ok(false);
        }
        if na == 0 {
            return Ok(true);
        }
    }
}

/// Fill as much of `buf` as possible, short only at EOF.
fn read_full(file: &mut File, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = file.read(&mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}
