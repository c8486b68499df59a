//! Duplicate detection pipeline: bucketing, scheduling, aggregation.
//!
//! The submodules mirror the pipeline stages:
//! - [`groups`]: size bucketing, the candidate set, and result aggregation
//! - [`scheduler`]: the bounded worker pool that hashes candidates
//! - [`finder`]: the orchestrator tying the stages together

pub mod finder;
pub mod groups;
pub mod scheduler;

pub use finder::{DuplicateFinder, FinderConfig, FinderError, ScanSummary, ScanWarning};
pub use groups::{
    aggregate_outcomes, bucket_by_size, candidate_set, confirm_groups, BucketStats,
    DuplicateGroup,
};
pub use scheduler::{HashOutcome, HashRun, HashScheduler, DEFAULT_WORKERS};
