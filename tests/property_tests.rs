//! Property-based tests for the pure pipeline stages.

use proptest::prelude::*;
use std::path::PathBuf;

use dupescan::duplicates::{
    aggregate_outcomes, bucket_by_size, candidate_set, HashOutcome,
};
use dupescan::scanner::{DigestAlgorithm, FileRecord, Hasher};

proptest! {
    #[test]
    fn test_hash_determinism(content in prop::collection::vec(any::<u8>(), 0..4096)) {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("test.bin");
        std::fs::write(&path, &content).unwrap();

        let hasher = Hasher::new(DigestAlgorithm::Md5);
        let first = hasher.hash_file(&path).unwrap();
        let second = hasher.hash_file(&path).unwrap();

        prop_assert_eq!(first, second);
    }

    #[test]
    fn test_block_size_does_not_change_digest(
        content in prop::collection::vec(any::<u8>(), 0..4096),
        block in 1usize..512,
    ) {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("test.bin");
        std::fs::write(&path, &content).unwrap();

        let whole = Hasher::new(DigestAlgorithm::Sha256).hash_file(&path).unwrap();
        let chunked = Hasher::new(DigestAlgorithm::Sha256)
            .with_block_size(block)
            .hash_file(&path)
            .unwrap();

        prop_assert_eq!(whole, chunked);
    }

    #[test]
    fn test_bucketing_invariants(sizes in prop::collection::vec(0u64..100, 0..80)) {
        let records: Vec<FileRecord> = sizes
            .iter()
            .enumerate()
            .map(|(i, &size)| FileRecord::new(PathBuf::from(format!("/fake/{i}")), size))
            .collect();

        let (buckets, stats) = bucket_by_size(records.clone());

        // Every bucket member carries the bucket's size; no singletons, no empties.
        for (size, files) in &buckets {
            prop_assert!(*size > 0);
            prop_assert!(files.len() >= 2);
            for file in files {
                prop_assert_eq!(file.size, *size);
            }
        }

        prop_assert_eq!(stats.total_files, records.len());

        // Candidate count equals the sum over surviving buckets.
        let bucket_total: usize = buckets.values().map(Vec::len).sum();
        prop_assert_eq!(stats.candidates, bucket_total);

        // Flattening loses nothing and keeps ascending size order.
        let candidates = candidate_set(buckets);
        prop_assert_eq!(candidates.len(), bucket_total);
        let flat_sizes: Vec<u64> = candidates.iter().map(|f| f.size).collect();
        let mut sorted = flat_sizes.clone();
        sorted.sort_unstable();
        prop_assert_eq!(flat_sizes, sorted);
    }

    #[test]
    fn test_aggregation_invariants(
        entries in prop::collection::vec((1u64..20, 0u8..6), 0..60),
    ) {
        // Derive the digest from a small tag so collisions-within-size occur often.
        let outcomes: Vec<HashOutcome> = entries
            .iter()
            .enumerate()
            .map(|(i, &(size, tag))| HashOutcome::Success {
                path: PathBuf::from(format!("/fake/{i}")),
                size,
                digest: format!("{tag:02x}"),
            })
            .collect();

        let (groups, failures) = aggregate_outcomes(outcomes);

        prop_assert!(failures.is_empty());

        let mut grouped_paths = 0usize;
        for group in &groups {
            prop_assert!(group.len() >= 2);
            prop_assert_eq!(
                group.reclaimable_bytes,
                group.size * (group.len() as u64 - 1)
            );
            // Paths inside a group are sorted and unique.
            for pair in group.paths.windows(2) {
                prop_assert!(pair[0] < pair[1]);
            }
            grouped_paths += group.len();
        }

        // Every grouped path came from an input with matching (size, digest).
        let mut expected = std::collections::HashMap::<(u64, String), usize>::new();
        for &(size, tag) in &entries {
            *expected.entry((size, format!("{tag:02x}"))).or_default() += 1;
        }
        let expected_grouped: usize = expected.values().filter(|&&n| n >= 2).sum();
        prop_assert_eq!(grouped_paths, expected_grouped);

        // Deterministic ordering: reclaimable descending, digest ascending.
        for pair in groups.windows(2) {
            let ordered = pair[0].reclaimable_bytes > pair[1].reclaimable_bytes
                || (pair[0].reclaimable_bytes == pair[1].reclaimable_bytes
                    && pair[0].digest <= pair[1].digest);
            prop_assert!(ordered);
        }
    }
}
