//! Command-line interface definitions.
//!
//! A single flat command: point dupescan at a directory and it reports
//! duplicate groups. Everything else is tuning.
//!
//! # Example
//!
//! ```bash
//! # Scan a directory
//! dupescan ~/Downloads
//!
//! # Machine-readable output with 8 workers
//! dupescan ~/Downloads --workers 8 --output json
//!
//! # Stronger digest plus byte-for-byte confirmation
//! dupescan ~/Downloads --algorithm sha256 --verify
//! ```

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::scanner::DigestAlgorithm;

/// Parallel duplicate file finder.
///
/// Groups files by size, hashes the survivors in parallel, and reports sets
/// of identical files ordered by how much space removing them would free.
#[derive(Debug, Parser)]
#[command(name = "dupescan")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory to scan for duplicates
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Number of hashing workers (minimum 1)
    #[arg(short, long, value_name = "N", default_value = "4")]
    pub workers: usize,

    /// Digest algorithm for content hashing
    #[arg(short, long, value_enum, default_value = "md5")]
    pub algorithm: AlgorithmArg,

    /// Confirm each group byte-for-byte before reporting it
    ///
    /// Slower, but rules out digest collisions entirely.
    #[arg(long)]
    pub verify: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress output and all logging except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Emit fatal errors as JSON on stderr
    #[arg(long)]
    pub json_errors: bool,
}

/// Digest algorithm choices exposed on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AlgorithmArg {
    /// MD5 (default; fast, adequate for dedup)
    Md5,
    /// SHA-1
    Sha1,
    /// SHA-256
    Sha256,
    /// BLAKE3
    Blake3,
}

impl From<AlgorithmArg> for DigestAlgorithm {
    fn from(arg: AlgorithmArg) -> Self {
        match arg {
            AlgorithmArg::Md5 => Self::Md5,
            AlgorithmArg::Sha1 => Self::Sha1,
            AlgorithmArg::Sha256 => Self::Sha256,
            AlgorithmArg::Blake3 => Self::Blake3,
        }
    }
}

/// Output format for scan results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable report
    Text,
    /// JSON for scripting
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_minimal() {
        let cli = Cli::try_parse_from(["dupescan", "/tmp"]).unwrap();

        assert_eq!(cli.path, PathBuf::from("/tmp"));
        assert_eq!(cli.workers, 4);
        assert_eq!(cli.algorithm, AlgorithmArg::Md5);
        assert_eq!(cli.output, OutputFormat::Text);
        assert!(!cli.verify);
        assert!(!cli.quiet);
    }

    #[test]
    fn test_cli_parses_full() {
        let cli = Cli::try_parse_from([
            "dupescan",
            "/data",
            "--workers",
            "8",
            "--algorithm",
            "sha256",
            "--verify",
            "--output",
            "json",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.workers, 8);
        assert_eq!(cli.algorithm, AlgorithmArg::Sha256);
        assert!(cli.verify);
        assert_eq!(cli.output, OutputFormat::Json);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_cli_requires_path() {
        assert!(Cli::try_parse_from(["dupescan"]).is_err());
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["dupescan", "/tmp", "-q", "-v"]).is_err());
    }

    #[test]
    fn test_algorithm_conversion() {
        assert_eq!(
            DigestAlgorithm::from(AlgorithmArg::Blake3),
            DigestAlgorithm::Blake3
        );
        assert_eq!(DigestAlgorithm::from(AlgorithmArg::Md5), DigestAlgorithm::Md5);
    }
}
