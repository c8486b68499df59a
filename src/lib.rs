//! dupescan - parallel duplicate file finder.
//!
//! Finds sets of files with identical content using a two-phase filter:
//! files are first grouped by exact size (different sizes can never be
//! duplicates), then the survivors are content-hashed in parallel across a
//! bounded worker pool and merged into duplicate groups ordered by
//! reclaimable space.
//!
//! The engine is a pure in-process computation: give it a root directory,
//! get back ordered [`duplicates::DuplicateGroup`]s plus a
//! [`duplicates::ScanSummary`] with counts and warnings. The CLI in
//! `main.rs` is a thin rendering layer over it.

pub mod cli;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::sync::Arc;

use anyhow::Result;
use bytesize::ByteSize;
use serde::Serialize;

use cli::{Cli, OutputFormat};
use duplicates::{DuplicateFinder, DuplicateGroup, FinderConfig, ScanSummary};
use error::ExitCode;
use progress::{Progress, ProgressObserver};

/// JSON payload for `--output json`.
#[derive(Serialize)]
struct JsonReport<'a> {
    groups: &'a [DuplicateGroup],
    total_files: usize,
    total_size: u64,
    candidates: usize,
    duplicate_groups: usize,
    duplicate_files: usize,
    reclaimable_bytes: u64,
    warnings: Vec<String>,
}

/// Run the application: scan, render, pick an exit code.
///
/// # Errors
///
/// Returns the underlying [`duplicates::FinderError`] (wrapped in anyhow)
/// for an invalid root or a cancelled run; `main` maps those to exit codes.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    let handler = signal::install_handler()?;

    // The bar would corrupt piped JSON, so only attach it for text output.
    let show_progress = !cli.quiet && cli.output == OutputFormat::Text;
    let observer: Arc<dyn ProgressObserver> = Arc::new(Progress::new(!show_progress));

    let config = FinderConfig::default()
        .with_workers(cli.workers)
        .with_algorithm(cli.algorithm.into())
        .with_verify(cli.verify)
        .with_shutdown_flag(handler.get_flag())
        .with_observer(observer);

    let finder = DuplicateFinder::new(config);
    let (groups, summary) = finder.find_duplicates(&cli.path)?;

    match cli.output {
        OutputFormat::Text => render_text(&groups, &summary, cli.quiet),
        OutputFormat::Json => render_json(&groups, &summary)?,
    }

    Ok(if groups.is_empty() && !summary.has_warnings() {
        ExitCode::NoDuplicates
    } else if summary.has_warnings() {
        ExitCode::PartialSuccess
    } else {
        ExitCode::Success
    })
}

fn render_text(groups: &[DuplicateGroup], summary: &ScanSummary, quiet: bool) {
    for group in groups {
        println!(
            "{}  {} files x {}  ({} reclaimable)",
            &group.digest,
            group.len(),
            ByteSize::b(group.size),
            ByteSize::b(group.reclaimable_bytes)
        );
        for path in &group.paths {
            println!("    {}", path.display());
        }
    }

    if !quiet {
        println!(
            "\n{} files scanned, {} candidates hashed, {} duplicate groups, {} reclaimable",
            summary.total_files,
            summary.candidates,
            summary.duplicate_groups,
            ByteSize::b(summary.reclaimable_bytes)
        );
        if summary.has_warnings() {
            eprintln!("{} entries could not be read:", summary.warnings.len());
            for warning in &summary.warnings {
                eprintln!("    {warning}");
            }
        }
    }
}

fn render_json(groups: &[DuplicateGroup], summary: &ScanSummary) -> Result<()> {
    let report = JsonReport {
        groups,
        total_files: summary.total_files,
        total_size: summary.total_size,
        candidates: summary.candidates,
        duplicate_groups: summary.duplicate_groups,
        duplicate_files: summary.duplicate_files,
        reclaimable_bytes: summary.reclaimable_bytes,
        warnings: summary.warnings.iter().map(ToString::to_string).collect(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
