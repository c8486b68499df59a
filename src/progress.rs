//! Progress reporting for the hashing phase.
//!
//! The engine is decoupled from presentation through the [`ProgressObserver`]
//! trait: the scheduler reports running completion counts, and whatever the
//! caller plugs in decides how to show them. The crate ships [`Progress`], an
//! indicatif-backed observer used by the CLI.

use std::sync::Mutex;

use indicatif::{ProgressBar, ProgressStyle};

/// Observer notified as hashing work completes.
///
/// Called after each worker chunk finishes, with the running number of
/// completed files and the total candidate count. Implementations must be
/// cheap: the scheduler invokes this from worker threads. A panicking
/// observer is caught and logged by the scheduler, never propagated.
pub trait ProgressObserver: Send + Sync {
    /// A worker chunk finished; `completed` of `total` files are done.
    fn chunk_completed(&self, completed: usize, total: usize);
}

/// Terminal progress bar observer.
pub struct Progress {
    bar: Mutex<Option<ProgressBar>>,
    quiet: bool,
}

impl Progress {
    /// Create a progress reporter; `quiet` suppresses all output.
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            bar: Mutex::new(None),
            quiet,
        }
    }

    fn style() -> ProgressStyle {
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█>-")
    }
}

impl ProgressObserver for Progress {
    fn chunk_completed(&self, completed: usize, total: usize) {
        if self.quiet {
            return;
        }

        let mut guard = self.bar.lock().unwrap();
        let bar = guard.get_or_insert_with(|| {
            let pb = ProgressBar::new(total as u64);
            pb.set_style(Self::style());
            pb.set_message("Hashing");
            pb
        });

        bar.set_position(completed as u64);
        if completed >= total {
            bar.finish_with_message("Hashing complete");
        }
    }
}
