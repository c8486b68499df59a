//! Deterministic directory walker built on walkdir.
//!
//! Traversal is depth-first with lexicographic child ordering, so the same
//! tree always enumerates in the same order within a run. Symbolic links are
//! never followed (no cycle risk). Entries that cannot be opened or stat'ed
//! are yielded as [`ScanError`] values rather than stopping iteration; the
//! caller decides whether to log, collect, or abort.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::{FileRecord, ScanError};

/// Directory walker yielding `FileRecord`s for regular files.
#[derive(Debug)]
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
}

impl Walker {
    /// Create a new walker for the given root directory.
    ///
    /// The walker does not validate the root; callers that need an upfront
    /// existence check (like the duplicate finder) perform it themselves so
    /// they can fail fast before any traversal starts.
    #[must_use]
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    /// Walk the tree, yielding file records and recoverable errors.
    ///
    /// Directories themselves and symlinks are skipped silently (at trace
    /// level); unreadable entries become `Err(ScanError)` items.
    pub fn walk(&self) -> impl Iterator<Item = Result<FileRecord, ScanError>> + '_ {
        WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_map(move |entry_result| match entry_result {
                Ok(entry) => {
                    let path = entry.path();

                    if path == self.root {
                        return None;
                    }

                    let file_type = entry.file_type();
                    if file_type.is_dir() {
                        return None;
                    }
                    if file_type.is_symlink() {
                        log::trace!("Skipping symlink: {}", path.display());
                        return None;
                    }

                    let metadata = match entry.metadata() {
                        Ok(m) => m,
                        Err(e) => {
                            let io = e
                                .into_io_error()
                                .unwrap_or_else(|| std::io::Error::other("walk error"));
                            return Some(Err(self.handle_io_error(path.to_path_buf(), io)));
                        }
                    };

                    // FIFOs, sockets and the like are not duplicate candidates.
                    if !metadata.is_file() {
                        return None;
                    }

                    Some(Ok(FileRecord {
                        path: entry.into_path(),
                        size: metadata.len(),
                    }))
                }
                Err(e) => {
                    let path = e
                        .path()
                        .map_or_else(|| self.root.clone(), Path::to_path_buf);
                    let io = e
                        .into_io_error()
                        .unwrap_or_else(|| std::io::Error::other("walk error"));
                    Some(Err(self.handle_io_error(path, io)))
                }
            })
    }

    /// Log and classify an I/O error for an entry.
    fn handle_io_error(&self, path: PathBuf, error: std::io::Error) -> ScanError {
        use std::io::ErrorKind;

        match error.kind() {
            ErrorKind::PermissionDenied => {
                log::warn!("Permission denied: {}", path.display());
            }
            ErrorKind::NotFound => {
                log::debug!("Entry vanished during walk: {}", path.display());
            }
            _ => {
                log::warn!("I/O error for {}: {}", path.display(), error);
            }
        }
        ScanError::from_io(path, error)
    }
}
