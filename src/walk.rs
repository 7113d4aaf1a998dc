//! Tree enumeration: root validation, the counting pass, and the skip
//! predicate shared by both traversals.
//!
//! The pipeline walks the tree twice, once to count and once to dispatch.
//! Both passes run the same [`classify`] predicate over the same walker
//! configuration, so the progress total always matches the set of entries
//! the dispatch pass will schedule.

use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use crate::entry::EntryKind;
use crate::error::{ArchiveError, Result};

/// Paths held out of the walk so a run never archives its own output or
/// the running binary.
#[derive(Debug, Default)]
pub struct Exclusions {
    destination: Option<PathBuf>,
    own_binary: Option<PathBuf>,
}

impl Exclusions {
    /// Canonicalize the destination and self-binary paths for comparison
    /// against walked nodes. A path that cannot be canonicalized (stdout
    /// destination, unusual exec environments) simply excludes nothing.
    pub fn new(destination: Option<&Path>, own_binary: Option<&Path>) -> Self {
        Self {
            destination: destination.and_then(canonical),
            own_binary: own_binary.and_then(canonical),
        }
    }

    fn matches(&self, path: &Path) -> bool {
        self.destination.as_deref() == Some(path) || self.own_binary.as_deref() == Some(path)
    }
}

fn canonical(path: &Path) -> Option<PathBuf> {
    std::fs::canonicalize(path).ok()
}

/// Validate the source root and return its canonical form.
///
/// Walking the canonical root keeps every visited path canonical without a
/// per-node syscall: the walker never follows symlinks, so each component
/// below the root is a real directory entry.
pub fn resolve_root(root: &Path) -> Result<PathBuf> {
    let meta = std::fs::metadata(root).map_err(|e| ArchiveError::io(root, e))?;
    if !meta.is_dir() {
        return Err(ArchiveError::NotADirectory {
            path: root.to_path_buf(),
        });
    }
    std::fs::canonicalize(root).map_err(|e| ArchiveError::io(root, e))
}

/// The walker both passes use. Symlinks are not followed; a link is a leaf
/// and gets skipped by [`classify`] like any other special node.
pub fn walker(root: &Path) -> WalkDir {
    WalkDir::new(root)
}

/// Outcome of the shared skip predicate for one visited node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Schedule the node as an archive entry of this kind.
    Archive(EntryKind),
    /// The node is the destination archive or the running binary.
    Excluded,
    /// Neither a directory nor a regular file.
    Special,
}

/// Classify one visited node. Every skip decision either pass makes goes
/// through here.
pub fn classify(entry: &DirEntry, exclusions: &Exclusions) -> Verdict {
    if exclusions.matches(entry.path()) {
        return Verdict::Excluded;
    }
    let file_type = entry.file_type();
    if file_type.is_dir() {
        Verdict::Archive(EntryKind::Directory)
    } else if file_type.is_file() {
        Verdict::Archive(EntryKind::File)
    } else {
        Verdict::Special
    }
}

/// Counting pass: how many entries the dispatch pass will schedule.
///
/// Unreadable nodes are skipped here just as the dispatch pass skips them;
/// the dispatch pass owns the user-visible logging for those, so this pass
/// stays quiet about them.
pub fn count_entries(root: &Path, exclusions: &Exclusions) -> u64 {
    let mut total = 0u64;
    for item in walker(root) {
        match item {
            Ok(entry) => {
                if matches!(classify(&entry, exclusions), Verdict::Archive(_)) {
                    total += 1;
                }
            }
            Err(err) => {
                debug!(path = ?err.path(), error = %err, "counting pass skipped unreadable node");
            }
        }
    }
    total
}
