//! Runtime configuration for an archiving run.
//!
//! A [`RunConfig`] is validated once, up front, and then treated as
//! immutable for the life of the run. Everything the pipeline needs to
//! size its machinery (reader pool, hand-off channel) derives from it.

use std::path::{Path, PathBuf};

use crate::error::{ArchiveError, Result};

/// Default cap on simultaneous file reads.
pub const DEFAULT_WORKERS: usize = 16;

/// Largest accepted reader pool. Past a few hundred readers the disk is
/// the bottleneck, and the pool and channel sizes must stay well inside
/// what the runtime's semaphore can represent.
pub const MAX_WORKERS: usize = 512;

/// A progress line is logged every this many delivered entries.
pub const PROGRESS_INTERVAL: u64 = 1000;

/// Where the finished tar stream goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Create (or truncate) a regular file at this path.
    File(PathBuf),
    /// Stream straight to standard output.
    Stdout,
}

impl Destination {
    /// Parse the command-line form: `-` selects standard output.
    pub fn from_arg(raw: &Path) -> Self {
        if raw == Path::new("-") {
            Destination::Stdout
        } else {
            Destination::File(raw.to_path_buf())
        }
    }

    /// The destination path, when the destination is a file.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Destination::File(path) => Some(path),
            Destination::Stdout => None,
        }
    }
}

/// Validated configuration for one archiving run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Directory tree to archive.
    pub root: PathBuf,
    /// Where the tar stream is written.
    pub destination: Destination,
    /// Maximum number of files read concurrently.
    pub workers: usize,
    /// Delivered-entry interval between progress log lines.
    pub progress_interval: u64,
}

impl RunConfig {
    /// Build a validated configuration. `workers` must be between 1 and
    /// [`MAX_WORKERS`]; the reader pool and the hand-off channel are both
    /// sized from it.
    pub fn new(root: PathBuf, destination: Destination, workers: usize) -> Result<Self> {
        if workers == 0 {
            return Err(ArchiveError::Config(
                "workers must be at least 1".to_string(),
            ));
        }
        if workers > MAX_WORKERS {
            return Err(ArchiveError::Config(format!(
                "workers must not exceed {MAX_WORKERS}"
            )));
        }
        Ok(Self {
            root,
            destination,
            workers,
            progress_interval: PROGRESS_INTERVAL,
        })
    }

    /// Capacity of the hand-off channel between the reader pool and the
    /// archiver. Twice the pool size keeps readers busy while the archiver
    /// drains, without letting file contents pile up unboundedly.
    pub fn channel_capacity(&self) -> usize {
        (self.workers * 2).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dash_selects_stdout() {
        assert_eq!(Destination::from_arg(Path::new("-")), Destination::Stdout);
        assert_eq!(
            Destination::from_arg(Path::new("out.tar")),
            Destination::File(PathBuf::from("out.tar"))
        );
    }

    #[test]
    fn stdout_has_no_path() {
        assert!(Destination::Stdout.path().is_none());
        assert_eq!(
            Destination::File(PathBuf::from("a.tar")).path(),
            Some(Path::new("a.tar"))
        );
    }

    #[test]
    fn zero_workers_rejected() {
        let err = RunConfig::new(PathBuf::from("."), Destination::Stdout, 0);
        assert!(err.is_err());
    }

    #[test]
    fn worker_count_is_capped() {
        assert!(RunConfig::new(PathBuf::from("."), Destination::Stdout, MAX_WORKERS).is_ok());
        assert!(RunConfig::new(PathBuf::from("."), Destination::Stdout, MAX_WORKERS + 1).is_err());
        assert!(RunConfig::new(PathBuf::from("."), Destination::Stdout, usize::MAX).is_err());
    }

    #[test]
    fn channel_capacity_tracks_workers() {
        let config = RunConfig::new(PathBuf::from("."), Destination::Stdout, 16).unwrap();
        assert_eq!(config.channel_capacity(), 32);
        let config = RunConfig::new(PathBuf::from("."), Destination::Stdout, 1).unwrap();
        assert_eq!(config.channel_capacity(), 2);
    }
}
