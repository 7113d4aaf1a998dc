use std::path::PathBuf;

use thiserror::Error;

/// The primary error type for all operations in the `partar` crate.
///
/// Only the fatal conditions live here. Per-node problems during a run
/// (an unreadable file, a vanished directory entry) are logged and skipped
/// rather than surfaced as errors.
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// An I/O error tied to a specific filesystem path.
    #[error("I/O error on path '{}': {source}", path.display())]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },

    /// The source root exists but is something other than a directory.
    #[error("source path '{}' is not a directory", path.display())]
    NotADirectory { path: PathBuf },

    /// Writing one entry (header or content) to the archive stream failed.
    #[error("failed to write archive entry '{name}': {source}")]
    WriteEntry {
        name: String,
        source: std::io::Error,
    },

    /// Writing the archive terminator or flushing the stream failed.
    #[error("failed to finalize archive: {source}")]
    Finalize { source: std::io::Error },

    /// The log sink could not be opened. Nothing runs without one.
    #[error("cannot open log file '{}': {source}", path.display())]
    LogSink {
        source: std::io::Error,
        path: PathBuf,
    },

    /// The archiver task died without reporting an error of its own.
    #[error("archiver task panicked")]
    ArchiverPanicked,

    /// Rejected configuration, reported before any work starts.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ArchiveError {
    /// Attach a path to a bare I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ArchiveError::Io {
            source,
            path: path.into(),
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ArchiveError>;
