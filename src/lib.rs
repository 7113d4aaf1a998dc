//! # partar Core Library
//!
//! This crate provides the core functionality for the `partar` archiver: it
//! walks a directory tree, reads file contents through a bounded pool of
//! concurrent readers, and streams everything into a tar archive written by
//! a single serializing task.
//!
//! It is designed to be used by the `partar` command-line application, but
//! the public API can also drive archiving runs programmatically.
//!
//! ## Key Modules
//!
//! - [`pipeline`]: Wires enumeration, the reader pool, and the archiver
//!   together for one run.
//! - [`walk`]: Tree enumeration and the shared skip predicate.
//! - [`archiver`]: The single consumer that owns the tar stream.
//! - [`cancel`]: Run-wide one-way failure state with a wakeup broadcast.
//! - [`config`]: Validated run configuration.
//!
//! ## Examples
//!
//! ```no_run
//! use partar::config::{Destination, RunConfig};
//!
//! # async fn demo() -> Result<(), partar::ArchiveError> {
//! let config = RunConfig::new(
//!     "data".into(),
//!     Destination::File("data.tar".into()),
//!     16,
//! )?;
//! let summary = partar::pipeline::run(&config).await?;
//! println!("{} entries archived", summary.processed_entries);
//! # Ok(())
//! # }
//! ```

pub mod archiver;
pub mod cancel;
pub mod cli;
pub mod config;
pub mod entry;
pub mod error;
pub use error::ArchiveError;

pub mod pipeline;
pub mod progress;
pub mod walk;

pub use pipeline::RunSummary;
