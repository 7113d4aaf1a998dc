//! Command-line interface definition, built with `clap`'s derive API.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{Destination, RunConfig, DEFAULT_WORKERS};
use crate::error::Result;

/// Archive a directory tree into a tar stream, reading files in parallel.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Directory whose contents are archived.
    #[arg(short, long, default_value = ".")]
    pub dir: PathBuf,

    /// Output tar file, or `-` to stream the archive to standard output.
    #[arg(short, long, default_value = "output.tar")]
    pub out: PathBuf,

    /// Maximum number of files read concurrently.
    #[arg(short, long, default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,

    /// Append-only log file receiving the run's messages.
    #[arg(long, default_value = "partar.log")]
    pub log_file: PathBuf,
}

impl Args {
    /// Convert parsed flags into a validated run configuration.
    pub fn to_config(&self) -> Result<RunConfig> {
        RunConfig::new(
            self.dir.clone(),
            Destination::from_arg(&self.out),
            self.workers,
        )
    }
}
