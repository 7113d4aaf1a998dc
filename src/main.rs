//! Main entry point for the partar CLI app

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, Level};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use partar::cli::Args;
use partar::error::{ArchiveError, Result};
use partar::pipeline;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = run_app().await {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

async fn run_app() -> Result<()> {
    let args = Args::parse();

    // Nothing runs without a log sink; keep the guard alive until exit so
    // buffered lines are flushed.
    let _log_guard = init_logging(&args.log_file)?;

    let config = args.to_config()?;
    match pipeline::run(&config).await {
        Ok(summary) => {
            // Stderr, not stdout: the archive itself may be on stdout.
            eprintln!(
                "[partar] Archive complete | Entries: {}/{} | Time: {:.2}s",
                summary.processed_entries,
                summary.total_entries,
                summary.duration.as_secs_f64()
            );
            Ok(())
        }
        Err(err) => {
            error!(error = %err, "archive run failed");
            Err(err)
        }
    }
}

/// Open the append-only log file and install it as the tracing sink.
/// Default level is INFO; `RUST_LOG` overrides it.
fn init_logging(path: &Path) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| ArchiveError::LogSink {
            source: e,
            path: path.to_path_buf(),
        })?;

    let (writer, guard) = tracing_appender::non_blocking(file);
    let filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();
    let file_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_target(false)
        .with_writer(writer)
        .with_filter(filter);

    tracing_subscriber::registry().with(file_layer).init();
    Ok(guard)
}
