//! The concurrent collection pipeline: enumerate the tree, read file
//! contents through a bounded pool, and hand finished entries to the
//! single archiver task over a fixed-capacity channel.
//!
//! The control task performs both traversal passes and spawns one reader
//! task per entry. File content in flight is bounded by the read permits
//! plus the channel capacity; the per-entry task bookkeeping itself still
//! scales with tree size. Entry ordering in the archive is read-completion
//! order.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::archiver;
use crate::cancel::Cancellation;
use crate::config::RunConfig;
use crate::entry::{archive_name, Entry, EntryKind, EntryMeta};
use crate::error::{ArchiveError, Result};
use crate::progress::RunCounters;
use crate::walk::{self, Exclusions, Verdict};

/// Final tally of a successful run.
#[derive(Debug)]
pub struct RunSummary {
    /// Entries the counting pass expected.
    pub total_entries: u64,
    /// Entries actually handed to the archiver.
    pub processed_entries: u64,
    /// Wall-clock duration of the whole run.
    pub duration: Duration,
}

/// Archive `config.root` into `config.destination`.
///
/// The root is validated before the destination is opened, so a run that
/// never starts also never truncates an existing archive at the
/// destination path.
pub async fn run(config: &RunConfig) -> Result<RunSummary> {
    let root = walk::resolve_root(&config.root)?;
    let sink = archiver::open_destination(&config.destination)?;
    run_rooted(config, root, sink).await
}

/// Archive into an already-open sink.
///
/// The destination in `config` is only consulted for self-exclusion here;
/// the bytes go to `sink`. This is also the seam tests inject through.
pub async fn run_with_sink(config: &RunConfig, sink: Box<dyn Write + Send>) -> Result<RunSummary> {
    let root = walk::resolve_root(&config.root)?;
    run_rooted(config, root, sink).await
}

async fn run_rooted(
    config: &RunConfig,
    root: PathBuf,
    sink: Box<dyn Write + Send>,
) -> Result<RunSummary> {
    let started = Instant::now();

    let own_binary = std::env::current_exe().ok();
    let exclusions = Exclusions::new(config.destination.path(), own_binary.as_deref());

    let total = walk::count_entries(&root, &exclusions);
    info!(root = %root.display(), workers = config.workers, total, "starting archive run");

    let cancel = Arc::new(Cancellation::new());
    let counters = Arc::new(RunCounters::new(total, config.progress_interval));
    let permits = Arc::new(Semaphore::new(config.workers));
    let (tx, rx) = mpsc::channel::<Entry>(config.channel_capacity());

    // Sole consumer; owns the tar builder for the whole run.
    let archiver_cancel = Arc::clone(&cancel);
    let archiver_task =
        tokio::task::spawn_blocking(move || archiver::drain(rx, sink, &archiver_cancel));

    let mut readers = JoinSet::new();
    for item in walk::walker(&root) {
        // Stop scheduling as soon as a failure is known.
        if cancel.is_failed() {
            debug!("failure observed during traversal, no further entries scheduled");
            break;
        }
        let node = match item {
            Ok(node) => node,
            Err(err) => {
                warn!(path = ?err.path(), error = %err, "cannot access node, skipped");
                continue;
            }
        };
        let kind = match walk::classify(&node, &exclusions) {
            Verdict::Archive(kind) => kind,
            Verdict::Excluded => {
                info!(path = %node.path().display(), "skipped own output or binary");
                continue;
            }
            Verdict::Special => {
                debug!(path = %node.path().display(), "skipped non-regular node");
                continue;
            }
        };
        let meta = match node.metadata() {
            Ok(meta) => meta,
            Err(err) => {
                warn!(path = %node.path().display(), error = %err, "cannot stat node, skipped");
                continue;
            }
        };
        let name = archive_name(&root, node.path());
        readers.spawn(read_and_deliver(
            node.into_path(),
            name,
            kind,
            EntryMeta::capture(&meta, kind),
            Arc::clone(&permits),
            tx.clone(),
            Arc::clone(&cancel),
            Arc::clone(&counters),
        ));
    }

    // Every reader must have delivered or abandoned before the channel may
    // close; closing it is what tells the archiver the stream is over.
    while let Some(joined) = readers.join_next().await {
        if let Err(err) = joined {
            warn!(error = %err, "reader task aborted");
        }
    }
    drop(tx);

    archiver_task
        .await
        .map_err(|_| ArchiveError::ArchiverPanicked)?;

    if let Some(err) = cancel.take_error() {
        return Err(err);
    }

    let summary = RunSummary {
        total_entries: total,
        processed_entries: counters.processed(),
        duration: started.elapsed(),
    };
    info!(
        processed = summary.processed_entries,
        total = summary.total_entries,
        elapsed_ms = summary.duration.as_millis() as u64,
        "archive run complete"
    );
    Ok(summary)
}

/// One reader task: acquire a read permit if the node is a file, read it,
/// release the permit, then race delivery against cancellation.
///
/// The permit covers only the read. It is released before the send so a
/// slow archiver can never hold read slots hostage.
#[allow(clippy::too_many_arguments)]
async fn read_and_deliver(
    path: PathBuf,
    name: String,
    kind: EntryKind,
    meta: EntryMeta,
    permits: Arc<Semaphore>,
    tx: mpsc::Sender<Entry>,
    cancel: Arc<Cancellation>,
    counters: Arc<RunCounters>,
) {
    if cancel.is_failed() {
        return;
    }
    let entry = match kind {
        EntryKind::Directory => Entry::directory(name, meta),
        EntryKind::File => {
            let permit = tokio::select! {
                acquired = Arc::clone(&permits).acquire_owned() => match acquired {
                    Ok(permit) => permit,
                    Err(_) => return,
                },
                _ = cancel.cancelled() => return,
            };
            let content = match tokio::fs::read(&path).await {
                Ok(content) => content,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "cannot read file, entry dropped");
                    return;
                }
            };
            drop(permit);
            if content.len() as u64 != meta.size {
                debug!(
                    path = %path.display(),
                    stat_size = meta.size,
                    read_size = content.len() as u64,
                    "file changed size between stat and read"
                );
            }
            Entry::file(name, meta, content)
        }
    };
    tokio::select! {
        sent = tx.send(entry) => {
            if sent.is_ok() {
                counters.record_delivered();
            }
        }
        _ = cancel.cancelled() => {
            // Delivery abandoned; the run is already failing.
        }
    }
}
