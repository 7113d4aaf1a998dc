//! The serializing archiver: sole consumer of the hand-off channel and the
//! only code that touches the tar stream.
//!
//! Entries arrive in read-completion order, not traversal order, because
//! many readers race to the channel; the archive simply inherits that
//! order. After a write failure the loop keeps receiving and discarding so
//! that producers blocked on a full channel can still finish.

use std::io::{self, Write};

use tar::{Builder, EntryType, Header};
use tokio::sync::mpsc::Receiver;
use tracing::{debug, error};

use crate::cancel::Cancellation;
use crate::config::Destination;
use crate::entry::{Entry, EntryKind};
use crate::error::{ArchiveError, Result};

/// Open the destination sink for the run. Files are created or truncated;
/// the sink stays open for the whole run.
pub fn open_destination(destination: &Destination) -> Result<Box<dyn Write + Send>> {
    match destination {
        Destination::File(path) => {
            let file = std::fs::File::create(path).map_err(|e| ArchiveError::io(path, e))?;
            Ok(Box::new(file))
        }
        Destination::Stdout => Ok(Box::new(io::stdout())),
    }
}

/// Drain the hand-off channel into `sink` until every producer is gone.
///
/// Runs on a blocking thread. Returns normally even when the run fails;
/// the error travels through the shared cancellation state, which this
/// function flips on the first write failure.
pub fn drain(mut rx: Receiver<Entry>, sink: Box<dyn Write + Send>, cancel: &Cancellation) {
    let mut builder = Builder::new(sink);
    while let Some(entry) = rx.blocking_recv() {
        if cancel.is_failed() {
            // Keep receiving so blocked senders can unwind.
            continue;
        }
        match append(&mut builder, &entry) {
            Ok(()) => {
                debug!(name = %entry.name, bytes = entry.content_len(), "entry archived");
            }
            Err(err) => {
                error!(name = %entry.name, error = %err, "archive write failed");
                cancel.fail(err);
            }
        }
    }
    if !cancel.is_failed() {
        if let Err(err) = finish(builder) {
            cancel.fail(err);
        }
    }
}

/// Write one entry: a header sized from the bytes in hand, then the body.
///
/// The header size deliberately comes from the content read earlier, not
/// from stat-time metadata; a file that changed in between still produces
/// a self-consistent archive.
fn append(builder: &mut Builder<Box<dyn Write + Send>>, entry: &Entry) -> Result<()> {
    let mut header = Header::new_gnu();
    header.set_mode(entry.meta.mode);
    header.set_mtime(entry.meta.mtime);
    header.set_uid(0);
    header.set_gid(0);
    let result = match entry.kind {
        EntryKind::Directory => {
            header.set_entry_type(EntryType::Directory);
            header.set_size(0);
            builder.append_data(&mut header, &entry.name, io::empty())
        }
        EntryKind::File => {
            let content = entry.content.as_deref().unwrap_or(&[]);
            header.set_entry_type(EntryType::Regular);
            header.set_size(content.len() as u64);
            builder.append_data(&mut header, &entry.name, content)
        }
    };
    result.map_err(|e| ArchiveError::WriteEntry {
        name: entry.name.clone(),
        source: e,
    })
}

/// Write the tar terminator and flush the sink.
fn finish(builder: Builder<Box<dyn Write + Send>>) -> Result<()> {
    let mut sink = builder
        .into_inner()
        .map_err(|e| ArchiveError::Finalize { source: e })?;
    sink.flush().map_err(|e| ArchiveError::Finalize { source: e })
}
