//! The unit of work handed from the reader pool to the archiver: one
//! filesystem node with everything the tar header needs, plus the full
//! content for regular files.

use std::fs::Metadata;
use std::path::Path;
use std::time::UNIX_EPOCH;

/// Kind of node an [`Entry`] describes. Anything else on disk (symlinks,
/// sockets, devices) is skipped before an entry is ever built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File,
}

/// Header-relevant metadata captured at stat time.
#[derive(Debug, Clone, Copy)]
pub struct EntryMeta {
    /// Size in bytes at stat time. Directories report 0. For files this is
    /// advisory only: the header is sized from the bytes actually read.
    pub size: u64,
    /// Unix permission bits, with a conventional fallback elsewhere.
    pub mode: u32,
    /// Modification time in seconds since the epoch; 0 when unknown or
    /// before the epoch.
    pub mtime: u64,
}

impl EntryMeta {
    /// Capture what the tar header needs from a node's metadata.
    pub fn capture(meta: &Metadata, kind: EntryKind) -> Self {
        let size = match kind {
            EntryKind::File => meta.len(),
            EntryKind::Directory => 0,
        };
        let mtime = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self {
            size,
            mode: permission_bits(meta, kind),
            mtime,
        }
    }
}

/// One node staged for the archiver. Content ownership moves with the
/// entry, so a delivered file costs nothing further to write.
#[derive(Debug)]
pub struct Entry {
    /// Archive-relative name, forward-slash separated; `.` for the root.
    pub name: String,
    pub kind: EntryKind,
    pub meta: EntryMeta,
    /// Full file content; always `None` for directories.
    pub content: Option<Vec<u8>>,
}

impl Entry {
    pub fn directory(name: String, meta: EntryMeta) -> Self {
        Self {
            name,
            kind: EntryKind::Directory,
            meta,
            content: None,
        }
    }

    pub fn file(name: String, meta: EntryMeta, content: Vec<u8>) -> Self {
        Self {
            name,
            kind: EntryKind::File,
            meta,
            content: Some(content),
        }
    }

    /// Bytes the archiver will write for this entry's body.
    pub fn content_len(&self) -> u64 {
        self.content.as_ref().map(|c| c.len() as u64).unwrap_or(0)
    }
}

/// Compute the archive-relative name for `path` under `root`. The root
/// itself maps to `.`, everything below it to its normalized relative path.
pub fn archive_name(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    if rel.as_os_str().is_empty() {
        return ".".to_string();
    }
    normalize_name(&rel.to_string_lossy())
}

/// Normalize a relative path into tar form: forward slashes only, no
/// leading `./`, no doubled separators.
fn normalize_name(raw: &str) -> String {
    let slashed = raw.replace('\\', "/");
    let trimmed = slashed.strip_prefix("./").unwrap_or(&slashed);
    let mut name = trimmed.to_string();
    while name.contains("//") {
        name = name.replace("//", "/");
    }
    if name.is_empty() {
        name.push('.');
    }
    name
}

#[cfg(unix)]
fn permission_bits(meta: &Metadata, _kind: EntryKind) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn permission_bits(_meta: &Metadata, kind: EntryKind) -> u32 {
    match kind {
        EntryKind::Directory => 0o755,
        EntryKind::File => 0o644,
    }
}
