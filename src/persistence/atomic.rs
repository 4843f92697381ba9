//! Whole-file replacement that never leaves a half-written file behind.
//!
//! Content goes to a sibling temp file, which is synced and then renamed over
//! the destination. The parent directory is synced afterwards so the rename
//! itself survives a power loss.

use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Suffix appended to the destination file name for the temp file.
pub const TMP_SUFFIX: &str = ".tmp";

/// Returns the temp path used while replacing `path`.
pub fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(TMP_SUFFIX);
    path.with_file_name(name)
}

/// Replaces the contents of `path` with `bytes`.
///
/// The parent directory must already exist. On error the destination is
/// either untouched or fully replaced, and the temp file is removed on a
/// best-effort basis.
///
/// # Side effects of replacing by rename
///
/// - An error from the final directory sync is returned even though the
///   rename already happened, so the new content is in place but may not be
///   durable yet.
/// - The destination becomes a new inode: it takes the temp file's default
///   permissions rather than the old file's, and hard links to the old file
///   keep the old content.
pub fn replace_file(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let tmp = tmp_path(path);

    let written = write_synced(&tmp, bytes).and_then(|()| std::fs::rename(&tmp, path));
    if let Err(e) = written {
        let _ = std::fs::remove_file(&tmp);
        return Err(e);
    }

    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fsync_dir(parent),
        _ => fsync_dir(Path::new(".")),
    }
}

fn write_synced(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)?;
    file.write_all(bytes)?;
    fsync_file(&file)
}

/// Syncs a file's contents and metadata to disk.
pub fn fsync_file(file: &File) -> io::Result<()> {
    file.sync_all()
}

/// Syncs a directory so that entries created or renamed in it are durable.
pub fn fsync_dir(dir_path: &Path) -> io::Result<()> {
    File::open(dir_path)?.sync_all()
}
