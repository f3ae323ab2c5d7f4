//! Non-recursive listing of a single directory
//!
//! Returns named subdirectories and regular files only. Symbolic links are
//! excluded without following them; devices, sockets, and FIFOs are skipped.
//! Failure to open or read the directory is returned to the caller, which
//! decides whether to log-and-continue or abort.

use crate::model::FileMeta;
use std::io;
use std::path::Path;

/// One entry from a directory listing
#[derive(Debug, Clone)]
pub enum ListedEntry {
    /// A subdirectory to descend into
    Dir { name: String },

    /// A regular file with its walk-time metadata
    File { name: String, meta: FileMeta },
}

/// List one directory, in batches of `batch_hint` entries at a time.
///
/// The batch hint sizes the output buffer; the underlying reads are
/// whatever `read_dir` performs, which batches getdents internally.
pub fn list_directory(abs: &Path, batch_hint: usize) -> io::Result<Vec<ListedEntry>> {
    let mut out = Vec::with_capacity(batch_hint.min(4096));
    for entry in std::fs::read_dir(abs)? {
        let entry = match entry {
            Ok(e) => e,
            // An unreadable entry mid-listing abandons the rest of this
            // directory, same as a failed open.
            Err(e) => return Err(e),
        };
        let name = entry.file_name().to_string_lossy().into_owned();
        if name == "." || name == ".." {
            continue;
        }

        // file_type() does not follow symlinks, so a link to a directory is
        // still reported as a symlink and excluded here.
        let file_type = match entry.file_type() {
            Ok(t) => t,
            Err(_) => continue,
        };
        if file_type.is_symlink() {
            continue;
        }
        if file_type.is_dir() {
            out.push(ListedEntry::Dir { name });
            continue;
        }
        if !file_type.is_file() {
            // Devices, sockets, FIFOs.
            continue;
        }

        let meta = match entry.metadata() {
            Ok(m) => FileMeta::from_fs(&m),
            Err(_) => continue,
        };
        out.push(ListedEntry::File { name, meta });
    }
    Ok(out)
}
