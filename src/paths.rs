//! Relative path normalization and interning
//!
//! Every file discovered on either side is identified by a cleaned,
//! forward-slash relative path. Both walks can observe the same path, so the
//! interner hands out a shared `Arc<str>` per distinct path to keep one copy
//! of the string no matter how many records reference it.

use crate::error::SetupError;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Lexically clean a relative path: forward slashes only, no empty or `.`
/// segments, `..` resolved against earlier segments.
pub fn normalize_rel(rel: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for segment in rel.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|last| *last != "..") {
                    parts.pop();
                } else {
                    parts.push("..");
                }
            }
            other => parts.push(other),
        }
    }
    parts.join("/")
}

/// Join `rel` onto `root`, rejecting paths whose cleaned form escapes the root.
pub fn resolve_under(root: &Path, rel: &str) -> Option<PathBuf> {
    let clean = normalize_rel(rel);
    if clean == ".." || clean.starts_with("../") {
        return None;
    }
    if clean.is_empty() {
        return Some(root.to_path_buf());
    }
    Some(root.join(clean))
}

/// Returns Ok if path is an existing directory; otherwise a setup error.
pub fn ensure_dir(side: &'static str, path: &Path) -> Result<(), SetupError> {
    let meta = std::fs::metadata(path).map_err(|e| SetupError::RootUnreadable {
        side,
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    if !meta.is_dir() {
        return Err(SetupError::RootNotADirectory {
            side,
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

/// Deduplicates relative-path strings across both walks.
///
/// `intern` returns the same `Arc<str>` for inputs that are equal after
/// normalization, so equal paths share storage and compare by pointer when
/// it matters. Safe for concurrent callers; entries are never evicted.
pub struct PathInterner {
    seen: Mutex<HashSet<Arc<str>>>,
}

impl PathInterner {
    pub fn new() -> Self {
        Self {
            seen: Mutex::new(HashSet::new()),
        }
    }

    /// Normalize and intern a relative path.
    pub fn intern(&self, rel: &str) -> Arc<str> {
        let clean = normalize_rel(rel);
        let mut seen = self.seen.lock().expect("path interner poisoned");
        if let Some(existing) = seen.get(clean.as_str()) {
            return Arc::clone(existing);
        }
        let entry: Arc<str> = Arc::from(clean.as_str());
        seen.insert(Arc::clone(&entry));
        entry
    }

    /// Number of distinct interned paths.
    pub fn len(&self) -> usize {
        self.seen.lock().expect("path interner poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for PathInterner {
    fn default() -> Self {
        Self::new()
    }
}
