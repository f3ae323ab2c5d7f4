//! Core data types shared across the pipeline
//!
//! Everything here is plain data: which side a path was seen on, the cached
//! size/mtime from the walk, the jobs handed to compare workers, and the
//! records the pipeline streams out.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Which tree (left or right) a path was seen on
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

/// Seconds since the Unix epoch, truncated toward zero.
///
/// Filesystems disagree about sub-second mtime precision, so every mtime is
/// reduced to whole seconds the moment it enters the system and all equality
/// checks are plain integer comparisons.
pub fn unix_seconds(t: SystemTime) -> i64 {
    match t.duration_since(UNIX_EPOCH) {
        Ok(d) => d.as_secs() as i64,
        Err(e) => -(e.duration().as_secs() as i64),
    }
}

/// Size and second-truncated mtime for one file, cached from the walk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileMeta {
    /// File size in bytes
    pub size: u64,

    /// Modification time as truncated Unix seconds
    pub mtime: i64,
}

impl FileMeta {
    /// Extract size and truncated mtime from filesystem metadata.
    pub fn from_fs(meta: &std::fs::Metadata) -> Self {
        let mtime = meta.modified().map(unix_seconds).unwrap_or(0);
        Self {
            size: meta.len(),
            mtime,
        }
    }
}

/// Cached metadata for both sides of a pair
#[derive(Debug, Clone, Copy)]
pub struct PairInfo {
    pub left: FileMeta,
    pub right: FileMeta,
}

/// One pair queued for content comparison, with the walk-time metadata the
/// result record needs even when hashing fails
#[derive(Debug, Clone)]
pub struct PairJob {
    pub rel: Arc<str>,
    pub cached: PairInfo,
}

/// The closed set of reason strings carried by diff records
pub mod reason {
    pub const SIZE_CHANGED: &str = "size changed";
    pub const CONTENT_DIFFERS: &str = "content differs";
    pub const LEFT_ONLY: &str = "left only";
    pub const RIGHT_ONLY: &str = "right only";
    /// Identical, verified by digest (only visible with --show-same)
    pub const SAME_HASH: &str = "same hash";
    /// Identical, fast-skipped on size+mtime (only visible with --show-same)
    pub const SAME_SIZE_MTIME: &str = "same size and mtime";
    /// Prefixes completed with the underlying I/O error message
    pub const HASH_LEFT_PREFIX: &str = "hash left: ";
    pub const HASH_RIGHT_PREFIX: &str = "hash right: ";
    pub const STAT_LEFT_PREFIX: &str = "stat left: ";
    pub const STAT_RIGHT_PREFIX: &str = "stat right: ";
}

/// One finding: a file that exists on only one side, differs between sides,
/// or could not be compared
#[derive(Debug, Clone)]
pub struct DiffRecord {
    /// Relative path of the file
    pub rel: Arc<str>,

    /// Why this record exists; drawn from [`reason`], error reasons carry
    /// the I/O message after the prefix
    pub reason: String,

    pub left_size: Option<u64>,
    pub right_size: Option<u64>,
    pub left_mtime: Option<i64>,
    pub right_mtime: Option<i64>,
    pub left_hash: Option<String>,
    pub right_hash: Option<String>,

    /// True for `left only` records; `right only` and pair records are false
    pub left_only: bool,
}

impl DiffRecord {
    /// Sizes differ; emitted by the classifier without hashing.
    pub fn size_changed(rel: Arc<str>, cached: &PairInfo) -> Self {
        Self {
            rel,
            reason: reason::SIZE_CHANGED.to_string(),
            left_size: Some(cached.left.size),
            right_size: Some(cached.right.size),
            left_mtime: Some(cached.left.mtime),
            right_mtime: Some(cached.right.mtime),
            left_hash: None,
            right_hash: None,
            left_only: false,
        }
    }

    /// Equal sizes but different digests.
    pub fn content_differs(
        rel: Arc<str>,
        cached: &PairInfo,
        left_hash: String,
        right_hash: String,
    ) -> Self {
        Self {
            rel,
            reason: reason::CONTENT_DIFFERS.to_string(),
            left_size: Some(cached.left.size),
            right_size: Some(cached.right.size),
            left_mtime: Some(cached.left.mtime),
            right_mtime: Some(cached.right.mtime),
            left_hash: Some(left_hash),
            right_hash: Some(right_hash),
            left_only: false,
        }
    }

    /// A pair could not be compared; `reason` is a prefixed error message
    /// (`hash left: …`, `stat right: …`). Cached walk metadata fills the
    /// record since the file may no longer be readable.
    pub fn pair_error(rel: Arc<str>, reason: String, cached: &PairInfo) -> Self {
        Self {
            rel,
            reason,
            left_size: Some(cached.left.size),
            right_size: Some(cached.right.size),
            left_mtime: Some(cached.left.mtime),
            right_mtime: Some(cached.right.mtime),
            left_hash: None,
            right_hash: None,
            left_only: false,
        }
    }

    /// File present only on one side, with metadata from the finalization stat.
    pub fn only_on(side: Side, rel: Arc<str>, meta: FileMeta) -> Self {
        let (reason, left_size, right_size, left_mtime, right_mtime) = match side {
            Side::Left => (
                reason::LEFT_ONLY,
                Some(meta.size),
                None,
                Some(meta.mtime),
                None,
            ),
            Side::Right => (
                reason::RIGHT_ONLY,
                None,
                Some(meta.size),
                None,
                Some(meta.mtime),
            ),
        };
        Self {
            rel,
            reason: reason.to_string(),
            left_size,
            right_size,
            left_mtime,
            right_mtime,
            left_hash: None,
            right_hash: None,
            left_only: side == Side::Left,
        }
    }

    /// Identical pair, recorded only in --show-same mode.
    pub fn identical(rel: Arc<str>, why: &'static str) -> Self {
        Self {
            rel,
            reason: why.to_string(),
            left_size: None,
            right_size: None,
            left_mtime: None,
            right_mtime: None,
            left_hash: None,
            right_hash: None,
            left_only: false,
        }
    }
}

/// Outcome of one compare-worker job
#[derive(Debug, Clone)]
pub enum CompareOutcome {
    /// The pair is identical; `why` is `same hash` or `same size and mtime`
    Identical { rel: Arc<str>, why: &'static str },

    /// The pair differs (or could not be compared)
    Different(DiffRecord),
}
