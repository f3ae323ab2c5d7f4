//! Configuration types for ffd
//!
//! This module defines:
//! - CLI argument parsing using clap derive macros
//! - Runtime configuration with validation
//! - The hash algorithm and output format enumerations

use crate::error::ConfigError;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Maximum reasonable worker count
const MAX_WORKERS: usize = 512;

/// Default size threshold: files below this are hashed in one read,
/// files at or above it are streamed through a pooled buffer.
pub const DEFAULT_HASH_THRESHOLD: usize = 10 * 1024 * 1024;

/// Default entries per directory-read batch
pub const DEFAULT_DIR_BATCH_SIZE: usize = 4096;

/// Default utilization window in ticks (~3 seconds at a 100ms tick)
pub const DEFAULT_UTIL_WINDOW_TICKS: usize = 30;

/// Fast file diff between two directory trees
#[derive(Parser, Debug, Clone)]
#[command(
    name = "ffd",
    version,
    about = "Fast file diff between two directory trees",
    long_about = "Compare two directory trees recursively. Walks both trees in \
                  parallel, skips hashing for pairs whose size and mtime match, \
                  and content-hashes only pairs with equal size but differing mtime.",
    after_help = "EXAMPLES:\n    \
        ffd /backup/photos /mnt/mirror/photos\n    \
        ffd left/ right/ --hash sha256 --format json\n    \
        ffd left/ right/ -w 16 --threshold 1048576 --quiet"
)]
pub struct CliArgs {
    /// Left directory tree
    #[arg(value_name = "LEFT")]
    pub left: PathBuf,

    /// Right directory tree
    #[arg(value_name = "RIGHT")]
    pub right: PathBuf,

    /// Number of worker threads for walking and comparing
    #[arg(
        short = 'w',
        long,
        default_value_t = default_workers(),
        value_name = "NUM"
    )]
    pub workers: usize,

    /// Entries per directory-read batch
    #[arg(long, default_value_t = DEFAULT_DIR_BATCH_SIZE, value_name = "NUM")]
    pub dir_batch_size: usize,

    /// Hash algorithm for content comparison
    #[arg(long, value_enum, default_value_t = HashAlgorithm::Xxhash)]
    pub hash: HashAlgorithm,

    /// Size threshold in bytes: smaller files are read in full to hash, larger are streamed
    #[arg(long, default_value_t = DEFAULT_HASH_THRESHOLD, value_name = "BYTES")]
    pub threshold: usize,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Utilization window in 100ms ticks for the progress display
    #[arg(long, default_value_t = DEFAULT_UTIL_WINDOW_TICKS, value_name = "TICKS")]
    pub util_window_ticks: usize,

    /// Also report identical pairs (text format only)
    #[arg(long)]
    pub show_same: bool,

    /// Suppress progress and summary output (for scripting)
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Verbose diagnostics (worker lifecycle, phase transitions)
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

/// Hash algorithm used for content comparison
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    /// xxHash64: fast non-cryptographic hash, 16 hex chars
    Xxhash,
    /// SHA-256: cryptographic, 64 hex chars
    Sha256,
    /// MD5: legacy compatibility, 32 hex chars
    Md5,
}

impl HashAlgorithm {
    /// Length of the hex digest this algorithm produces
    pub fn hex_len(self) -> usize {
        match self {
            HashAlgorithm::Xxhash => 16,
            HashAlgorithm::Sha256 => 64,
            HashAlgorithm::Md5 => 32,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HashAlgorithm::Xxhash => "xxhash",
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Md5 => "md5",
        }
    }
}

impl std::fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output format for the diff report
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Indented tree with aligned columns, grouped into sections
    Text,
    /// Tab-separated values with a header row
    Table,
    /// Pretty-printed JSON array
    Json,
    /// YAML sequence
    Yaml,
}

/// Validated runtime configuration
#[derive(Debug, Clone)]
pub struct DiffConfig {
    /// Left tree root
    pub left_root: PathBuf,

    /// Right tree root
    pub right_root: PathBuf,

    /// Number of worker threads (walk phase and compare phase each use this many)
    pub workers: usize,

    /// Entries per directory-read batch
    pub dir_batch_size: usize,

    /// Hash algorithm for content comparison
    pub hash: HashAlgorithm,

    /// Streaming threshold in bytes
    pub hash_threshold: usize,

    /// Output format
    pub format: OutputFormat,

    /// Utilization window in ticks
    pub util_window_ticks: usize,

    /// Report identical pairs too
    pub show_same: bool,

    /// Suppress progress and summary
    pub quiet: bool,
}

impl DiffConfig {
    /// Create and validate configuration from CLI arguments
    pub fn from_args(args: CliArgs) -> Result<Self, ConfigError> {
        if args.workers == 0 || args.workers > MAX_WORKERS {
            return Err(ConfigError::InvalidWorkerCount {
                count: args.workers,
                max: MAX_WORKERS,
            });
        }

        if args.dir_batch_size == 0 {
            return Err(ConfigError::InvalidBatchSize {
                size: args.dir_batch_size,
            });
        }

        if args.util_window_ticks == 0 {
            return Err(ConfigError::InvalidUtilWindow {
                ticks: args.util_window_ticks,
            });
        }

        Ok(Self {
            left_root: args.left,
            right_root: args.right,
            workers: args.workers,
            dir_batch_size: args.dir_batch_size,
            hash: args.hash,
            hash_threshold: args.threshold,
            format: args.format,
            util_window_ticks: args.util_window_ticks,
            show_same: args.show_same,
            quiet: args.quiet,
        })
    }
}

fn default_workers() -> usize {
    num_cpus::get()
}
