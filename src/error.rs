//! Error types for ffd
//!
//! This module defines the error hierarchy used across the crate:
//! - Configuration and CLI validation errors
//! - Setup errors (roots, logger) that abort the run before any worker starts
//! - Worker/concurrency errors
//!
//! Design philosophy:
//! - Use thiserror for structured error types in library code
//! - Errors should be actionable - include context about what to do
//! - Per-file I/O errors during a run are NOT represented here; they surface
//!   as diff records with a `hash left:` / `stat right:` style reason and
//!   never cancel other work

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for the ffd application
#[derive(Error, Debug)]
pub enum DiffError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Setup errors (fatal, before any work starts)
    #[error("Setup error: {0}")]
    Setup(#[from] SetupError),

    /// Worker/concurrency errors
    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),

    /// I/O errors (file operations, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Channel closed unexpectedly
    #[error("Channel closed unexpectedly")]
    ChannelClosed,
}

/// Configuration and CLI errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Invalid worker count
    #[error("Invalid worker count {count}: must be between 1 and {max}")]
    InvalidWorkerCount { count: usize, max: usize },

    /// Invalid directory batch size
    #[error("Invalid directory batch size {size}: must be at least 1")]
    InvalidBatchSize { size: usize },

    /// Invalid utilization window
    #[error("Invalid utilization window {ticks}: must be at least 1 tick")]
    InvalidUtilWindow { ticks: usize },
}

/// Fatal setup errors; the run aborts with exit code 2 before any worker starts
#[derive(Error, Debug)]
pub enum SetupError {
    /// A root path does not exist or cannot be statted
    #[error("{side} directory '{path}': {reason}")]
    RootUnreadable {
        side: &'static str,
        path: PathBuf,
        reason: String,
    },

    /// A root path exists but is not a directory
    #[error("{side} directory '{path}': not a directory")]
    RootNotADirectory { side: &'static str, path: PathBuf },

    /// Log files could not be created
    #[error("Failed to create run logs: {reason}")]
    LoggerCreate { reason: String },
}

/// Worker thread errors
#[derive(Error, Debug)]
pub enum WorkerError {
    /// Worker initialization failed
    #[error("Failed to spawn worker {id}: {reason}")]
    SpawnFailed { id: usize, reason: String },

    /// Worker panicked
    #[error("Worker {id} panicked")]
    Panicked { id: usize },

    /// Result channel closed before all work was drained
    #[error("Result channel closed unexpectedly")]
    ResultChannelClosed,
}

/// Result type alias for DiffError
pub type Result<T> = std::result::Result<T, DiffError>;
