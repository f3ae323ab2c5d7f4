//! ffd - Fast File Diff
//!
//! Compares two directory trees and reports which regular files exist only
//! on one side, which exist on both but differ, and which are identical.
//! Built for large mirrored trees (backups, deploys, data staging) where
//! hashing everything is too slow and trusting stat alone is too unsafe.
//!
//! # Features
//!
//! - **Parallel discovery**: both trees are walked concurrently by a worker
//!   pool over a self-feeding directory queue with inline fallback, so a
//!   full queue never deadlocks the walk.
//!
//! - **Cheap classification first**: pairs with differing sizes are
//!   reported without reading a byte; pairs with equal size and equal
//!   second-truncated mtime are presumed identical. Only the residual
//!   "same size, different mtime" pairs get hashed.
//!
//! - **Bounded memory hashing**: small files are hashed in one read; large
//!   files stream through a process-wide pool of threshold-sized buffers.
//!
//! - **Live telemetry**: lock-free progress counters and per-worker
//!   utilization windows feed a ticker-driven progress display.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐
//! │  left tree   │     │  right tree  │
//! └──────┬───────┘     └──────┬───────┘
//!        │    parallel walk   │
//!        ▼                    ▼
//! ┌─────────────────────────────────────┐
//! │        Directory Queue              │
//! │  (bounded, inline on full,          │
//! │   atomic outstanding counter)       │
//! └──────────────┬──────────────────────┘
//!                │ file events
//!                ▼
//! ┌─────────────────────────────────────┐
//! │        Discovered Set               │
//! │  path → {left?, right?}             │
//! │  pairs / left-only / right-only     │
//! └──────────────┬──────────────────────┘
//!                │ pair snapshot
//!                ▼
//!     size ≠ ──► "size changed"
//!     size = mtime = ──► identical (skip)
//!     size = mtime ≠ ──► hash workers ──► records
//! ```

pub mod classify;
pub mod compare;
pub mod config;
pub mod discovered;
pub mod error;
pub mod hash;
pub mod logger;
pub mod model;
pub mod output;
pub mod paths;
pub mod pipeline;
pub mod progress;
pub mod utilization;
pub mod walker;

pub use config::{CliArgs, DiffConfig, HashAlgorithm, OutputFormat};
pub use error::{DiffError, Result};
pub use model::{DiffRecord, FileMeta, Side};
pub use pipeline::{DiffPipeline, Phase, PipelineHandles, PipelineSummary};
