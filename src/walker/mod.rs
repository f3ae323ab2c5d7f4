//! Parallel two-tree walker
//!
//! This module implements the discovery phase: a self-feeding parallel
//! traversal of both roots over a shared directory queue.
//!
//! # Architecture
//!
//! ```text
//!        seed: (left root)  (right root)
//!                  │             │
//!                  ▼             ▼
//!          ┌──────────────────────────┐
//!          │     Directory Queue      │◄───────────┐
//!          │  (crossbeam bounded)     │            │ sub-dirs
//!          │  - outstanding counter   │            │ (inline when full)
//!          └───────────┬──────────────┘            │
//!                      │                           │
//!        ┌─────────┐ ┌─┴───────┐             ┌─────┴───┐
//!        │ Walker 1│ │ Walker 2│     ...     │ Walker N│
//!        └────┬────┘ └────┬────┘             └────┬────┘
//!             │           │                       │
//!             └───────────┼───────────────────────┘
//!                         ▼
//!               file events (rel, side, meta)
//! ```

pub mod discover;
pub mod list;
pub mod queue;

pub use discover::{Discoverer, FileEvent};
pub use list::{list_directory, ListedEntry};
pub use queue::{DirJob, DirQueue, DirQueueHandle};
