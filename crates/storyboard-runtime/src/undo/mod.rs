#![forbid(unsafe_code)]

//! Snapshot-based undo/redo.
//!
//! History is a pair of bounded stacks of whole-document snapshots. Text
//! input is debounced so a burst of keystrokes becomes a single step.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                        DocumentStore                          │
//! │                                                               │
//! │   structural edit ──────────────────────┐                     │
//! │                                         ▼                     │
//! │   text edit ──▶ TextCoalescer ──settle──▶ SnapshotStore       │
//! │                  (500 ms quiet)          past ◀─▶ future      │
//! │                                          (≤ 50 each)          │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Module Structure
//!
//! - [`snapshot_store`]: `SnapshotStore<T>`, the bounded past/future stacks
//! - [`text_coalescer`]: `TextCoalescer<K, S>`, debounce state machine

pub mod snapshot_store;
pub mod text_coalescer;

pub use snapshot_store::{DEFAULT_MAX_DEPTH, SnapshotConfig, SnapshotStore};
pub use text_coalescer::{DEFAULT_TEXT_DEBOUNCE, SettledBurst, TextCoalescer};
