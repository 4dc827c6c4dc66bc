#![forbid(unsafe_code)]

//! Storyboard Runtime
//!
//! This crate holds the stateful half of Storyboard: the history-backed
//! document store and the collaborators that feed and persist it.
//!
//! # Key Components
//!
//! - [`DocumentStore`] - Live document with bounded undo/redo and debounced
//!   text coalescing
//! - [`StoreConfig`] - History limit and text debounce window
//! - [`StorageBackend`] - Key/value persistence with [`MemoryStorage`] and
//!   an atomic file backend
//! - [`Autosaver`] - Writes the live document when it changed
//! - [`EmailGate`] - Email gate and interest tracking
//!
//! # Role in Storyboard
//! `storyboard-runtime` sits on top of `storyboard-core`. Every mutation is a
//! pure edit from the core crate; this crate decides which of them become
//! undo steps and when.
//!
//! # How it fits in the system
//! A presentation layer owns one [`DocumentStore`], forwards key events to
//! [`DocumentStore::handle_key`], calls [`DocumentStore::tick`] from its
//! timer, and runs an [`Autosaver`] once the [`EmailGate`] is open.

pub mod config;
pub mod gate;
pub mod persistence;
pub mod store;
pub mod undo;

pub use config::{ConfigError, StoreConfig};
pub use gate::{
    ClientContext, EmailGate, GateError, InterestPayload, NotifyError, SignupNotifier,
    SignupPayload, is_valid_email,
};
#[cfg(feature = "file-storage")]
pub use persistence::FileStorage;
pub use persistence::{
    Autosaver, DOCUMENT_KEY, MemoryStorage, PROJECTS_KEY, StorageBackend, StorageError,
    StorageResult,
};
pub use store::{DocumentStore, TextTarget};
pub use undo::{SnapshotConfig, SnapshotStore, TextCoalescer};
