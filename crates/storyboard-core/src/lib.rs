#![forbid(unsafe_code)]

//! Core: the storyboard document model and everything that can be done to it
//! without side effects.
//!
//! # Role in Storyboard
//! `storyboard-core` owns the value types (documents, groups, items, tags,
//! projects) and the pure edit functions that derive a new document from an
//! old one. It holds no history and performs no I/O.
//!
//! # Primary responsibilities
//! - **Model**: [`Document`] → [`Group`] → [`Item`] over persistent vectors.
//! - **Edits**: [`Edit`] values applied with [`edit::apply`]; invalid input is
//!   a no-op, never an error.
//! - **Projects**: immutable named snapshots in a [`ProjectLibrary`].
//! - **Export**: clipboard text for a group or the whole document.
//! - **Keys**: undo/redo gesture resolution.
//!
//! # How it fits in the system
//! `storyboard-runtime` wraps a [`Document`] in a history-backed store and
//! routes every mutation through [`edit::apply`].

pub mod edit;
pub mod event;
pub mod export;
pub mod id;
pub mod keybinding;
pub mod model;
pub mod project;
pub mod tag;

pub use edit::Edit;
pub use id::{GroupId, IdGenerator, ItemId, ProjectId};
pub use keybinding::{HistoryAction, resolve_history_key};
pub use model::{Document, Group, Item};
pub use project::{Project, ProjectLibrary};
pub use tag::{EngagementTag, VisualTag};
