#![forbid(unsafe_code)]

//! Storyboard public facade crate.
//!
//! This crate provides the stable surface area for users. It re-exports the
//! document model from `storyboard-core`, the store and its collaborators
//! from `storyboard-runtime`, and offers a prelude for day-to-day usage.
//!
//! # Example
//!
//! ```
//! use storyboard::prelude::*;
//!
//! let mut store = DocumentStore::default();
//! let group = store.current().groups()[0].id().clone();
//! let item = store.current().groups()[0].items()[0].id.clone();
//!
//! store.toggle_visual(&group, &item, VisualTag::TalkingHead);
//! store.update_text(&group, &item, "Hook");
//! store.flush();
//! assert_eq!(store.past_len(), 2);
//! ```

use std::fmt;

pub mod session;

// --- Core re-exports -------------------------------------------------------

pub use storyboard_core::edit::Edit;
pub use storyboard_core::event::{KeyCode, KeyEvent, KeyEventKind, Modifiers};
pub use storyboard_core::export::{copyable_item_text, document_text, group_text, item_text};
pub use storyboard_core::id::{GroupId, IdGenerator, ItemId, ProjectId};
pub use storyboard_core::keybinding::{HistoryAction, resolve_history_key};
pub use storyboard_core::model::{Document, Group, Item};
pub use storyboard_core::project::{Project, ProjectLibrary};
pub use storyboard_core::tag::{EngagementTag, VisualTag};

// --- Runtime re-exports ----------------------------------------------------

pub use storyboard_runtime::config::{ConfigError, StoreConfig};
pub use storyboard_runtime::gate::{
    ClientContext, EmailGate, GateError, InterestPayload, NotifyError, SignupNotifier,
    SignupPayload,
};
#[cfg(feature = "file-storage")]
pub use storyboard_runtime::persistence::FileStorage;
pub use storyboard_runtime::persistence::{
    Autosaver, MemoryStorage, StorageBackend, StorageError,
};
pub use storyboard_runtime::store::DocumentStore;

pub use session::Session;

// --- Errors ---------------------------------------------------------------

/// Top-level error type for Storyboard apps.
#[derive(Debug)]
pub enum Error {
    /// Storage backend or codec failure.
    Storage(StorageError),
    /// Configuration could not be loaded.
    Config(ConfigError),
    /// Email gate submission failed.
    Gate(GateError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Storage(err) => write!(f, "{err}"),
            Self::Config(err) => write!(f, "{err}"),
            Self::Gate(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::Config(err) => Some(err),
            Self::Gate(err) => Some(err),
        }
    }
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        Self::Storage(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<GateError> for Error {
    fn from(err: GateError) -> Self {
        Self::Gate(err)
    }
}

/// Standard result type for Storyboard APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Document, DocumentStore, Edit, EngagementTag, Error, GroupId, HistoryAction, Item, ItemId,
        KeyCode, KeyEvent, Modifiers, Project, ProjectLibrary, Result, Session, StorageBackend,
        StoreConfig, VisualTag,
    };
    pub use crate::{core, runtime};
}

pub use storyboard_core as core;
pub use storyboard_runtime as runtime;
