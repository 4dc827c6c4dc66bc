#![forbid(unsafe_code)]

//! Key/value persistence for the live document and the project library.
//!
//! The store itself never performs I/O. Callers hand it to this module:
//! documents and projects are encoded as JSON strings and written through a
//! [`StorageBackend`].
//!
//! # Keys
//!
//! | Key | Value |
//! |-----|-------|
//! | [`DOCUMENT_KEY`] | the live document, an array of groups |
//! | [`PROJECTS_KEY`] | the project library, newest first |
//!
//! # Legacy data
//!
//! Earlier versions stored a flat array of items instead of groups, and
//! projects carried `stories` instead of `storytellings`. Both shapes are
//! migrated on load into a single group named `"Storytelling 1"`.
//!
//! # Atomic Writes
//!
//! [`FileStorage`] writes `<key>.json.tmp` and renames it over
//! `<key>.json`, so a crash mid-write never leaves a truncated file.

use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;
use serde_json::Value;
use storyboard_core::id::{IdGenerator, ProjectId};
use storyboard_core::model::{Document, Group, Item, default_group_name};
use storyboard_core::project::{Project, ProjectLibrary};
use tracing::{debug, warn};

use crate::store::DocumentStore;

const TARGET: &str = "storyboard.persistence";

/// Key of the live document.
pub const DOCUMENT_KEY: &str = "storyboard_data";
/// Key of the project library.
pub const PROJECTS_KEY: &str = "storyboard_projects";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from storage backends and codecs.
#[derive(Debug)]
pub enum StorageError {
    /// I/O error from a file backend.
    Io(std::io::Error),
    /// Encoding failed.
    Serialization(serde_json::Error),
    /// Stored data could not be decoded.
    Corrupt { key: String, reason: String },
    /// Key cannot be mapped onto the backend.
    InvalidKey(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Serialization(e) => write!(f, "serialization error: {e}"),
            Self::Corrupt { key, reason } => write!(f, "corrupt data under {key:?}: {reason}"),
            Self::InvalidKey(key) => write!(f, "invalid storage key {key:?}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Serialization(e) => Some(e),
            Self::Corrupt { .. } | Self::InvalidKey(_) => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e)
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

fn corrupt(key: &str, reason: impl fmt::Display) -> StorageError {
    StorageError::Corrupt {
        key: key.to_owned(),
        reason: reason.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Backends
// ---------------------------------------------------------------------------

/// String values addressed by key.
pub trait StorageBackend {
    /// Short backend name, used in logs.
    fn name(&self) -> &str;

    /// Read a value. `Ok(None)` when the key was never written.
    fn load(&self, key: &str) -> StorageResult<Option<String>>;

    /// Write a value, replacing any previous one.
    fn save(&mut self, key: &str, value: &str) -> StorageResult<()>;

    /// Delete a value. Deleting a missing key is not an error.
    fn remove(&mut self, key: &str) -> StorageResult<()>;
}

/// In-memory backend for tests and ephemeral sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl StorageBackend for MemoryStorage {
    fn name(&self) -> &str {
        "memory"
    }

    fn load(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn save(&mut self, key: &str, value: &str) -> StorageResult<()> {
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(feature = "file-storage")]
pub use file::FileStorage;

#[cfg(feature = "file-storage")]
mod file {
    use std::io;
    use std::path::{Path, PathBuf};

    use super::{StorageBackend, StorageError, StorageResult};

    /// One JSON file per key inside a directory.
    #[derive(Debug, Clone)]
    pub struct FileStorage {
        dir: PathBuf,
    }

    impl FileStorage {
        /// Storage rooted at `dir`. The directory is created on first write.
        #[must_use]
        pub fn new(dir: impl Into<PathBuf>) -> Self {
            Self { dir: dir.into() }
        }

        #[must_use]
        pub fn dir(&self) -> &Path {
            &self.dir
        }

        /// File backing `key`.
        pub fn path_for(&self, key: &str) -> StorageResult<PathBuf> {
            let valid = !key.is_empty()
                && key
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
            if !valid {
                return Err(StorageError::InvalidKey(key.to_owned()));
            }
            Ok(self.dir.join(format!("{key}.json")))
        }
    }

    impl StorageBackend for FileStorage {
        fn name(&self) -> &str {
            "file"
        }

        fn load(&self, key: &str) -> StorageResult<Option<String>> {
            let path = self.path_for(key)?;
            match std::fs::read_to_string(&path) {
                Ok(content) => Ok(Some(content)),
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
                Err(e) => Err(e.into()),
            }
        }

        fn save(&mut self, key: &str, value: &str) -> StorageResult<()> {
            let path = self.path_for(key)?;
            std::fs::create_dir_all(&self.dir)?;
            // Atomic write: temp file then rename
            let temp = path.with_extension("json.tmp");
            std::fs::write(&temp, value)?;
            std::fs::rename(&temp, &path)?;
            Ok(())
        }

        fn remove(&mut self, key: &str) -> StorageResult<()> {
            let path = self.path_for(key)?;
            match std::fs::remove_file(&path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Codecs
// ---------------------------------------------------------------------------

/// Encode a document as stored under [`DOCUMENT_KEY`].
pub fn encode_document(document: &Document) -> StorageResult<String> {
    Ok(serde_json::to_string(document)?)
}

/// Decode a stored document, migrating the legacy flat item list.
///
/// Returns `Ok(None)` for an empty array or an unrecognized element shape.
pub fn decode_document(raw: &str, ids: &mut IdGenerator) -> StorageResult<Option<Document>> {
    let value: Value = serde_json::from_str(raw).map_err(|e| corrupt(DOCUMENT_KEY, e))?;
    let Value::Array(elements) = value else {
        return Err(corrupt(DOCUMENT_KEY, "expected an array"));
    };
    let Some(first) = elements.first() else {
        return Ok(None);
    };

    if first.get("stories").is_some() {
        let groups: Vec<Group> = serde_json::from_value(Value::Array(elements))
            .map_err(|e| corrupt(DOCUMENT_KEY, e))?;
        return Ok(Some(Document::from_groups(groups, ids)));
    }

    if first.get("text").is_some() || first.get("id").is_some() {
        let items: Vec<Item> = serde_json::from_value(Value::Array(elements))
            .map_err(|e| corrupt(DOCUMENT_KEY, e))?;
        debug!(target: TARGET, items = items.len(), "migrating legacy item list");
        return Ok(Some(legacy_document(items, ids)));
    }

    warn!(target: TARGET, "stored document has an unrecognized shape; ignoring");
    Ok(None)
}

fn legacy_document(items: Vec<Item>, ids: &mut IdGenerator) -> Document {
    let group = Group::new(
        ids.group_id(),
        default_group_name(1),
        items.into_iter().collect(),
        ids,
    );
    Document::from_groups([group], ids)
}

/// A stored project in either the current or the legacy shape.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredProject {
    Current(Project),
    Legacy {
        id: ProjectId,
        name: String,
        timestamp: u64,
        stories: Vec<Item>,
    },
}

/// Encode the project library as stored under [`PROJECTS_KEY`].
pub fn encode_projects(library: &ProjectLibrary) -> StorageResult<String> {
    Ok(serde_json::to_string(library)?)
}

/// Decode the stored project library, migrating legacy projects.
///
/// Entries that match neither shape are skipped with a warning; only a value
/// that is not a JSON array makes the library corrupt.
pub fn decode_projects(raw: &str, ids: &mut IdGenerator) -> StorageResult<ProjectLibrary> {
    let stored: Vec<Value> = serde_json::from_str(raw).map_err(|e| corrupt(PROJECTS_KEY, e))?;
    let mut projects = Vec::with_capacity(stored.len());
    for (index, value) in stored.into_iter().enumerate() {
        let entry = match StoredProject::deserialize(value) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(target: TARGET, index, error = %e, "skipping unreadable project");
                continue;
            }
        };
        match entry {
            StoredProject::Current(project) => projects.push(project.normalized(ids)),
            StoredProject::Legacy {
                id,
                name,
                timestamp,
                stories,
            } => {
                let document = legacy_document(stories, ids);
                match Project::new(id, &name, timestamp, document) {
                    Some(project) => projects.push(project),
                    None => warn!(target: TARGET, "dropping legacy project with a blank name"),
                }
            }
        }
    }
    Ok(ProjectLibrary::from_projects(projects))
}

// ---------------------------------------------------------------------------
// Load / save
// ---------------------------------------------------------------------------

/// Load the live document, if one was saved.
pub fn load_document(
    backend: &dyn StorageBackend,
    ids: &mut IdGenerator,
) -> StorageResult<Option<Document>> {
    match backend.load(DOCUMENT_KEY)? {
        Some(raw) => decode_document(&raw, ids),
        None => Ok(None),
    }
}

/// Save the live document.
pub fn save_document(backend: &mut dyn StorageBackend, document: &Document) -> StorageResult<()> {
    backend.save(DOCUMENT_KEY, &encode_document(document)?)
}

/// Load the project library. Missing data yields an empty library.
pub fn load_projects(
    backend: &dyn StorageBackend,
    ids: &mut IdGenerator,
) -> StorageResult<ProjectLibrary> {
    match backend.load(PROJECTS_KEY)? {
        Some(raw) => decode_projects(&raw, ids),
        None => Ok(ProjectLibrary::new()),
    }
}

/// Save the project library.
pub fn save_projects(
    backend: &mut dyn StorageBackend,
    library: &ProjectLibrary,
) -> StorageResult<()> {
    backend.save(PROJECTS_KEY, &encode_projects(library)?)
}

/// Restore the saved document into `store`, replacing its history.
///
/// Returns `Ok(false)` when nothing was saved. On error the store is left
/// untouched.
pub fn restore_store(
    store: &mut DocumentStore,
    backend: &dyn StorageBackend,
) -> StorageResult<bool> {
    match load_document(backend, store.ids_mut())? {
        Some(document) => {
            store.restore(document);
            debug!(target: TARGET, backend = backend.name(), "document restored from storage");
            Ok(true)
        }
        None => Ok(false),
    }
}

// ---------------------------------------------------------------------------
// Autosave
// ---------------------------------------------------------------------------

/// Writes the live document whenever the store's revision moved.
#[derive(Debug, Clone, Default)]
pub struct Autosaver {
    last_saved_revision: Option<u64>,
}

impl Autosaver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Treat the store's current revision as already persisted, e.g. right
    /// after [`restore_store`].
    pub fn mark_saved(&mut self, store: &DocumentStore) {
        self.last_saved_revision = Some(store.revision());
    }

    /// Whether the live document has changed since the last successful save.
    #[must_use]
    pub fn is_dirty(&self, store: &DocumentStore) -> bool {
        self.last_saved_revision != Some(store.revision())
    }

    /// Save if dirty. Returns `Ok(true)` when a write happened.
    ///
    /// A failed write is logged and leaves the saver dirty, so the next
    /// call retries. The store is never touched.
    pub fn sync(
        &mut self,
        store: &DocumentStore,
        backend: &mut dyn StorageBackend,
    ) -> StorageResult<bool> {
        if !self.is_dirty(store) {
            return Ok(false);
        }
        match save_document(backend, store.current()) {
            Ok(()) => {
                self.last_saved_revision = Some(store.revision());
                debug!(
                    target: TARGET,
                    backend = backend.name(),
                    revision = store.revision(),
                    "autosaved"
                );
                Ok(true)
            }
            Err(e) => {
                warn!(
                    target: TARGET,
                    backend = backend.name(),
                    revision = store.revision(),
                    error = %e,
                    "autosave failed"
                );
                Err(e)
            }
        }
    }
}
