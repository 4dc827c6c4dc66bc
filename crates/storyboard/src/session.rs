#![forbid(unsafe_code)]

//! An editing session: one store, its project library, and their storage.
//!
//! [`Session`] wires the runtime pieces together the way an editor uses
//! them. The document is read from storage and autosaved only while the
//! email gate is open; the project library is written whenever it changes.
//!
//! Corrupt saved data never keeps a session from opening: it is logged and
//! the fresh document or an empty library is used instead.

use storyboard_core::id::ProjectId;
use storyboard_core::project::ProjectLibrary;
use storyboard_runtime::gate::{ClientContext, EmailGate, SignupNotifier};
use storyboard_runtime::persistence::{self, Autosaver, StorageBackend, StorageError, StorageResult};
use storyboard_runtime::{DocumentStore, StoreConfig};
use tracing::{debug, warn};
use web_time::Instant;

use crate::Result;

const TARGET: &str = "storyboard.session";

/// Store, library, gate and autosave over one storage backend.
#[derive(Debug)]
pub struct Session<B> {
    backend: B,
    gate: EmailGate,
    store: DocumentStore,
    library: ProjectLibrary,
    autosaver: Autosaver,
}

impl<B: StorageBackend> Session<B> {
    /// Open a session. Saved data is loaded only if the gate is already open.
    pub fn open(backend: B, config: StoreConfig) -> Result<Self> {
        let gate = EmailGate::open(&backend)?;
        let mut session = Self {
            backend,
            gate,
            store: DocumentStore::new(config),
            library: ProjectLibrary::new(),
            autosaver: Autosaver::new(),
        };
        if session.gate.is_open() {
            session.load_saved()?;
        }
        Ok(session)
    }

    fn load_saved(&mut self) -> Result<()> {
        let restored = persistence::restore_store(&mut self.store, &self.backend);
        recover_corrupt(restored, || false)?;
        self.autosaver.mark_saved(&self.store);
        let library = persistence::load_projects(&self.backend, self.store.ids_mut());
        self.library = recover_corrupt(library, ProjectLibrary::new)?;
        debug!(
            target: TARGET,
            projects = self.library.len(),
            "saved session loaded"
        );
        Ok(())
    }

    /// Submit the gate email. On success, saved data is loaded.
    pub fn submit_email(
        &mut self,
        input: &str,
        context: &ClientContext,
        notifier: &mut dyn SignupNotifier,
    ) -> Result<()> {
        self.gate.submit(input, context, notifier, &mut self.backend)?;
        self.load_saved()
    }

    /// Report interest in the AI feature. Always `true`.
    pub fn register_ai_interest(&self, notifier: &mut dyn SignupNotifier) -> bool {
        self.gate.register_ai_interest(notifier)
    }

    #[must_use]
    pub fn gate(&self) -> &EmailGate {
        &self.gate
    }

    #[must_use]
    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// Mutable store access. Changes are persisted by [`autosave`](Self::autosave).
    pub fn store_mut(&mut self) -> &mut DocumentStore {
        &mut self.store
    }

    #[must_use]
    pub fn library(&self) -> &ProjectLibrary {
        &self.library
    }

    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Settle due text bursts and autosave. Call from the editor's timer.
    pub fn tick_at(&mut self, now: Instant) -> Result<bool> {
        self.store.tick_at(now);
        self.autosave()
    }

    /// Write the live document if it changed and the gate is open.
    pub fn autosave(&mut self) -> Result<bool> {
        if !self.gate.is_open() {
            return Ok(false);
        }
        Ok(self.autosaver.sync(&self.store, &mut self.backend)?)
    }

    /// Save the live document as a project and persist the library.
    pub fn save_project(&mut self, name: &str) -> Result<Option<ProjectId>> {
        let Some(id) = self.store.save_project(&mut self.library, name) else {
            return Ok(None);
        };
        persistence::save_projects(&mut self.backend, &self.library)?;
        Ok(Some(id))
    }

    /// Delete a project and persist the library.
    pub fn delete_project(&mut self, id: &ProjectId) -> Result<bool> {
        if self.library.delete(id).is_none() {
            return Ok(false);
        }
        persistence::save_projects(&mut self.backend, &self.library)?;
        Ok(true)
    }

    /// Make a saved project's document live, as one undo step.
    pub fn load_project(&mut self, id: &ProjectId) -> bool {
        let Some(project) = self.library.get(id) else {
            return false;
        };
        self.store.load_project(project);
        true
    }

    /// Give back the backend.
    pub fn into_backend(self) -> B {
        self.backend
    }
}

/// Fall back to `default` when stored data is corrupt. Other errors pass.
fn recover_corrupt<T>(result: StorageResult<T>, default: impl FnOnce() -> T) -> Result<T> {
    match result {
        Ok(value) => Ok(value),
        Err(StorageError::Corrupt { key, reason }) => {
            warn!(target: TARGET, key = %key, reason = %reason, "ignoring corrupt saved data");
            Ok(default())
        }
        Err(err) => Err(err.into()),
    }
}
