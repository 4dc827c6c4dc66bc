#![forbid(unsafe_code)]

//! The history-backed document store.
//!
//! [`DocumentStore`] owns the live [`Document`], its bounded undo/redo
//! history, and the one pending text burst. Every mutation derives a new
//! document through [`storyboard_core::edit::apply`] and swaps it in; nothing
//! is mutated in place.
//!
//! # Steps
//!
//! | Input | History effect |
//! |-------|----------------|
//! | structural edit, [`commit`](DocumentStore::commit), project load | one step, immediately |
//! | [`update_text`](DocumentStore::update_text) burst on one item | one step, once the burst settles |
//! | invalid input (unknown id, index out of range, deleting the only group, blank name) | none |
//!
//! An open text burst settles when its quiet window elapses
//! ([`tick`](DocumentStore::tick)), when an edit targets another item, and
//! before any other operation (including undo and redo) runs. Undo right
//! after typing therefore reverts the whole burst.
//!
//! # Example
//!
//! ```
//! use storyboard_runtime::DocumentStore;
//!
//! let mut store = DocumentStore::default();
//! let group = store.current().groups()[0].id().clone();
//!
//! assert!(store.add_item(&group));
//! assert_eq!(store.current().total_items(), 2);
//!
//! assert!(store.undo());
//! assert_eq!(store.current().total_items(), 1);
//! assert!(store.can_redo());
//! ```

use std::sync::Arc;

use storyboard_core::edit::{self, Edit};
use storyboard_core::event::KeyEvent;
use storyboard_core::id::{GroupId, IdGenerator, ItemId, ProjectId};
use storyboard_core::keybinding::{HistoryAction, resolve_history_key};
use storyboard_core::model::Document;
use storyboard_core::project::{Project, ProjectLibrary};
use storyboard_core::tag::{EngagementTag, VisualTag};
use tracing::{debug, trace};
use web_time::Instant;

use crate::config::StoreConfig;
use crate::undo::{SettledBurst, SnapshotConfig, SnapshotStore, TextCoalescer};

const TARGET: &str = "storyboard.store";

/// The item a text burst is typing into.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextTarget {
    pub group: GroupId,
    pub item: ItemId,
}

type TextBurst = SettledBurst<TextTarget, Arc<Document>>;

/// Live document plus undo/redo history.
#[derive(Debug)]
pub struct DocumentStore {
    current: Arc<Document>,
    history: SnapshotStore<Document>,
    coalescer: TextCoalescer<TextTarget, Arc<Document>>,
    ids: IdGenerator,
    revision: u64,
    config: StoreConfig,
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

impl DocumentStore {
    /// A store holding the initial document.
    #[must_use]
    pub fn new(config: StoreConfig) -> Self {
        Self::with_ids(config, IdGenerator::new())
    }

    /// A store with a caller-supplied id source (deterministic in tests).
    #[must_use]
    pub fn with_ids(config: StoreConfig, mut ids: IdGenerator) -> Self {
        let document = Document::new(&mut ids);
        Self::with_document(document, config, ids)
    }

    /// A store seeded with `document` and empty history.
    #[must_use]
    pub fn with_document(document: Document, config: StoreConfig, mut ids: IdGenerator) -> Self {
        let config = config.validated();
        Self {
            current: Arc::new(document.normalized(&mut ids)),
            history: SnapshotStore::new(SnapshotConfig::new(config.history_limit)),
            coalescer: TextCoalescer::new(config.text_debounce),
            ids,
            revision: 0,
            config,
        }
    }

    // ====================================================================
    // Access
    // ====================================================================

    /// The live document. Always reflects the latest keystroke.
    #[must_use]
    pub fn current(&self) -> &Document {
        &self.current
    }

    /// Shared handle to the live document.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Document> {
        Arc::clone(&self.current)
    }

    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Id source used for every id this store mints.
    pub fn ids_mut(&mut self) -> &mut IdGenerator {
        &mut self.ids
    }

    // ====================================================================
    // Committing
    // ====================================================================

    /// Replace the live document as one undo step.
    ///
    /// The document is repaired if it breaks the structural invariants.
    /// Every commit records a step, even when the document is unchanged.
    pub fn commit(&mut self, document: Document) {
        self.flush();
        let document = document.normalized(&mut self.ids);
        self.push_step(Arc::new(document));
        debug!(
            target: TARGET,
            revision = self.revision,
            past = self.history.undo_depth(),
            "document committed"
        );
    }

    /// Apply a structural edit as one undo step. Returns `false` for a no-op.
    ///
    /// [`Edit::SetText`] through this method is committed immediately, not
    /// debounced; typing goes through [`update_text`](Self::update_text).
    pub fn apply(&mut self, edit: &Edit) -> bool {
        self.flush();
        let Some(next) = edit::apply(&self.current, edit, &mut self.ids) else {
            trace!(target: TARGET, kind = edit.kind(), "edit was a no-op");
            return false;
        };
        self.push_step(Arc::new(next));
        debug!(
            target: TARGET,
            kind = edit.kind(),
            revision = self.revision,
            past = self.history.undo_depth(),
            "edit committed"
        );
        true
    }

    fn push_step(&mut self, next: Arc<Document>) {
        let previous = std::mem::replace(&mut self.current, next);
        let evicted = self.history.checkpoint(previous);
        if evicted > 0 {
            trace!(target: TARGET, evicted, "oldest history entries evicted");
        }
        self.revision += 1;
    }

    // ====================================================================
    // Text input
    // ====================================================================

    /// Set an item's text, coalescing keystrokes into one undo step.
    pub fn update_text(&mut self, group: &GroupId, item: &ItemId, text: impl Into<String>) -> bool {
        self.update_text_at(group, item, text, Instant::now())
    }

    /// [`update_text`](Self::update_text) with an explicit clock.
    ///
    /// The live document changes immediately. The history entry (the
    /// document as it was before the burst) is recorded when the burst
    /// settles.
    pub fn update_text_at(
        &mut self,
        group: &GroupId,
        item: &ItemId,
        text: impl Into<String>,
        now: Instant,
    ) -> bool {
        let edit = Edit::SetText {
            group: group.clone(),
            item: item.clone(),
            text: text.into(),
        };
        let Some(next) = edit::apply(&self.current, &edit, &mut self.ids) else {
            trace!(target: TARGET, "text update was a no-op");
            return false;
        };
        let target = TextTarget {
            group: group.clone(),
            item: item.clone(),
        };
        if let Some(settled) = self.coalescer.feed(target, Arc::clone(&self.current), now) {
            self.settle(settled);
        }
        self.current = Arc::new(next);
        self.revision += 1;
        true
    }

    /// Settle the pending text burst if its quiet window elapsed.
    pub fn tick(&mut self) -> bool {
        self.tick_at(Instant::now())
    }

    /// [`tick`](Self::tick) with an explicit clock.
    pub fn tick_at(&mut self, now: Instant) -> bool {
        match self.coalescer.check_timeout(now) {
            Some(burst) => {
                self.settle(burst);
                true
            }
            None => false,
        }
    }

    /// Settle the pending text burst now. Returns `true` if a step was
    /// recorded.
    pub fn flush(&mut self) -> bool {
        match self.coalescer.flush() {
            Some(burst) => {
                self.settle(burst);
                true
            }
            None => false,
        }
    }

    fn settle(&mut self, burst: TextBurst) {
        let span_ms = burst.span().as_millis() as u64;
        let evicted = self.history.checkpoint(burst.base);
        debug!(
            target: TARGET,
            group = %burst.key.group,
            item = %burst.key.item,
            edits = burst.edits,
            span_ms,
            evicted,
            "text burst settled"
        );
    }

    /// When the pending burst will settle on its own.
    #[must_use]
    pub fn text_deadline(&self) -> Option<Instant> {
        self.coalescer.deadline()
    }

    // ====================================================================
    // Undo / Redo
    // ====================================================================

    /// Step back one entry. Returns `false` when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        self.flush();
        let Some(previous) = self.history.undo(&self.current) else {
            return false;
        };
        self.current = previous;
        self.revision += 1;
        debug!(
            target: TARGET,
            revision = self.revision,
            past = self.history.undo_depth(),
            future = self.history.redo_depth(),
            "undo"
        );
        true
    }

    /// Step forward one entry. Returns `false` when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        self.flush();
        let Some(next) = self.history.redo(&self.current) else {
            return false;
        };
        self.current = next;
        self.revision += 1;
        debug!(
            target: TARGET,
            revision = self.revision,
            past = self.history.undo_depth(),
            future = self.history.redo_depth(),
            "redo"
        );
        true
    }

    /// Run the history action bound to `event`, if any.
    ///
    /// Returns the matched action even when there was nothing to undo or
    /// redo, so callers can swallow the key.
    pub fn handle_key(&mut self, event: &KeyEvent) -> Option<HistoryAction> {
        let action = resolve_history_key(event)?;
        match action {
            HistoryAction::Undo => self.undo(),
            HistoryAction::Redo => self.redo(),
        };
        Some(action)
    }

    // ====================================================================
    // Structural edits
    // ====================================================================

    pub fn add_group(&mut self) -> bool {
        self.apply(&Edit::AddGroup)
    }

    pub fn duplicate_group(&mut self, group: &GroupId) -> bool {
        self.apply(&Edit::DuplicateGroup {
            group: group.clone(),
        })
    }

    /// Refused when `group` is the only group.
    pub fn delete_group(&mut self, group: &GroupId) -> bool {
        self.apply(&Edit::DeleteGroup {
            group: group.clone(),
        })
    }

    pub fn rename_group(&mut self, group: &GroupId, name: &str) -> bool {
        self.apply(&Edit::RenameGroup {
            group: group.clone(),
            name: name.to_owned(),
        })
    }

    pub fn add_item(&mut self, group: &GroupId) -> bool {
        self.apply(&Edit::AddItem {
            group: group.clone(),
        })
    }

    /// Deleting a group's last item leaves a fresh empty item behind.
    pub fn delete_item(&mut self, group: &GroupId, item: &ItemId) -> bool {
        self.apply(&Edit::DeleteItem {
            group: group.clone(),
            item: item.clone(),
        })
    }

    /// Set an item's text as an immediate, undebounced step.
    pub fn set_text(&mut self, group: &GroupId, item: &ItemId, text: impl Into<String>) -> bool {
        self.apply(&Edit::SetText {
            group: group.clone(),
            item: item.clone(),
            text: text.into(),
        })
    }

    pub fn toggle_visual(&mut self, group: &GroupId, item: &ItemId, tag: VisualTag) -> bool {
        self.apply(&Edit::ToggleVisual {
            group: group.clone(),
            item: item.clone(),
            tag,
        })
    }

    pub fn toggle_engagement(
        &mut self,
        group: &GroupId,
        item: &ItemId,
        tag: EngagementTag,
    ) -> bool {
        self.apply(&Edit::ToggleEngagement {
            group: group.clone(),
            item: item.clone(),
            tag,
        })
    }

    pub fn move_item(&mut self, group: &GroupId, from: usize, to: usize) -> bool {
        self.apply(&Edit::MoveItem {
            group: group.clone(),
            from,
            to,
        })
    }

    // ====================================================================
    // Projects
    // ====================================================================

    /// Make a saved project's document live, as one undo step.
    pub fn load_project(&mut self, project: &Project) {
        debug!(target: TARGET, project = %project.id(), "loading project");
        self.commit(project.document().clone());
    }

    /// Save the live document into `library`. History is not touched.
    pub fn save_project(&mut self, library: &mut ProjectLibrary, name: &str) -> Option<ProjectId> {
        let id = library
            .save(name, &self.current, &mut self.ids)
            .map(|project| project.id().clone());
        match &id {
            Some(id) => debug!(target: TARGET, project = %id, "project saved"),
            None => trace!(target: TARGET, "project save skipped: blank name"),
        }
        id
    }

    /// Replace the live document and drop all history, e.g. after loading
    /// from storage.
    pub fn restore(&mut self, document: Document) {
        self.coalescer.flush();
        self.history.clear();
        self.current = Arc::new(document.normalized(&mut self.ids));
        self.revision += 1;
        debug!(target: TARGET, revision = self.revision, "document restored");
    }

    // ====================================================================
    // Observers
    // ====================================================================

    /// Bumped whenever the live document changes.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Whether [`undo`](Self::undo) would change the document.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo() || self.coalescer.is_pending()
    }

    /// Whether [`redo`](Self::redo) would change the document. An unsettled
    /// burst clears the redo stack when it settles.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo() && !self.coalescer.is_pending()
    }

    /// Settled undo steps.
    #[must_use]
    pub fn past_len(&self) -> usize {
        self.history.undo_depth()
    }

    /// Redo steps.
    #[must_use]
    pub fn future_len(&self) -> usize {
        self.history.redo_depth()
    }

    /// Whether a text burst is open.
    #[must_use]
    pub fn has_pending_text(&self) -> bool {
        self.coalescer.is_pending()
    }

    /// Read access to the snapshot stacks.
    #[must_use]
    pub fn history(&self) -> &SnapshotStore<Document> {
        &self.history
    }
}
