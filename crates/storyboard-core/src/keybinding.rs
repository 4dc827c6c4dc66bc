#![forbid(unsafe_code)]

//! Global undo/redo key gestures.
//!
//! | Gesture | Action |
//! |---------|--------|
//! | Ctrl+Z / Cmd+Z | [`HistoryAction::Undo`] |
//! | Ctrl+Shift+Z / Cmd+Shift+Z | [`HistoryAction::Redo`] |
//!
//! Ctrl and Cmd (Super) are interchangeable so the same binding works on
//! every platform. Only press and repeat events resolve; releases are
//! ignored.
//!
//! # Example
//!
//! ```
//! use storyboard_core::event::{KeyCode, KeyEvent, Modifiers};
//! use storyboard_core::keybinding::{HistoryAction, resolve_history_key};
//!
//! let undo = KeyEvent::new(KeyCode::Char('z')).with_modifiers(Modifiers::CTRL);
//! assert_eq!(resolve_history_key(&undo), Some(HistoryAction::Undo));
//!
//! let redo = KeyEvent::new(KeyCode::Char('Z'))
//!     .with_modifiers(Modifiers::SUPER | Modifiers::SHIFT);
//! assert_eq!(resolve_history_key(&redo), Some(HistoryAction::Redo));
//! ```

use crate::event::{KeyCode, KeyEvent, KeyEventKind, Modifiers};

/// History action a key gesture maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HistoryAction {
    Undo,
    Redo,
}

/// Resolve a key event to a history action.
#[must_use]
pub fn resolve_history_key(event: &KeyEvent) -> Option<HistoryAction> {
    if event.kind == KeyEventKind::Release {
        return None;
    }
    let KeyCode::Char(c) = event.code else {
        return None;
    };
    if !c.eq_ignore_ascii_case(&'z') {
        return None;
    }
    if !event.modifiers.intersects(Modifiers::CTRL | Modifiers::SUPER)
        || event.modifiers.contains(Modifiers::ALT)
    {
        return None;
    }
    if event.modifiers.contains(Modifiers::SHIFT) {
        Some(HistoryAction::Redo)
    } else {
        Some(HistoryAction::Undo)
    }
}
