#![forbid(unsafe_code)]

//! Pure document edits.
//!
//! Every structural change to a [`Document`] is described by an [`Edit`]
//! value and applied with [`apply`], which returns the derived document or
//! `None` when the edit is a no-op. No-ops are never errors, and only invalid
//! input produces one: a missing identifier, an out-of-range index, deleting
//! the last remaining group, or an empty name.
//!
//! A valid edit always yields a document, even when it equals the input
//! (moving an item onto its own index, renaming a group to its current name).
//!
//! `apply` never touches its input. The returned document shares every
//! untouched group and item with the original.

use crate::id::{GroupId, IdGenerator, ItemId};
use crate::model::{Document, Group, Item, default_group_name};
use crate::tag::{self, EngagementTag, VisualTag};

/// Suffix appended to the name of a duplicated group.
pub const DUPLICATE_SUFFIX: &str = " (копія)";

/// A single document edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    /// Append a new group holding one empty item.
    AddGroup,
    /// Insert a fresh-id copy right after the source group.
    DuplicateGroup { group: GroupId },
    /// Remove a group unless it is the only one.
    DeleteGroup { group: GroupId },
    /// Rename a group to the trimmed `name`.
    RenameGroup { group: GroupId, name: String },
    /// Append an empty item to a group.
    AddItem { group: GroupId },
    /// Remove an item; the last item of a group is replaced by a blank one.
    DeleteItem { group: GroupId, item: ItemId },
    /// Replace an item's text.
    SetText {
        group: GroupId,
        item: ItemId,
        text: String,
    },
    /// Toggle an item's visual tag.
    ToggleVisual {
        group: GroupId,
        item: ItemId,
        tag: VisualTag,
    },
    /// Toggle an item's engagement tag.
    ToggleEngagement {
        group: GroupId,
        item: ItemId,
        tag: EngagementTag,
    },
    /// Move an item within its group from index `from` to index `to`.
    MoveItem {
        group: GroupId,
        from: usize,
        to: usize,
    },
}

impl Edit {
    /// Short stable name, used in logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::AddGroup => "add_group",
            Self::DuplicateGroup { .. } => "duplicate_group",
            Self::DeleteGroup { .. } => "delete_group",
            Self::RenameGroup { .. } => "rename_group",
            Self::AddItem { .. } => "add_item",
            Self::DeleteItem { .. } => "delete_item",
            Self::SetText { .. } => "set_text",
            Self::ToggleVisual { .. } => "toggle_visual",
            Self::ToggleEngagement { .. } => "toggle_engagement",
            Self::MoveItem { .. } => "move_item",
        }
    }

    /// The group this edit targets, if any.
    #[must_use]
    pub fn target_group(&self) -> Option<&GroupId> {
        match self {
            Self::AddGroup => None,
            Self::DuplicateGroup { group }
            | Self::DeleteGroup { group }
            | Self::RenameGroup { group, .. }
            | Self::AddItem { group }
            | Self::DeleteItem { group, .. }
            | Self::SetText { group, .. }
            | Self::ToggleVisual { group, .. }
            | Self::ToggleEngagement { group, .. }
            | Self::MoveItem { group, .. } => Some(group),
        }
    }
}

/// Apply `edit` to `doc`, returning the derived document or `None` for a
/// no-op.
#[must_use]
pub fn apply(doc: &Document, edit: &Edit, ids: &mut IdGenerator) -> Option<Document> {
    match edit {
        Edit::AddGroup => Some(add_group(doc, ids)),
        Edit::DuplicateGroup { group } => duplicate_group(doc, group, ids),
        Edit::DeleteGroup { group } => delete_group(doc, group),
        Edit::RenameGroup { group, name } => rename_group(doc, group, name),
        Edit::AddItem { group } => add_item(doc, group, ids),
        Edit::DeleteItem { group, item } => delete_item(doc, group, item, ids),
        Edit::SetText { group, item, text } => update_item(doc, group, item, |it| {
            it.text.clone_from(text);
            true
        }),
        Edit::ToggleVisual { group, item, tag } => update_item(doc, group, item, |it| {
            it.visual_tag = tag::toggle(it.visual_tag, *tag);
            true
        }),
        Edit::ToggleEngagement { group, item, tag } => update_item(doc, group, item, |it| {
            it.engagement_tag = tag::toggle(it.engagement_tag, *tag);
            true
        }),
        Edit::MoveItem { group, from, to } => move_item(doc, group, *from, *to),
    }
}

fn add_group(doc: &Document, ids: &mut IdGenerator) -> Document {
    let mut next = doc.clone();
    let name = default_group_name(doc.len() + 1);
    next.groups_mut().push_back(Group::with_empty_item(name, ids));
    next
}

fn duplicate_group(doc: &Document, id: &GroupId, ids: &mut IdGenerator) -> Option<Document> {
    let idx = doc.group_index(id)?;
    let source = &doc.groups()[idx];
    let copy = source.duplicate(format!("{}{DUPLICATE_SUFFIX}", source.name()), ids);
    let mut next = doc.clone();
    next.groups_mut().insert(idx + 1, copy);
    Some(next)
}

fn delete_group(doc: &Document, id: &GroupId) -> Option<Document> {
    if doc.len() <= 1 {
        return None;
    }
    let idx = doc.group_index(id)?;
    let mut next = doc.clone();
    next.groups_mut().remove(idx);
    Some(next)
}

fn rename_group(doc: &Document, id: &GroupId, name: &str) -> Option<Document> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    update_group(doc, id, |group| {
        group.set_name(name.to_owned());
        true
    })
}

fn add_item(doc: &Document, id: &GroupId, ids: &mut IdGenerator) -> Option<Document> {
    update_group(doc, id, |group| {
        group.items_mut().push_back(Item::empty(ids.item_id()));
        true
    })
}

fn delete_item(
    doc: &Document,
    group_id: &GroupId,
    item_id: &ItemId,
    ids: &mut IdGenerator,
) -> Option<Document> {
    update_group(doc, group_id, |group| {
        let Some(idx) = group.item_index(item_id) else {
            return false;
        };
        group.items_mut().remove(idx);
        group.ensure_item(ids);
        true
    })
}

fn move_item(doc: &Document, id: &GroupId, from: usize, to: usize) -> Option<Document> {
    update_group(doc, id, |group| {
        let len = group.len();
        if from >= len || to >= len {
            return false;
        }
        let items = group.items_mut();
        let moved = items.remove(from);
        items.insert(to, moved);
        true
    })
}

/// Run `f` against a copy of the target group; `f` returns `false` when the
/// edit does not apply to it.
fn update_group<F>(doc: &Document, id: &GroupId, f: F) -> Option<Document>
where
    F: FnOnce(&mut Group) -> bool,
{
    let idx = doc.group_index(id)?;
    let mut next = doc.clone();
    let group = next.groups_mut().get_mut(idx)?;
    f(group).then_some(next)
}

fn update_item<F>(doc: &Document, group_id: &GroupId, item_id: &ItemId, f: F) -> Option<Document>
where
    F: FnOnce(&mut Item) -> bool,
{
    update_group(doc, group_id, |group| {
        let Some(idx) = group.item_index(item_id) else {
            return false;
        };
        match group.items_mut().get_mut(idx) {
            Some(item) => f(item),
            None => false,
        }
    })
}
