#![forbid(unsafe_code)]

//! Document model: a document is an ordered list of groups ("storytellings"),
//! each holding an ordered list of items ("stories").
//!
//! # Invariants
//!
//! 1. A [`Document`] always holds at least one [`Group`].
//! 2. A [`Group`] always holds at least one [`Item`].
//! 3. Values are never mutated in place once shared; edits in
//!    [`crate::edit`] build a new `Document` that shares unchanged groups and
//!    items with the old one through `im::Vector`.
//!
//! The serialized form keeps the field names of the stored JSON
//! (`stories`, `visual`, `engagement`) so documents written by earlier
//! versions of the app load unchanged.

use im::Vector;
use serde::{Deserialize, Serialize};

use crate::id::{GroupId, IdGenerator, ItemId};
use crate::tag::{EngagementTag, VisualTag};

/// Name prefix for automatically numbered groups.
pub const GROUP_NAME_PREFIX: &str = "Storytelling";

/// Default name for the `n`-th group (1-based).
#[must_use]
pub fn default_group_name(n: usize) -> String {
    format!("{GROUP_NAME_PREFIX} {n}")
}

/// One story slide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    #[serde(default)]
    pub text: String,
    #[serde(rename = "visual", default)]
    pub visual_tag: Option<VisualTag>,
    #[serde(rename = "engagement", default)]
    pub engagement_tag: Option<EngagementTag>,
}

impl Item {
    /// A fresh item with no text and no tags.
    #[must_use]
    pub fn empty(id: ItemId) -> Self {
        Self {
            id,
            text: String::new(),
            visual_tag: None,
            engagement_tag: None,
        }
    }

    /// Same content under a new identifier.
    #[must_use]
    pub fn copy_with_id(&self, id: ItemId) -> Self {
        Self {
            id,
            ..self.clone()
        }
    }

    /// True when the item has neither text nor tags.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.text.is_empty() && self.visual_tag.is_none() && self.engagement_tag.is_none()
    }
}

/// A named column of items.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Group {
    id: GroupId,
    name: String,
    #[serde(rename = "stories")]
    items: Vector<Item>,
}

impl Group {
    /// Build a group from parts. An empty `items` list is replaced by one
    /// freshly minted empty item.
    #[must_use]
    pub fn new(
        id: GroupId,
        name: impl Into<String>,
        items: Vector<Item>,
        ids: &mut IdGenerator,
    ) -> Self {
        let mut group = Self {
            id,
            name: name.into(),
            items,
        };
        group.ensure_item(ids);
        group
    }

    /// A group holding one empty item.
    #[must_use]
    pub fn with_empty_item(name: impl Into<String>, ids: &mut IdGenerator) -> Self {
        Self {
            id: ids.group_id(),
            name: name.into(),
            items: Vector::unit(Item::empty(ids.item_id())),
        }
    }

    #[must_use]
    pub fn id(&self) -> &GroupId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn items(&self) -> &Vector<Item> {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Always false for a well-formed group.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn item(&self, id: &ItemId) -> Option<&Item> {
        self.items.iter().find(|item| &item.id == id)
    }

    #[must_use]
    pub fn item_index(&self, id: &ItemId) -> Option<usize> {
        self.items.iter().position(|item| &item.id == id)
    }

    /// Copy of this group with fresh identifiers for the group and every item.
    #[must_use]
    pub fn duplicate(&self, name: impl Into<String>, ids: &mut IdGenerator) -> Self {
        Self {
            id: ids.group_id(),
            name: name.into(),
            items: self
                .items
                .iter()
                .map(|item| item.copy_with_id(ids.item_id()))
                .collect(),
        }
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub(crate) fn items_mut(&mut self) -> &mut Vector<Item> {
        &mut self.items
    }

    pub(crate) fn ensure_item(&mut self, ids: &mut IdGenerator) {
        if self.items.is_empty() {
            self.items.push_back(Item::empty(ids.item_id()));
        }
    }
}

/// The full editable state: every group and its items.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    groups: Vector<Group>,
}

impl Document {
    /// The initial document: one group with one empty item.
    #[must_use]
    pub fn new(ids: &mut IdGenerator) -> Self {
        Self {
            groups: Vector::unit(Group::with_empty_item(default_group_name(1), ids)),
        }
    }

    /// Build a document from groups loaded elsewhere, repairing the
    /// structural invariants: an empty list becomes the initial document and
    /// empty groups receive one empty item.
    #[must_use]
    pub fn from_groups(groups: impl IntoIterator<Item = Group>, ids: &mut IdGenerator) -> Self {
        let mut groups: Vector<Group> = groups
            .into_iter()
            .map(|mut group| {
                group.ensure_item(ids);
                group
            })
            .collect();
        if groups.is_empty() {
            groups.push_back(Group::with_empty_item(default_group_name(1), ids));
        }
        Self { groups }
    }

    /// Repair a document that was deserialized without validation.
    #[must_use]
    pub fn normalized(self, ids: &mut IdGenerator) -> Self {
        if self.is_well_formed() {
            self
        } else {
            Self::from_groups(self.groups, ids)
        }
    }

    #[must_use]
    pub fn groups(&self) -> &Vector<Group> {
        &self.groups
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Always false for a well-formed document.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// True when both structural invariants hold.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        !self.groups.is_empty() && self.groups.iter().all(|group| !group.is_empty())
    }

    #[must_use]
    pub fn group(&self, id: &GroupId) -> Option<&Group> {
        self.groups.iter().find(|group| &group.id == id)
    }

    #[must_use]
    pub fn group_index(&self, id: &GroupId) -> Option<usize> {
        self.groups.iter().position(|group| &group.id == id)
    }

    #[must_use]
    pub fn item(&self, group: &GroupId, item: &ItemId) -> Option<&Item> {
        self.group(group).and_then(|g| g.item(item))
    }

    /// Number of items across all groups.
    #[must_use]
    pub fn total_items(&self) -> usize {
        self.groups.iter().map(Group::len).sum()
    }

    pub(crate) fn groups_mut(&mut self) -> &mut Vector<Group> {
        &mut self.groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_document_has_one_blank_item() {
        let mut ids = IdGenerator::seeded(1);
        let doc = Document::new(&mut ids);
        assert_eq!(doc.len(), 1);
        let group = &doc.groups()[0];
        assert_eq!(group.name(), "Storytelling 1");
        assert_eq!(group.len(), 1);
        assert!(group.items()[0].is_blank());
        assert!(doc.is_well_formed());
    }

    #[test]
    fn from_groups_repairs_invariants() {
        let mut ids = IdGenerator::seeded(2);
        let doc = Document::from_groups(Vec::new(), &mut ids);
        assert!(doc.is_well_formed());
        assert_eq!(doc.len(), 1);

        let empty = Group {
            id: GroupId::new("g"),
            name: "bare".into(),
            items: Vector::new(),
        };
        let doc = Document::from_groups([empty], &mut ids);
        assert_eq!(doc.groups()[0].len(), 1);
        assert_eq!(doc.groups()[0].id().as_str(), "g");
    }

    #[test]
    fn duplicate_mints_fresh_ids() {
        let mut ids = IdGenerator::seeded(3);
        let mut group = Group::with_empty_item("A", &mut ids);
        group.items_mut().push_back(Item {
            text: "hello".into(),
            visual_tag: Some(VisualTag::NicePhoto),
            ..Item::empty(ids.item_id())
        });
        let copy = group.duplicate("A (копія)", &mut ids);
        assert_ne!(copy.id(), group.id());
        assert_eq!(copy.len(), 2);
        for (a, b) in group.items().iter().zip(copy.items()) {
            assert_ne!(a.id, b.id);
            assert_eq!(a.text, b.text);
            assert_eq!(a.visual_tag, b.visual_tag);
        }
    }

    #[test]
    fn serialized_shape_matches_stored_json() {
        let mut ids = IdGenerator::seeded(4);
        let doc = Document::new(&mut ids);
        let value = serde_json::to_value(&doc).unwrap();
        let group = &value[0];
        assert_eq!(group["name"], "Storytelling 1");
        let story = &group["stories"][0];
        assert_eq!(story["text"], "");
        assert!(story["visual"].is_null());
        assert!(story["engagement"].is_null());
    }

    #[test]
    fn lookup_helpers() {
        let mut ids = IdGenerator::seeded(5);
        let doc = Document::new(&mut ids);
        let group = doc.groups()[0].clone();
        let item = group.items()[0].clone();
        assert_eq!(doc.group_index(group.id()), Some(0));
        assert_eq!(doc.item(group.id(), &item.id), Some(&item));
        assert_eq!(doc.item(group.id(), &ItemId::new("missing")), None);
        assert_eq!(doc.total_items(), 1);
    }
}
