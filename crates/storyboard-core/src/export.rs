#![forbid(unsafe_code)]

//! Plain-text export of groups and documents, for the clipboard.

use crate::model::{Document, Group, Item};

/// Placeholder used for items without text.
pub const EMPTY_TEXT_PLACEHOLDER: &str = "(Текст відсутній)";

const GROUP_ITEM_SEPARATOR: &str = "\n\n------\n\n";
const DOCUMENT_ITEM_SEPARATOR: &str = "\n\n---\n\n";
const DOCUMENT_GROUP_SEPARATOR: &str = "\n\n\n";
const HEADER_RULE_WIDTH: usize = 50;

/// Render one item as it appears in an export (1-based `position`).
#[must_use]
pub fn item_text(item: &Item, position: usize) -> String {
    let body = if item.text.is_empty() {
        EMPTY_TEXT_PLACEHOLDER
    } else {
        item.text.as_str()
    };
    let mut out = format!("Сторіс {position}\n{body}");
    if let Some(visual) = item.visual_tag {
        out.push_str("\nВізуал: ");
        out.push_str(visual.label());
    }
    if let Some(engagement) = item.engagement_tag {
        out.push_str("\nІнтерактив: ");
        out.push_str(engagement.label());
    }
    out
}

fn items_joined(group: &Group, separator: &str) -> String {
    group
        .items()
        .iter()
        .enumerate()
        .map(|(idx, item)| item_text(item, idx + 1))
        .collect::<Vec<_>>()
        .join(separator)
}

/// Export a single group.
#[must_use]
pub fn group_text(group: &Group) -> String {
    items_joined(group, GROUP_ITEM_SEPARATOR)
}

/// Export the whole document, one framed header per group.
#[must_use]
pub fn document_text(doc: &Document) -> String {
    let rule = "=".repeat(HEADER_RULE_WIDTH);
    doc.groups()
        .iter()
        .map(|group| {
            format!(
                "\n{rule}\n{}\n{rule}\n\n{}",
                group.name(),
                items_joined(group, DOCUMENT_ITEM_SEPARATOR)
            )
        })
        .collect::<Vec<_>>()
        .join(DOCUMENT_GROUP_SEPARATOR)
}

/// Text of a single item, or `None` when there is nothing worth copying.
#[must_use]
pub fn copyable_item_text(item: &Item) -> Option<&str> {
    if item.text.trim().is_empty() {
        None
    } else {
        Some(item.text.as_str())
    }
}
