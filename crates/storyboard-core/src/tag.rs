#![forbid(unsafe_code)]

//! Classification tags attached to a story slide.
//!
//! Each item carries at most one [`VisualTag`] (how the slide is shot) and at
//! most one [`EngagementTag`] (how the audience is asked to react). Setting a
//! tag uses toggle semantics; see [`toggle`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Visual format of a slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VisualTag {
    #[serde(rename = "Кольоровий фон")]
    ColorBackground,
    #[serde(rename = "Говоряща голова")]
    TalkingHead,
    #[serde(rename = "Відео в тему")]
    TopicalVideo,
    #[serde(rename = "Гарне фото")]
    NicePhoto,
}

impl VisualTag {
    /// All visual tags in presentation order.
    pub const ALL: [Self; 4] = [
        Self::ColorBackground,
        Self::TalkingHead,
        Self::TopicalVideo,
        Self::NicePhoto,
    ];

    /// User-facing label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::ColorBackground => "Кольоровий фон",
            Self::TalkingHead => "Говоряща голова",
            Self::TopicalVideo => "Відео в тему",
            Self::NicePhoto => "Гарне фото",
        }
    }

    /// Look a tag up by its label.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tag| tag.label() == label)
    }
}

impl fmt::Display for VisualTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Audience interaction requested by a slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EngagementTag {
    #[serde(rename = "Стікер")]
    Sticker,
    #[serde(rename = "Тягнулка")]
    Slider,
    #[serde(rename = "Опитування")]
    Poll,
    #[serde(rename = "Заклик в дірект")]
    DirectMessageCall,
}

impl EngagementTag {
    /// All engagement tags in presentation order.
    pub const ALL: [Self; 4] = [
        Self::Sticker,
        Self::Slider,
        Self::Poll,
        Self::DirectMessageCall,
    ];

    /// User-facing label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Sticker => "Стікер",
            Self::Slider => "Тягнулка",
            Self::Poll => "Опитування",
            Self::DirectMessageCall => "Заклик в дірект",
        }
    }

    /// Look a tag up by its label.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tag| tag.label() == label)
    }
}

impl fmt::Display for EngagementTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Toggle `requested` against the currently active tag.
///
/// Requesting the active tag clears it; requesting any other tag replaces it.
#[must_use]
pub fn toggle<T: PartialEq>(current: Option<T>, requested: T) -> Option<T> {
    match current {
        Some(active) if active == requested => None,
        _ => Some(requested),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_same_clears() {
        assert_eq!(toggle(Some(VisualTag::NicePhoto), VisualTag::NicePhoto), None);
    }

    #[test]
    fn toggle_other_replaces() {
        assert_eq!(
            toggle(Some(EngagementTag::Poll), EngagementTag::Sticker),
            Some(EngagementTag::Sticker)
        );
        assert_eq!(toggle(None, EngagementTag::Slider), Some(EngagementTag::Slider));
    }

    #[test]
    fn labels_round_trip() {
        for tag in VisualTag::ALL {
            assert_eq!(VisualTag::from_label(tag.label()), Some(tag));
        }
        for tag in EngagementTag::ALL {
            assert_eq!(EngagementTag::from_label(tag.label()), Some(tag));
        }
        assert_eq!(VisualTag::from_label("unknown"), None);
    }

    #[test]
    fn serde_uses_labels() {
        let json = serde_json::to_string(&EngagementTag::DirectMessageCall).unwrap();
        assert_eq!(json, "\"Заклик в дірект\"");
        let tag: VisualTag = serde_json::from_str("\"Говоряща голова\"").unwrap();
        assert_eq!(tag, VisualTag::TalkingHead);
    }
}
