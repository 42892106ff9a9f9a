//! Raw log records as supplied by the log source.
//!
//! A record is an ordered run of text fragments and icons, mirroring how the
//! host game renders a log line: words interleaved with small resource or
//! structure pictures. The classifier never looks at fragments directly; it
//! works on a [`RecordLayout`], which flattens the text and remembers where each
//! icon sat.

use serde::{Deserialize, Serialize};

use crate::resource::{ResourceKind, ResourceList, StructureKind, scan_keywords};

/// Picture token embedded in a log line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Icon {
    Resource(ResourceKind),
    Structure(StructureKind),
    DevelopmentCard,
    /// Any picture without ledger meaning (card backs, the robber, dice).
    Other(String),
}

impl Icon {
    /// Map an icon name (alt text or image stem such as `card_wool`) to an icon.
    #[must_use]
    pub fn parse(name: &str) -> Self {
        let lowered = name.trim().to_ascii_lowercase();
        let stem = lowered.strip_prefix("card_").unwrap_or(&lowered);
        if matches!(stem, "devcard" | "devcardback" | "development_card") {
            return Self::DevelopmentCard;
        }
        if let Some(kind) = ResourceKind::from_token(stem) {
            return Self::Resource(kind);
        }
        if let Some(structure) = StructureKind::from_token(stem) {
            return Self::Structure(structure);
        }
        Self::Other(lowered)
    }

    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::Resource(kind) => kind.key().to_string(),
            Self::Structure(structure) => structure.key().to_string(),
            Self::DevelopmentCard => String::from("devcard"),
            Self::Other(name) => name.clone(),
        }
    }

    #[must_use]
    pub const fn resource(&self) -> Option<ResourceKind> {
        match self {
            Self::Resource(kind) => Some(*kind),
            _ => None,
        }
    }
}

impl From<String> for Icon {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<Icon> for String {
    fn from(value: Icon) -> Self {
        value.name()
    }
}

impl From<ResourceKind> for Icon {
    fn from(value: ResourceKind) -> Self {
        Self::Resource(value)
    }
}

impl From<StructureKind> for Icon {
    fn from(value: StructureKind) -> Self {
        Self::Structure(value)
    }
}

/// Piece of a log line: plain text or an icon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Fragment {
    Text(String),
    Icon { icon: Icon },
}

/// One game-log entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Highlighted player name of the entry, when the host marks one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player: Option<String>,
    #[serde(default)]
    pub parts: Vec<Fragment>,
}

impl LogRecord {
    #[must_use]
    pub fn new(player: Option<&str>) -> Self {
        Self {
            player: player.map(str::to_string),
            parts: Vec::new(),
        }
    }

    /// Record for `player` whose text starts with the player's name.
    #[must_use]
    pub fn by(player: &str) -> Self {
        Self::new(Some(player)).with_text(player)
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        let mut text = text.into();
        if !self.parts.is_empty() && !text.starts_with(char::is_whitespace) {
            text.insert(0, ' ');
        }
        self.parts.push(Fragment::Text(text));
        self
    }

    #[must_use]
    pub fn with_icon(mut self, icon: impl Into<Icon>) -> Self {
        self.parts.push(Fragment::Icon { icon: icon.into() });
        self
    }

    pub fn icons(&self) -> impl Iterator<Item = &Icon> {
        self.parts.iter().filter_map(|part| match part {
            Fragment::Icon { icon } => Some(icon),
            Fragment::Text(_) => None,
        })
    }

    /// Flattened text content with whitespace collapsed.
    #[must_use]
    pub fn text(&self) -> String {
        self.layout().text
    }

    #[must_use]
    pub fn layout(&self) -> RecordLayout {
        RecordLayout::from_parts(&self.parts)
    }
}

/// Icon together with the byte offset in the flattened text where it appeared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedIcon {
    pub offset: usize,
    pub icon: Icon,
}

/// Flattened view of a record used for classification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordLayout {
    pub text: String,
    pub icons: Vec<PlacedIcon>,
}

impl RecordLayout {
    fn from_parts(parts: &[Fragment]) -> Self {
        let mut text = String::new();
        let mut icons = Vec::new();
        let mut pending_space = false;
        for part in parts {
            match part {
                Fragment::Text(chunk) => {
                    for ch in chunk.chars() {
                        if ch.is_whitespace() {
                            pending_space = !text.is_empty();
                        } else {
                            if pending_space {
                                text.push(' ');
                                pending_space = false;
                            }
                            text.push(ch);
                        }
                    }
                }
                Fragment::Icon { icon } => {
                    icons.push(PlacedIcon {
                        offset: text.len(),
                        icon: icon.clone(),
                    });
                    pending_space = !text.is_empty();
                }
            }
        }
        Self { text, icons }
    }

    /// Every resource icon in order of appearance.
    #[must_use]
    pub fn resources(&self) -> ResourceList {
        self.resources_between(0, usize::MAX)
    }

    /// Resource icons placed within `[start, end)` of the flattened text.
    #[must_use]
    pub fn resources_between(&self, start: usize, end: usize) -> ResourceList {
        self.icons
            .iter()
            .filter(|placed| placed.offset >= start && placed.offset < end)
            .filter_map(|placed| placed.icon.resource())
            .collect()
    }

    #[must_use]
    pub fn has_resource_icons(&self) -> bool {
        self.icons.iter().any(|placed| placed.icon.resource().is_some())
    }

    /// Resources in `[start, end)`: icons when the record carries any resource
    /// icon at all, otherwise keywords found in that span of text.
    #[must_use]
    pub fn resources_or_keywords(&self, start: usize, end: usize) -> ResourceList {
        if self.has_resource_icons() {
            return self.resources_between(start, end);
        }
        let end = end.min(self.text.len());
        let start = start.min(end);
        self.text
            .get(start..end)
            .map(scan_keywords)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn structure(&self) -> Option<StructureKind> {
        self.icons.iter().find_map(|placed| match placed.icon {
            Icon::Structure(structure) => Some(structure),
            _ => None,
        })
    }

    #[must_use]
    pub fn has_development_card(&self) -> bool {
        self.icons
            .iter()
            .any(|placed| placed.icon == Icon::DevelopmentCard)
    }

    /// Byte range of the first occurrence of `needle`.
    #[must_use]
    pub fn find(&self, needle: &str) -> Option<(usize, usize)> {
        self.text
            .find(needle)
            .map(|start| (start, start + needle.len()))
    }

    /// Byte range of the last occurrence of `needle`.
    #[must_use]
    pub fn rfind(&self, needle: &str) -> Option<(usize, usize)> {
        self.text
            .rfind(needle)
            .map(|start| (start, start + needle.len()))
    }
}
