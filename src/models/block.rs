use serde::{Deserialize, Serialize};

/// Kind of a body block.
///
/// Text-bearing kinds have a dedicated variant. Anything else (images,
/// dividers, embeds, ...) is `Unsupported` and contributes no text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Paragraph,
    Heading1,
    Heading2,
    Heading3,
    BulletedListItem,
    NumberedListItem,
    Quote,
    Callout,
    Toggle,
    ToDo,
    Code,
    Unsupported(String),
}

impl BlockKind {
    /// Maps a store block type name to a `BlockKind`.
    pub fn from_type_name(name: &str) -> Self {
        match name {
            "paragraph" => Self::Paragraph,
            "heading_1" => Self::Heading1,
            "heading_2" => Self::Heading2,
            "heading_3" => Self::Heading3,
            "bulleted_list_item" => Self::BulletedListItem,
            "numbered_list_item" => Self::NumberedListItem,
            "quote" => Self::Quote,
            "callout" => Self::Callout,
            "toggle" => Self::Toggle,
            "to_do" => Self::ToDo,
            "code" => Self::Code,
            other => Self::Unsupported(other.to_string()),
        }
    }

    /// Returns `true` if blocks of this kind carry extractable text.
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported(_))
    }
}

/// A single block of a record's body, one nesting level deep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// The block kind.
    pub kind: BlockKind,
    /// Plain-text runs in document order.
    pub text: Vec<String>,
    /// Language annotation; only set for code blocks.
    pub language: Option<String>,
}

impl Block {
    /// Creates a block of the given kind from plain-text runs.
    pub fn new(kind: BlockKind, text: Vec<String>) -> Self {
        Self {
            kind,
            text,
            language: None,
        }
    }

    /// Convenience constructor for a single-run paragraph.
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::new(BlockKind::Paragraph, vec![text.into()])
    }

    /// Convenience constructor for a code block.
    pub fn code(text: impl Into<String>, language: Option<&str>) -> Self {
        Self {
            kind: BlockKind::Code,
            text: vec![text.into()],
            language: language.map(str::to_string),
        }
    }

    /// Convenience constructor for a block that carries no text.
    pub fn unsupported(type_name: impl Into<String>) -> Self {
        Self::new(BlockKind::Unsupported(type_name.into()), Vec::new())
    }
}
