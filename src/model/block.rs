//! Styled text blocks produced by document extraction.

use serde::{Deserialize, Serialize};

use crate::config::{heading_font_size, DEFAULT_FONT_SIZE};

/// Text styling properties for one block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextStyle {
    /// Font size in pixels
    pub font_size: u32,

    /// Bold text
    pub bold: bool,

    /// Italic text
    pub italic: bool,

    /// Whether the block is a heading
    pub is_heading: bool,

    /// Heading level (1-6), 0 when not a heading
    pub heading_level: u8,

    /// Left indent in pixels
    pub indent: u32,
}

impl TextStyle {
    /// Style for a heading of the given level, sized from the base font.
    pub fn heading(level: u8) -> Self {
        let level = level.clamp(1, 6);
        Self {
            font_size: heading_font_size(DEFAULT_FONT_SIZE, level),
            bold: true,
            is_heading: true,
            heading_level: level,
            ..Default::default()
        }
    }
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_size: DEFAULT_FONT_SIZE,
            bold: false,
            italic: false,
            is_heading: false,
            heading_level: 0,
            indent: 0,
        }
    }
}

/// Kind tag for a text block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    /// A paragraph of body text
    #[default]
    Paragraph,

    /// A heading (level carried in the style)
    Heading,

    /// A list item
    ListItem,

    /// A block quotation
    Blockquote,

    /// Placeholder for an embedded image
    Image,
}

/// One styled block of text flowing through the pagination engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextBlock {
    /// Text content
    pub text: String,

    /// Block style
    pub style: TextStyle,

    /// Block kind
    pub kind: BlockKind,
}

impl TextBlock {
    /// Create a body paragraph with default styling.
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: TextStyle::default(),
            kind: BlockKind::Paragraph,
        }
    }

    /// Create a heading block of the given level (clamped to 1-6).
    pub fn heading(text: impl Into<String>, level: u8) -> Self {
        Self {
            text: text.into(),
            style: TextStyle::heading(level),
            kind: BlockKind::Heading,
        }
    }

    /// Heading level of this block, or 0 when it is not a heading.
    ///
    /// A block whose style claims to be a heading but carries no level
    /// degrades to a body block.
    pub fn heading_level(&self) -> u8 {
        if self.style.is_heading {
            self.style.heading_level
        } else {
            0
        }
    }
}
