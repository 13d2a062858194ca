//! Text run node type

use crate::style::Style;

/// Leaf run of text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextRun {
    pub key: Option<usize>,
    /// Text content, entities already decoded
    pub content: String,
    pub style: Option<Style>,
}

impl TextRun {
    /// Create a text run converted from a DOM node at sibling position `key`.
    pub fn keyed(key: usize, content: impl Into<String>, style: Option<Style>) -> Self {
        Self {
            key: Some(key),
            content: content.into(),
            style,
        }
    }

    /// Create an unkeyed, unstyled run (line breaks and other literals).
    pub fn literal(content: impl Into<String>) -> Self {
        Self {
            key: None,
            content: content.into(),
            style: None,
        }
    }
}
