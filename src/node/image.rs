//! Image reference node type.

use crate::style::Style;

/// Image reference with its declared size.
///
/// A width or height of 0 means "unspecified"; the size is resolved at render
/// time (see [`crate::image::ResizableImage`]).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageRef {
    pub key: Option<usize>,
    /// `src` attribute as written
    pub uri: Option<String>,
    pub width: u32,
    pub height: u32,
    /// `width`/`height` style mirroring the declared size
    pub style: Style,
}

impl ImageRef {
    pub fn new(key: Option<usize>, uri: Option<String>, width: u32, height: u32) -> Self {
        let style = Style::new().with("width", width).with("height", height);
        Self {
            key,
            uri,
            width,
            height,
            style,
        }
    }

    /// Check if both dimensions are unspecified.
    pub fn is_unsized(&self) -> bool {
        self.width == 0 && self.height == 0
    }
}
