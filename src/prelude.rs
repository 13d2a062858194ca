//! Prelude module for common imports.
//!
//! ```ignore
//! use htmlview::prelude::*;
//! ```

// DOM
pub use crate::dom::{DomTree, HtmlParser, MarkupParser, NodeId, NodeKind, NodeRef, ParseOptions};

// Attributes
pub use crate::attr::{Attrs, AttrsExt};

// Classification
pub use crate::classify::{Layout, classify};

// Conversion
pub use crate::convert::{
    ConvertOptions, Converter, CustomRenderer, Rendered, render_html, render_html_using,
    render_html_with,
};

#[cfg(feature = "parallel")]
pub use crate::convert::render_html_batch;

// Render tree
pub use crate::node::{
    BlockContainer, ImageRef, InlineGroup, PressHandler, RenderList, RenderNode, TextRun,
};

// Styles
pub use crate::style::{Style, StyleSheet, StyleValue};

// Images
pub use crate::image::{ImageLayout, ResizableImage};

#[cfg(feature = "async")]
pub use crate::image::{SizeResolver, resolve_image_sizes};

// Outline
pub use crate::render::{OutlineConfig, outline, outline_with};

// Error
pub use crate::error::{HtmlViewError, HtmlViewResult, ParseError};
