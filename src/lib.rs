//! htmlview - Render HTML markup as a tree of mobile UI primitives
//!
//! ## Core Concepts
//!
//! **Render tree**: markup is parsed into an arena-backed [`DomTree`] and
//! mapped to [`RenderNode`]s: text runs, inline text-flow wrappers, block
//! containers and image references.
//!
//! **Block segregation**: only list tags (`ul`, `ol`, `li`) get block layout,
//! and only in a block-eligible context. Inline content under a block
//! container is always wrapped in one text flow per contiguous run, so block
//! and inline layout never mix under the same block parent.
//!
//! ## Modules
//! - `dom`: DOM arena and the lenient HTML parser
//! - `classify`: block/inline classification
//! - `convert`: the converter, grouping algorithm and entry points
//! - `node`: render tree types
//! - `style`: style values, registry and merging
//! - `image`: image sizing against a layout boundary
//! - `render`: outline printer
//!
//! ## Usage
//!
//! ```ignore
//! use htmlview::prelude::*;
//!
//! let options = ConvertOptions::new()
//!     .with_styles(StyleSheet::new().with_tag("b", Style::new().with("font_weight", "bold")))
//!     .with_link_handler(|url| open_url(url));
//!
//! let tree = render_html("<p>Hello <b>world</b></p>", &options)?;
//! ```

// =============================================================================
// Core modules
// =============================================================================

/// DOM arena and parser
pub mod dom;

/// Block classification
pub mod classify;

/// DOM → render tree conversion
pub mod convert;

/// Render tree types: TextRun, InlineGroup, BlockContainer, ImageRef
pub mod node;

/// Styles and the style registry
pub mod style;

/// Attribute types
pub mod attr;

/// Image sizing
pub mod image;

/// Outline rendering
pub mod render;

/// Error types
pub mod error;

/// Prelude for common imports
pub mod prelude;

// =============================================================================
// Re-exports
// =============================================================================

// DOM
pub use dom::{
    DEFAULT_MAX_DEPTH, DomTree, HtmlParser, MarkupParser, NodeId, NodeKind, NodeRef, ParseOptions,
};

// Classification
pub use classify::{Layout, all_ancestors_are_blocks, classify, is_block};

// Conversion
pub use convert::{
    ChildGroup, ConvertOptions, Converter, CustomRenderer, Rendered, group_block_children,
    render_html, render_html_using, render_html_with,
};

#[cfg(feature = "parallel")]
pub use convert::render_html_batch;

// Render tree
pub use node::{
    BlockContainer, ImageRef, InlineGroup, LinkHandler, PressHandler, RenderList, RenderNode,
    TextRun,
};

// Styles
pub use style::{Style, StyleSheet, StyleValue, merge_styles};

// Images
pub use image::{ImageLayout, ImageSource, ResizableImage};

#[cfg(feature = "async")]
pub use image::{SizeResolver, resolve_image_sizes};

// Error types
pub use error::{HtmlViewError, HtmlViewResult, ParseError};

// =============================================================================
// Tests
// =============================================================================
