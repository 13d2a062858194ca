//! Render tree types.
//!
//! The converter maps every DOM node to at most one [`RenderNode`]:
//!
//! - [`TextRun`]: a leaf run of text
//! - [`InlineGroup`]: a text-flow wrapper around inline children
//! - [`BlockContainer`]: a block/list container laying children out vertically
//! - [`ImageRef`]: an image reference with its declared size
//!
//! Child lists are [`RenderList`]s: `None` entries are kept so that a node
//! skipped by a custom renderer still occupies its index.
//!
//! A converted tree is owned by the caller; nothing in it borrows from the
//! DOM it was built from.

mod container;
mod image;
mod text;

pub use container::{BlockContainer, InlineGroup};
pub use image::ImageRef;
pub use text::TextRun;

use std::sync::Arc;

use crate::style::Style;

/// Ordered child sequence of render nodes; `None` marks a skipped node.
pub type RenderList = Vec<Option<RenderNode>>;

/// A node in the render tree.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderNode {
    Text(TextRun),
    Inline(InlineGroup),
    Block(BlockContainer),
    Image(ImageRef),
}

impl RenderNode {
    /// Position among processed siblings, if the node was keyed.
    pub fn key(&self) -> Option<usize> {
        match self {
            RenderNode::Text(t) => t.key,
            RenderNode::Inline(g) => g.key,
            RenderNode::Block(b) => b.key,
            RenderNode::Image(i) => i.key,
        }
    }

    pub fn style(&self) -> Option<&Style> {
        match self {
            RenderNode::Text(t) => t.style.as_ref(),
            RenderNode::Inline(g) => g.style.as_ref(),
            RenderNode::Block(b) => b.style.as_ref(),
            RenderNode::Image(i) => Some(&i.style),
        }
    }

    /// Child list; empty for leaves.
    pub fn children(&self) -> &[Option<RenderNode>] {
        match self {
            RenderNode::Inline(g) => &g.children,
            RenderNode::Block(b) => &b.children,
            RenderNode::Text(_) | RenderNode::Image(_) => &[],
        }
    }

    #[inline]
    pub fn is_block(&self) -> bool {
        matches!(self, RenderNode::Block(_))
    }

    #[inline]
    pub fn is_inline(&self) -> bool {
        matches!(self, RenderNode::Inline(_))
    }

    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self, RenderNode::Text(_))
    }

    #[inline]
    pub fn is_image(&self) -> bool {
        matches!(self, RenderNode::Image(_))
    }

    pub fn as_text(&self) -> Option<&TextRun> {
        match self {
            RenderNode::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_inline(&self) -> Option<&InlineGroup> {
        match self {
            RenderNode::Inline(g) => Some(g),
            _ => None,
        }
    }

    pub fn as_block(&self) -> Option<&BlockContainer> {
        match self {
            RenderNode::Block(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_image(&self) -> Option<&ImageRef> {
        match self {
            RenderNode::Image(i) => Some(i),
            _ => None,
        }
    }

    /// Concatenated text of all descendant text runs.
    pub fn text_content(&self) -> String {
        let mut buf = String::new();
        self.collect_text(&mut buf);
        buf
    }

    fn collect_text(&self, buf: &mut String) {
        match self {
            RenderNode::Text(t) => buf.push_str(&t.content),
            RenderNode::Image(_) => {}
            RenderNode::Inline(_) | RenderNode::Block(_) => {
                for child in self.children().iter().flatten() {
                    child.collect_text(buf);
                }
            }
        }
    }

    /// Visit this node and its descendants depth-first.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a RenderNode)) {
        f(self);
        for child in self.children().iter().flatten() {
            child.walk(f);
        }
    }
}

/// Concatenated text of a whole render list.
pub fn list_text(list: &[Option<RenderNode>]) -> String {
    list.iter().flatten().map(RenderNode::text_content).collect()
}

// =============================================================================
// PressHandler
// =============================================================================

/// Callback receiving the decoded URL of an activated link.
pub type LinkHandler = Arc<dyn Fn(&str) + Send + Sync>;

/// Press action bound to a link.
///
/// Built during conversion but only run when [`PressHandler::press`] is
/// called by the UI.
#[derive(Clone)]
pub struct PressHandler {
    url: String,
    handler: Option<LinkHandler>,
}

impl PressHandler {
    pub fn new(url: impl Into<String>, handler: Option<LinkHandler>) -> Self {
        Self {
            url: url.into(),
            handler,
        }
    }

    /// Decoded link target.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Invoke the link handler with the link target.
    pub fn press(&self) {
        match &self.handler {
            Some(handler) => handler(&self.url),
            None => log::debug!("link {} pressed with no link handler configured", self.url),
        }
    }
}

impl std::fmt::Debug for PressHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PressHandler")
            .field("url", &self.url)
            .field("has_handler", &self.handler.is_some())
            .finish()
    }
}

impl PartialEq for PressHandler {
    fn eq(&self, other: &Self) -> bool {
        self.url == other.url
    }
}
