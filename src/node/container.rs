//! Container node types: inline text-flow wrappers and block containers.

use crate::style::Style;

use super::{PressHandler, RenderList, RenderNode};

/// Text-flow wrapper.
///
/// Produced for every tag that does not get block layout, and as the
/// synthetic wrapper around a run of inline children of a block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InlineGroup {
    pub key: Option<usize>,
    pub style: Option<Style>,
    /// Set for `<a href>` links
    pub on_press: Option<PressHandler>,
    pub children: RenderList,
}

impl InlineGroup {
    /// Unstyled wrapper holding `children`.
    pub fn wrap(key: usize, children: RenderList) -> Self {
        Self {
            key: Some(key),
            style: None,
            on_press: None,
            children,
        }
    }

    pub fn is_link(&self) -> bool {
        self.on_press.is_some()
    }
}

/// Block container: lays children out vertically.
///
/// Its direct children are always block containers, inline groups, or
/// unkeyed literals (such as the list bullet), never bare converted text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockContainer {
    pub key: Option<usize>,
    pub style: Option<Style>,
    pub children: RenderList,
}

impl BlockContainer {
    /// Iterate non-skipped children.
    pub fn iter(&self) -> impl Iterator<Item = &RenderNode> {
        self.children.iter().flatten()
    }

    /// Number of child containers with block layout.
    pub fn block_count(&self) -> usize {
        self.iter().filter(|c| c.is_block()).count()
    }
}
