//! Block classification.
//!
//! Only list tags (`ul`, `ol`, `li`) ever get block layout, and only when the
//! ancestor chain allows it. A list nested inside a non-list tag (for
//! example `<p><ul>..</ul></p>`) degrades to inline text flow.

use crate::dom::NodeRef;

/// Tags that may render as block containers.
pub const BLOCK_TAGS: [&str; 3] = ["ul", "ol", "li"];

/// Layout a tag node renders with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Block,
    Inline,
}

/// Check if a tag name is in the block set.
#[inline]
pub fn is_block(tag: &str) -> bool {
    BLOCK_TAGS.contains(&tag)
}

/// Check if a node is a tag in the block set (ancestors not considered).
#[inline]
pub fn is_block_node(node: NodeRef<'_>) -> bool {
    node.name().is_some_and(is_block)
}

/// Ancestor check deciding whether a block-set node keeps block layout.
///
/// `None` and top-level nodes are vacuously block-eligible. Otherwise the
/// parent must be a block-set tag and the check repeats from the parent's
/// parent, so the chain is sampled at every second ancestor.
pub fn all_ancestors_are_blocks(node: Option<NodeRef<'_>>) -> bool {
    let mut current = node;
    while let Some(node) = current {
        let Some(parent) = node.parent() else {
            return true;
        };
        if !is_block_node(parent) {
            return false;
        }
        current = parent.parent();
    }
    true
}

/// Classify a tag node.
pub fn classify(node: NodeRef<'_>) -> Layout {
    if is_block_node(node) && all_ancestors_are_blocks(Some(node)) {
        Layout::Block
    } else {
        Layout::Inline
    }
}
