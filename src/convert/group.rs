//! Inline/block grouping of a block container's children.
//!
//! ```text
//! text, <li>, text, text, <li>
//!   → [text] [<li>] [text, text] [<li>]
//! ```
//!
//! Every block-set child forms its own group; every maximal run of other
//! children forms one inline group. Groups are contiguous slices of the
//! original child list, in order.

use crate::classify::is_block_node;
use crate::dom::{DomTree, NodeId};

/// One group of a block container's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildGroup<'a> {
    /// A single block-set node (slice of length 1).
    Block(&'a [NodeId]),
    /// A maximal run of non-block-set nodes, wrapped in one text flow.
    Inline(&'a [NodeId]),
}

impl<'a> ChildGroup<'a> {
    pub fn nodes(&self) -> &'a [NodeId] {
        match self {
            ChildGroup::Block(nodes) | ChildGroup::Inline(nodes) => nodes,
        }
    }

    pub fn is_block(&self) -> bool {
        matches!(self, ChildGroup::Block(_))
    }
}

/// Partition `children` into block singletons and inline runs.
///
/// A block-set node at the very start does not produce an empty inline group
/// before it.
pub fn group_block_children<'a>(tree: &DomTree, children: &'a [NodeId]) -> Vec<ChildGroup<'a>> {
    let mut groups = Vec::new();
    let mut run_start: Option<usize> = None;

    for (i, &id) in children.iter().enumerate() {
        if is_block_node(tree.node(id)) {
            if let Some(start) = run_start.take() {
                groups.push(ChildGroup::Inline(&children[start..i]));
            }
            groups.push(ChildGroup::Block(&children[i..=i]));
        } else if run_start.is_none() {
            run_start = Some(i);
        }
    }
    if let Some(start) = run_start {
        groups.push(ChildGroup::Inline(&children[start..]));
    }

    groups
}
