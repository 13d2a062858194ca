//! Parsed DOM, held in an arena.
//!
//! All nodes live in one `Vec<DomNode>` owned by [`DomTree`] and are referred to
//! by [`NodeId`]. The child → parent link is a plain `Option<NodeId>`, so the
//! tree has exactly one ownership edge per node and upward traversal never
//! needs reference counting.
//!
//! The converter only reads a `DomTree`; it never mutates it.

mod parser;

pub use parser::{DEFAULT_MAX_DEPTH, HtmlParser, MarkupParser, ParseOptions};

use compact_str::CompactString;
use smallvec::SmallVec;

use crate::attr::{Attrs, AttrsExt};

// =============================================================================
// NodeId
// =============================================================================

/// Handle of a node inside a [`DomTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Position of the node in its tree's arena.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

// =============================================================================
// DomNode
// =============================================================================

/// Node payload, one variant per DOM node type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Character data, entities still encoded.
    Text { data: String },
    /// An element.
    Tag { name: CompactString, attribs: Attrs },
    /// `<script>` or `<style>`; the body is a single unparsed text child.
    RawText { name: CompactString, attribs: Attrs },
    /// `<!-- ... -->`
    Comment { data: String },
    /// `<!DOCTYPE ...>`, `<?xml ...?>` and other declarations.
    Directive { data: String },
}

/// A node in the arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomNode {
    pub kind: NodeKind,
    pub children: SmallVec<[NodeId; 8]>,
    /// Non-owning back-reference; `None` for top-level nodes.
    pub parent: Option<NodeId>,
    /// Byte offset of the node in the source markup.
    pub offset: usize,
}

// =============================================================================
// DomTree
// =============================================================================

/// Arena-backed DOM produced by a [`MarkupParser`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomTree {
    nodes: Vec<DomNode>,
    roots: SmallVec<[NodeId; 8]>,
}

impl DomTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node as the last child of `parent` (or as a new root).
    pub fn append(&mut self, parent: Option<NodeId>, kind: NodeKind, offset: usize) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(DomNode {
            kind,
            children: SmallVec::new(),
            parent,
            offset,
        });
        match parent {
            Some(p) => self.nodes[p.index()].children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    /// Append a tag node.
    pub fn append_tag(&mut self, parent: Option<NodeId>, name: &str, attribs: Attrs) -> NodeId {
        self.append(
            parent,
            NodeKind::Tag {
                name: CompactString::from(name),
                attribs,
            },
            0,
        )
    }

    /// Append a text node.
    pub fn append_text(&mut self, parent: Option<NodeId>, data: impl Into<String>) -> NodeId {
        self.append(parent, NodeKind::Text { data: data.into() }, 0)
    }

    /// Top-level nodes in document order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Get a node by id.
    pub fn get(&self, id: NodeId) -> Option<&DomNode> {
        self.nodes.get(id.index())
    }

    /// Borrowed cursor for a node.
    pub fn node(&self, id: NodeId) -> NodeRef<'_> {
        NodeRef { tree: self, id }
    }

    /// Total number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate all nodes in creation (document) order.
    pub fn iter(&self) -> impl Iterator<Item = NodeRef<'_>> {
        (0..self.nodes.len() as u32).map(move |i| self.node(NodeId(i)))
    }
}

impl std::ops::Index<NodeId> for DomTree {
    type Output = DomNode;

    fn index(&self, id: NodeId) -> &DomNode {
        &self.nodes[id.index()]
    }
}

// =============================================================================
// NodeRef
// =============================================================================

/// Read-only cursor over one node of a [`DomTree`].
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    tree: &'a DomTree,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[inline]
    pub fn tree(&self) -> &'a DomTree {
        self.tree
    }

    #[inline]
    pub fn kind(&self) -> &'a NodeKind {
        &self.tree[self.id].kind
    }

    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self.kind(), NodeKind::Text { .. })
    }

    #[inline]
    pub fn is_tag(&self) -> bool {
        matches!(self.kind(), NodeKind::Tag { .. })
    }

    #[inline]
    pub fn is_raw_text(&self) -> bool {
        matches!(self.kind(), NodeKind::RawText { .. })
    }

    /// Element name of tag and raw-text nodes.
    pub fn name(&self) -> Option<&'a str> {
        match self.kind() {
            NodeKind::Tag { name, .. } | NodeKind::RawText { name, .. } => Some(name.as_str()),
            _ => None,
        }
    }

    /// Character data of text, comment and directive nodes.
    pub fn data(&self) -> Option<&'a str> {
        match self.kind() {
            NodeKind::Text { data } | NodeKind::Comment { data } | NodeKind::Directive { data } => {
                Some(data.as_str())
            }
            NodeKind::Tag { .. } | NodeKind::RawText { .. } => None,
        }
    }

    /// Attributes of tag and raw-text nodes.
    pub fn attrs(&self) -> Option<&'a Attrs> {
        match self.kind() {
            NodeKind::Tag { attribs, .. } | NodeKind::RawText { attribs, .. } => Some(attribs),
            _ => None,
        }
    }

    /// Single attribute value of a tag node.
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.attrs().and_then(|a| a.get_attr(name))
    }

    pub fn parent(&self) -> Option<NodeRef<'a>> {
        self.tree[self.id].parent.map(|id| self.tree.node(id))
    }

    pub fn children(&self) -> &'a [NodeId] {
        &self.tree[self.id].children
    }

    pub fn offset(&self) -> usize {
        self.tree[self.id].offset
    }

    /// Concatenated raw text of all descendant text nodes.
    pub fn text_content(&self) -> String {
        let mut buf = String::new();
        self.collect_text(&mut buf);
        buf
    }

    fn collect_text(&self, buf: &mut String) {
        match self.kind() {
            NodeKind::Text { data } => buf.push_str(data),
            NodeKind::Tag { .. } | NodeKind::RawText { .. } => {
                for &child in self.children() {
                    self.tree.node(child).collect_text(buf);
                }
            }
            _ => {}
        }
    }
}

impl std::fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id)
            .field("kind", self.kind())
            .finish()
    }
}
