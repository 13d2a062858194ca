//! HTML → render tree conversion.
//!
//! # Flow
//!
//! ```text
//! markup
//!   │
//!   ▼ MarkupParser (HtmlParser by default)
//! DomTree
//!   │
//!   ▼ Converter::convert()
//! RenderList  (TextRun / InlineGroup / BlockContainer / ImageRef)
//! ```
//!
//! Each DOM node is first offered to the caller's [`CustomRenderer`]. If it
//! falls through, text nodes become [`TextRun`]s with decoded entities, `img`
//! tags become [`ImageRef`]s, list tags with a block-eligible ancestry become
//! [`BlockContainer`]s, and every other tag becomes an [`InlineGroup`].

mod group;

pub use group::{ChildGroup, group_block_children};

use std::sync::Arc;

use crate::attr::AttrsExt;
use crate::classify::{Layout, classify, is_block_node};
use crate::dom::{DomTree, HtmlParser, MarkupParser, NodeId, NodeKind, NodeRef, ParseOptions};
use crate::error::HtmlViewResult;
use crate::node::{
    BlockContainer, ImageRef, InlineGroup, LinkHandler, PressHandler, RenderList, RenderNode,
    TextRun,
};
use crate::style::{Style, StyleSheet, bullet_style, merge_styles, structural_style};

pub const LINE_BREAK: &str = "\n";
pub const PARAGRAPH_BREAK: &str = "\n\n";
pub const BULLET: &str = "\u{2022} ";

// =============================================================================
// CustomRenderer
// =============================================================================

/// Outcome of a [`CustomRenderer`] for one node.
#[derive(Debug, Clone, PartialEq)]
pub enum Rendered {
    /// Use this node verbatim.
    Use(RenderNode),
    /// Render nothing; the node's slot stays `None`.
    Skip,
    /// Continue with the default conversion.
    Fallthrough,
}

/// Per-node override hook.
///
/// Called with the node, its index among the siblings being converted, and
/// that sibling list. Inside a block container the sibling list is the node's
/// group (see [`group_block_children`]), not the full child list.
pub trait CustomRenderer: Send + Sync {
    fn render(&self, node: NodeRef<'_>, index: usize, siblings: &[NodeId]) -> Rendered;
}

impl<F> CustomRenderer for F
where
    F: Fn(NodeRef<'_>, usize, &[NodeId]) -> Rendered + Send + Sync,
{
    fn render(&self, node: NodeRef<'_>, index: usize, siblings: &[NodeId]) -> Rendered {
        self(node, index, siblings)
    }
}

// =============================================================================
// ConvertOptions
// =============================================================================

/// Configuration for a conversion.
#[derive(Clone, Default)]
pub struct ConvertOptions {
    pub styles: StyleSheet,
    pub custom_renderer: Option<Arc<dyn CustomRenderer>>,
    pub link_handler: Option<LinkHandler>,
    pub parse: ParseOptions,
}

impl ConvertOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_styles(mut self, styles: StyleSheet) -> Self {
        self.styles = styles;
        self
    }

    pub fn with_custom_renderer(mut self, renderer: impl CustomRenderer + 'static) -> Self {
        self.custom_renderer = Some(Arc::new(renderer));
        self
    }

    /// Closure form of [`ConvertOptions::with_custom_renderer`].
    pub fn with_render_fn<F>(self, f: F) -> Self
    where
        F: Fn(NodeRef<'_>, usize, &[NodeId]) -> Rendered + Send + Sync + 'static,
    {
        self.with_custom_renderer(f)
    }

    pub fn with_link_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.link_handler = Some(Arc::new(handler));
        self
    }

    pub fn with_parse_options(mut self, parse: ParseOptions) -> Self {
        self.parse = parse;
        self
    }
}

impl std::fmt::Debug for ConvertOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConvertOptions")
            .field("styles", &self.styles)
            .field("custom_renderer", &self.custom_renderer.is_some())
            .field("link_handler", &self.link_handler.is_some())
            .field("parse", &self.parse)
            .finish()
    }
}

// =============================================================================
// Converter
// =============================================================================

/// Maps a [`DomTree`] to a render tree.
///
/// Holds no state besides its borrows; one converter may run any number of
/// conversions over the same tree.
pub struct Converter<'a> {
    tree: &'a DomTree,
    options: &'a ConvertOptions,
}

impl<'a> Converter<'a> {
    pub fn new(tree: &'a DomTree, options: &'a ConvertOptions) -> Self {
        Self { tree, options }
    }

    /// Convert the whole document.
    pub fn convert_document(&self) -> RenderList {
        log::debug!("converting {} top-level nodes", self.tree.roots().len());
        self.convert_list(self.tree.roots(), None, 0)
    }

    /// Convert a sibling list whose DOM parent is `parent` (`None` at top level).
    ///
    /// Returns `None` for absent input; an empty list converts to an empty list.
    pub fn convert(&self, nodes: Option<&[NodeId]>, parent: Option<NodeId>) -> Option<RenderList> {
        nodes.map(|nodes| {
            let depth = parent.map_or(0, |p| self.depth_of(p) + 1);
            self.convert_list(nodes, parent, depth)
        })
    }

    fn depth_of(&self, id: NodeId) -> usize {
        std::iter::successors(self.tree.node(id).parent(), |p| p.parent()).count()
    }

    fn convert_list(&self, nodes: &[NodeId], parent: Option<NodeId>, depth: usize) -> RenderList {
        nodes
            .iter()
            .enumerate()
            .map(|(index, &id)| self.convert_node(id, index, nodes, parent, depth))
            .collect()
    }

    fn convert_node(
        &self,
        id: NodeId,
        index: usize,
        siblings: &[NodeId],
        parent: Option<NodeId>,
        depth: usize,
    ) -> Option<RenderNode> {
        let node = self.tree.node(id);

        // Trees from other parsers may be arbitrarily deep.
        if depth > self.options.parse.max_depth {
            log::warn!("dropping node at byte {} nested deeper than {}", node.offset(), self.options.parse.max_depth);
            return None;
        }

        if let Some(renderer) = &self.options.custom_renderer {
            match renderer.render(node, index, siblings) {
                Rendered::Use(rendered) => return Some(rendered),
                Rendered::Skip => return None,
                Rendered::Fallthrough => {}
            }
        }

        match node.kind() {
            NodeKind::Text { data } => Some(RenderNode::Text(TextRun::keyed(
                index,
                decode(data),
                self.text_style(parent),
            ))),
            NodeKind::Tag { .. } => Some(self.convert_tag(node, index, siblings, depth)),
            NodeKind::RawText { .. } | NodeKind::Comment { .. } | NodeKind::Directive { .. } => {
                log::trace!("skipping non-content node at byte {}", node.offset());
                None
            }
        }
    }

    /// Text gets the root style unless its parent is a tag with its own style.
    fn text_style(&self, parent: Option<NodeId>) -> Option<Style> {
        let styles = &self.options.styles;
        let styled_parent = parent
            .and_then(|p| self.tree.node(p).name())
            .is_some_and(|name| styles.has_tag(name));
        if styled_parent {
            None
        } else {
            styles.root().cloned()
        }
    }

    fn convert_tag(&self, node: NodeRef<'_>, index: usize, siblings: &[NodeId], depth: usize) -> RenderNode {
        let name = node.name().unwrap_or_default();

        if name == "img" {
            return self.convert_image(node, index);
        }

        let on_press = if name == "a" {
            node.attr("href")
                .filter(|href| !href.is_empty())
                .map(|href| PressHandler::new(decode(href), self.options.link_handler.clone()))
        } else {
            None
        };

        let layout = classify(node);
        if layout == Layout::Inline && is_block_node(node) {
            log::trace!("<{name}> at byte {} is outside a block context, rendering inline", node.offset());
        }

        let styles = &self.options.styles;
        let root = styles.root();
        let structural = structural_style(name);
        let style = merge_styles([
            if layout == Layout::Inline { root } else { None },
            styles.tag(name),
            structural.as_ref(),
        ]);

        let mut children = RenderList::new();
        if name == "pre" {
            children.push(Some(literal(LINE_BREAK)));
        }
        if name == "li" {
            let bullet = bullet_style();
            children.push(Some(RenderNode::Text(TextRun {
                key: None,
                content: BULLET.to_string(),
                style: merge_styles([root, Some(&bullet)]),
            })));
        }
        match layout {
            Layout::Block => children.extend(self.convert_block_children(node, depth + 1)),
            Layout::Inline => {
                children.extend(self.convert_list(node.children(), Some(node.id()), depth + 1))
            }
        }
        if name == "p" && index + 1 < siblings.len() {
            children.push(Some(literal(PARAGRAPH_BREAK)));
        }
        if matches!(name, "br" | "h1" | "h2" | "h3" | "h4" | "h5") {
            children.push(Some(literal(LINE_BREAK)));
        }

        match layout {
            Layout::Block => RenderNode::Block(BlockContainer {
                key: Some(index),
                style,
                children,
            }),
            Layout::Inline => RenderNode::Inline(InlineGroup {
                key: Some(index),
                style,
                on_press,
                children,
            }),
        }
    }

    fn convert_image(&self, node: NodeRef<'_>, index: usize) -> RenderNode {
        let (width, height) = node
            .attrs()
            .map(|attrs| {
                (
                    attrs.dimension("width", "data-width"),
                    attrs.dimension("height", "data-height"),
                )
            })
            .unwrap_or_default();
        RenderNode::Image(ImageRef::new(
            Some(index),
            node.attr("src").map(String::from),
            width,
            height,
        ))
    }

    /// Children of a block container, inline runs wrapped in a text flow.
    fn convert_block_children(&self, node: NodeRef<'_>, depth: usize) -> RenderList {
        group_block_children(self.tree, node.children())
            .into_iter()
            .enumerate()
            .map(|(group_index, group)| match group {
                ChildGroup::Block(nodes) => {
                    self.convert_node(nodes[0], 0, nodes, Some(node.id()), depth)
                }
                ChildGroup::Inline(nodes) => Some(RenderNode::Inline(InlineGroup::wrap(
                    group_index,
                    self.convert_list(nodes, Some(node.id()), depth),
                ))),
            })
            .collect()
    }
}

fn decode(text: &str) -> String {
    html_escape::decode_html_entities(text).into_owned()
}

fn literal(content: &str) -> RenderNode {
    RenderNode::Text(TextRun::literal(content))
}

// =============================================================================
// Entry points
// =============================================================================

/// Parse `markup` with the built-in parser and convert it.
pub fn render_html(markup: &str, options: &ConvertOptions) -> HtmlViewResult<RenderList> {
    render_html_using(&HtmlParser::new(options.parse), markup, options)
}

/// Parse `markup` with a caller-supplied parser and convert it.
///
/// A parse failure is returned as-is; no partial tree is produced.
pub fn render_html_using<P>(parser: &P, markup: &str, options: &ConvertOptions) -> HtmlViewResult<RenderList>
where
    P: MarkupParser + ?Sized,
{
    let tree = parser
        .parse(markup)
        .inspect_err(|err| log::warn!("failed to parse markup: {err}"))?;
    Ok(Converter::new(&tree, options).convert_document())
}

/// Callback form of [`render_html`]: `done` runs exactly once.
pub fn render_html_with<F>(markup: &str, options: &ConvertOptions, done: F)
where
    F: FnOnce(HtmlViewResult<RenderList>),
{
    done(render_html(markup, options));
}

/// Convert many documents in parallel. Results keep input order.
#[cfg(feature = "parallel")]
pub fn render_html_batch(documents: &[&str], options: &ConvertOptions) -> Vec<HtmlViewResult<RenderList>> {
    use rayon::prelude::*;

    documents
        .par_iter()
        .map(|markup| render_html(markup, options))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::StyleValue;
    use std::sync::Mutex;

    fn render(src: &str) -> RenderList {
        render_html(src, &ConvertOptions::default()).unwrap()
    }

    fn only(list: &RenderList) -> &RenderNode {
        assert_eq!(list.len(), 1, "{list:#?}");
        list[0].as_ref().unwrap()
    }

    fn styled() -> ConvertOptions {
        ConvertOptions::new().with_styles(
            StyleSheet::new()
                .with_root(Style::new().with("color", "black").with("font_size", 14.0))
                .with_tag("b", Style::new().with("font_weight", "bold"))
                .with_tag("li", Style::new().with("color", "gray")),
        )
    }

    #[test]
    fn test_text_decodes_entities() {
        let list = render("A &amp; B");
        let text = only(&list).as_text().unwrap();
        assert_eq!(text.content, "A & B");
        assert_eq!(text.key, Some(0));
    }

    #[test]
    fn test_convert_absent_and_empty() {
        let tree = DomTree::new();
        let options = ConvertOptions::default();
        let converter = Converter::new(&tree, &options);
        assert_eq!(converter.convert(None, None), None);
        assert_eq!(converter.convert(Some(&[]), None), Some(Vec::new()));
    }

    #[test]
    fn test_list_at_root() {
        let list = render("<ul><li>x</li><li>y</li></ul>");
        let ul = only(&list).as_block().unwrap();
        assert_eq!(ul.children.len(), 2);
        assert_eq!(ul.block_count(), 2);

        for (child, expected) in ul.iter().zip(["x", "y"]) {
            let li = child.as_block().unwrap();
            let bullet = li.children[0].as_ref().unwrap().as_text().unwrap();
            assert_eq!(bullet.content, BULLET);
            assert_eq!(bullet.key, None);
            // The item's text is wrapped in a text flow.
            let flow = li.children[1].as_ref().unwrap().as_inline().unwrap();
            assert_eq!(flow.style, None);
            assert_eq!(crate::node::list_text(&flow.children), expected);
        }
    }

    #[test]
    fn test_list_inside_paragraph_degrades_to_inline() {
        let list = render("<p><ul><li>x</li></ul></p>");
        let p = only(&list).as_inline().unwrap();
        let ul = p.children[0].as_ref().unwrap();
        assert!(ul.is_inline());
        assert_eq!(ul.text_content(), format!("{BULLET}x"));
    }

    #[test]
    fn test_paragraph_break_except_last() {
        let list = render("<p>first</p><p>last</p>");
        assert_eq!(list.len(), 2);
        let first = list[0].as_ref().unwrap();
        let last = list[1].as_ref().unwrap();
        assert_eq!(first.text_content(), "first\n\n");
        assert_eq!(last.text_content(), "last");
    }

    #[test]
    fn test_line_breaks() {
        let list = render("<h1>T</h1><br><pre>code</pre><h6>x</h6>");
        let texts: Vec<_> = list.iter().flatten().map(RenderNode::text_content).collect();
        assert_eq!(texts, vec!["T\n", "\n", "\ncode", "x"]);
    }

    #[test]
    fn test_block_children_grouping() {
        let list = render("<ul>a<li>1</li>b<b>c</b><li>2</li></ul>");
        let ul = only(&list).as_block().unwrap();
        let kinds: Vec<_> = ul
            .iter()
            .map(|c| (c.is_block(), c.key(), c.children().len()))
            .collect();
        assert_eq!(
            kinds,
            vec![
                (false, Some(0), 1),
                (true, Some(0), 2),
                (false, Some(2), 2),
                (true, Some(0), 2),
            ]
        );
        // No bare text directly inside a block container.
        assert!(ul.iter().all(|c| !c.is_text()));
    }

    #[test]
    fn test_image_dimensions() {
        let list = render(r#"<img src="a.png" width="120" data-height="80"><img src="b.png" width="x">"#);
        let a = list[0].as_ref().unwrap().as_image().unwrap();
        assert_eq!(a.uri.as_deref(), Some("a.png"));
        assert_eq!((a.width, a.height), (120, 80));
        assert_eq!(a.style.number("width"), Some(120.0));

        let b = list[1].as_ref().unwrap().as_image().unwrap();
        assert_eq!((b.width, b.height), (0, 0));
        assert!(b.is_unsized());
    }

    #[test]
    fn test_link_handler_deferred() {
        let pressed = Arc::new(Mutex::new(Vec::<String>::new()));
        let sink = Arc::clone(&pressed);
        let options = ConvertOptions::new()
            .with_link_handler(move |url| sink.lock().unwrap().push(url.to_string()));

        let list = render_html(r#"<a href="/q?a=1&amp;b=2">go</a>"#, &options).unwrap();
        assert!(pressed.lock().unwrap().is_empty());

        let link = only(&list).as_inline().unwrap();
        let press = link.on_press.as_ref().unwrap();
        assert_eq!(press.url(), "/q?a=1&b=2");
        press.press();
        assert_eq!(*pressed.lock().unwrap(), vec!["/q?a=1&b=2".to_string()]);
    }

    #[test]
    fn test_link_without_href() {
        let list = render("<a>plain</a><a href=\"\">empty</a>");
        for node in list.iter().flatten() {
            let link = node.as_inline().unwrap();
            assert!(!link.is_link());
        }
        assert_eq!(crate::node::list_text(&list), "plainempty");
    }

    #[test]
    fn test_custom_renderer_skip() {
        let options = ConvertOptions::new().with_render_fn(|node, _, _| {
            if node.name() == Some("span") {
                Rendered::Skip
            } else {
                Rendered::Fallthrough
            }
        });
        let list = render_html("a<span>b</span>c", &options).unwrap();
        assert_eq!(list.len(), 3);
        assert!(list[1].is_none());
        assert_eq!(crate::node::list_text(&list), "ac");
    }

    #[test]
    fn test_custom_renderer_use() {
        let options = ConvertOptions::new().with_render_fn(|node, index, siblings| {
            match node.name() {
                Some("hr") => Rendered::Use(RenderNode::Text(TextRun::keyed(
                    index,
                    format!("--- {}/{}", index, siblings.len()),
                    None,
                ))),
                _ => Rendered::Fallthrough,
            }
        });
        let list = render_html("a<hr>", &options).unwrap();
        assert_eq!(list[1].as_ref().unwrap().text_content(), "--- 1/2");
    }

    #[test]
    fn test_custom_renderer_sees_group_as_siblings() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let options = ConvertOptions::new().with_render_fn(move |node, index, siblings| {
            if node.name() == Some("li") {
                sink.lock().unwrap().push((index, siblings.len()));
            }
            Rendered::Fallthrough
        });
        render_html("<ul>a<li>1</li><li>2</li></ul>", &options).unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![(0, 1), (0, 1)]);
    }

    #[test]
    fn test_comments_render_as_none() {
        let list = render("a<!-- note -->b");
        assert_eq!(list.len(), 3);
        assert!(list[1].is_none());
    }

    #[test]
    fn test_text_style_inheritance() {
        let options = styled();
        let list = render_html("top<b>bold</b><i>it</i>", &options).unwrap();

        // Top-level text gets the root style.
        let top = list[0].as_ref().unwrap().as_text().unwrap();
        assert_eq!(top.style.as_ref().unwrap().get("color"), Some(&StyleValue::from("black")));

        // Text inside a styled tag inherits from the tag's wrapper instead.
        let b = list[1].as_ref().unwrap().as_inline().unwrap();
        let bold = b.children[0].as_ref().unwrap().as_text().unwrap();
        assert_eq!(bold.style, None);
        let b_style = b.style.as_ref().unwrap();
        assert_eq!(b_style.get("font_weight"), Some(&StyleValue::from("bold")));
        assert_eq!(b_style.number("font_size"), Some(14.0));

        // Text inside an unstyled tag gets the root style.
        let i = list[2].as_ref().unwrap().as_inline().unwrap();
        let it = i.children[0].as_ref().unwrap().as_text().unwrap();
        assert!(it.style.is_some());
    }

    #[test]
    fn test_block_style_precedence() {
        let list = render_html("<ul><li>x</li></ul>", &styled()).unwrap();
        let ul = only(&list).as_block().unwrap();
        // Blocks do not receive the ambient root style.
        assert_eq!(ul.style, None);

        let li = ul.children[0].as_ref().unwrap().as_block().unwrap();
        let style = li.style.as_ref().unwrap();
        assert_eq!(style.get("color"), Some(&StyleValue::from("gray")));
        assert_eq!(style.get("position"), Some(&StyleValue::from("relative")));
        assert_eq!(style.get("font_size"), None);

        let bullet = li.children[0].as_ref().unwrap().as_text().unwrap();
        let bullet_style = bullet.style.as_ref().unwrap();
        assert_eq!(bullet_style.number("left"), Some(-20.0));
        assert_eq!(bullet_style.get("color"), Some(&StyleValue::from("black")));
    }

    #[test]
    fn test_parse_error_reported_once() {
        let mut calls = 0;
        render_html_with("<div", &ConvertOptions::default(), |result| {
            calls += 1;
            assert!(result.is_err());
        });
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_render_with_delivers_tree_once() {
        let mut calls = 0;
        let mut delivered = None;
        render_html_with("<p>a</p><ul><li>b</li></ul>", &ConvertOptions::default(), |result| {
            calls += 1;
            delivered = Some(result.unwrap());
        });
        assert_eq!(calls, 1);
        let list = delivered.unwrap();
        assert_eq!(list.len(), 2);
        assert!(list[1].as_ref().unwrap().is_block());
        assert_eq!(crate::node::list_text(&list), "a\n\n\u{2022} b");
    }

    #[test]
    fn test_script_and_style_render_as_none() {
        let list = render("<style>p{color:red}</style><script>alert(1)</script>Hello");
        assert_eq!(list.len(), 3);
        assert!(list[0].is_none());
        assert!(list[1].is_none());
        assert_eq!(crate::node::list_text(&list), "Hello");

        let list = render("<p>x<script>y()</script></p>");
        assert_eq!(crate::node::list_text(&list), "x");
    }

    #[test]
    fn test_custom_renderer_sees_raw_text_elements() {
        let options = ConvertOptions::new().with_render_fn(|node, index, _| {
            if node.name() == Some("style") {
                Rendered::Use(RenderNode::Text(TextRun::keyed(index, "[css]", None)))
            } else {
                Rendered::Fallthrough
            }
        });
        let list = render_html("<style>b{}</style>ok", &options).unwrap();
        assert_eq!(crate::node::list_text(&list), "[css]ok");
    }

    #[test]
    fn test_deep_markup_is_a_parse_error() {
        let markup = "<b>".repeat(20_000) + "x";
        let err = render_html(&markup, &ConvertOptions::default()).unwrap_err();
        assert!(matches!(err, crate::HtmlViewError::Parse(crate::ParseError::TooDeep { .. })));
    }

    #[test]
    fn test_converter_drops_nodes_past_depth_limit() {
        let mut tree = DomTree::new();
        let mut parent = None;
        let mut ids = Vec::new();
        for _ in 0..10 {
            let id = tree.append_tag(parent, "b", Vec::new());
            ids.push(id);
            parent = Some(id);
        }
        tree.append_text(parent, "x");

        let options =
            ConvertOptions::new().with_parse_options(ParseOptions::LENIENT.with_max_depth(3));
        let converter = Converter::new(&tree, &options);

        let list = converter.convert_document();
        let mut inline = 0;
        list[0].as_ref().unwrap().walk(&mut |n| inline += usize::from(n.is_inline()));
        assert_eq!(inline, 4);
        assert_eq!(crate::node::list_text(&list), "");

        // Depth counts from the document root, not from the converted list.
        let list = converter.convert(Some(tree.node(ids[1]).children()), Some(ids[1])).unwrap();
        let mut inline = 0;
        list[0].as_ref().unwrap().walk(&mut |n| inline += usize::from(n.is_inline()));
        assert_eq!(inline, 2);
    }

    #[test]
    fn test_custom_parser() {
        let parser = |_: &str| -> Result<DomTree, crate::error::ParseError> {
            let mut tree = DomTree::new();
            tree.append_text(None, "&lt;fixed&gt;");
            Ok(tree)
        };
        let list = render_html_using(&parser, "ignored", &ConvertOptions::default()).unwrap();
        assert_eq!(crate::node::list_text(&list), "<fixed>");
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_batch_keeps_order() {
        let results = render_html_batch(&["a", "<b", "c"], &ConvertOptions::default());
        assert_eq!(results.len(), 3);
        assert_eq!(crate::node::list_text(results[0].as_ref().unwrap()), "a");
        assert!(results[1].is_err());
        assert_eq!(crate::node::list_text(results[2].as_ref().unwrap()), "c");
    }
}
