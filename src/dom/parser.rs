//! Lenient HTML parser producing a [`DomTree`].
//!
//! The parser follows the forgiving, non-restructuring model of streaming
//! HTML parsers: the tree mirrors the markup as written. It never relocates
//! elements, so `<p><ul>..</ul></p>` keeps the list inside the paragraph, and
//! it never decodes character references. Decoding is left to the converter.
//!
//! The only implicit structure it adds is the classic "opening X closes an
//! open Y" table (`<li>` closes an open `<li>`, a heading closes an open
//! `<p>`, ...), applied to the innermost open element only.

use compact_str::CompactString;

use crate::attr::{Attrs, AttrsExt};
use crate::error::ParseError;

use super::{DomTree, NodeId, NodeKind};

// =============================================================================
// MarkupParser
// =============================================================================

/// Turns raw markup into a [`DomTree`].
///
/// Malformed input is reported through the returned error; implementations
/// must not panic on arbitrary input.
pub trait MarkupParser {
    fn parse(&self, markup: &str) -> Result<DomTree, ParseError>;
}

impl<F> MarkupParser for F
where
    F: Fn(&str) -> Result<DomTree, ParseError>,
{
    fn parse(&self, markup: &str) -> Result<DomTree, ParseError> {
        self(markup)
    }
}

// =============================================================================
// ParseOptions
// =============================================================================

/// Configuration for [`HtmlParser`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Lowercase tag and attribute names.
    pub lowercase_names: bool,
    /// Treat `<div/>` as an empty element instead of an open tag.
    pub recognize_self_closing: bool,
    /// Reject stray end tags and elements left open at end of input.
    pub strict: bool,
    /// Maximum element nesting depth; deeper markup fails with
    /// [`ParseError::TooDeep`].
    pub max_depth: usize,
}

/// Default for [`ParseOptions::max_depth`].
pub const DEFAULT_MAX_DEPTH: usize = 128;

impl ParseOptions {
    /// Forgiving defaults: lowercase names, `/>` ignored on non-void tags.
    pub const LENIENT: Self = Self {
        lowercase_names: true,
        recognize_self_closing: false,
        strict: false,
        max_depth: DEFAULT_MAX_DEPTH,
    };

    /// Lenient settings plus structural validation.
    pub const STRICT: Self = Self {
        lowercase_names: true,
        recognize_self_closing: true,
        strict: true,
        max_depth: DEFAULT_MAX_DEPTH,
    };

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_self_closing(mut self, recognize: bool) -> Self {
        self.recognize_self_closing = recognize;
        self
    }

    pub fn with_lowercase_names(mut self, lowercase: bool) -> Self {
        self.lowercase_names = lowercase;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::LENIENT
    }
}

// =============================================================================
// HtmlParser
// =============================================================================

/// The built-in [`MarkupParser`].
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlParser {
    pub options: ParseOptions,
}

impl HtmlParser {
    pub fn new(options: ParseOptions) -> Self {
        Self { options }
    }
}

impl MarkupParser for HtmlParser {
    fn parse(&self, markup: &str) -> Result<DomTree, ParseError> {
        let tree = TreeBuilder::new(markup, self.options).run()?;
        log::debug!(
            "parsed {} bytes into {} nodes ({} top-level)",
            markup.len(),
            tree.len(),
            tree.roots().len()
        );
        Ok(tree)
    }
}

// =============================================================================
// Element tables
// =============================================================================

fn is_void_element(tag: &str) -> bool {
    matches!(
        tag,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

fn is_raw_text_element(tag: &str) -> bool {
    matches!(tag, "script" | "style")
}

/// Open elements implicitly closed when `tag` opens directly inside them.
fn open_implies_close(tag: &str) -> &'static [&'static str] {
    match tag {
        "li" => &["li"],
        "p" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => &["p"],
        "tr" => &["tr", "th", "td"],
        "th" => &["th"],
        "td" => &["thead", "th", "td"],
        "option" => &["option"],
        "optgroup" => &["optgroup"],
        _ => &[],
    }
}

// =============================================================================
// TreeBuilder
// =============================================================================

struct OpenElement {
    id: NodeId,
    name: CompactString,
    offset: usize,
}

struct StartTag {
    name: CompactString,
    attribs: Attrs,
    self_closing: bool,
    /// Offset just past the closing `>`
    end: usize,
}

struct TreeBuilder<'a> {
    src: &'a str,
    bytes: &'a [u8],
    options: ParseOptions,
    tree: DomTree,
    stack: Vec<OpenElement>,
    pos: usize,
    text_start: usize,
}

impl<'a> TreeBuilder<'a> {
    fn new(src: &'a str, options: ParseOptions) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            options,
            tree: DomTree::new(),
            stack: Vec::new(),
            pos: 0,
            text_start: 0,
        }
    }

    fn run(mut self) -> Result<DomTree, ParseError> {
        while self.pos < self.bytes.len() {
            if self.bytes[self.pos] != b'<' {
                self.pos += 1;
                continue;
            }
            let start = self.pos;
            match self.bytes.get(start + 1) {
                Some(b'!') if self.src[start..].starts_with("<!--") => self.comment(start)?,
                Some(b'!') | Some(b'?') => self.directive(start)?,
                Some(b'/') => self.end_tag(start)?,
                Some(c) if c.is_ascii_alphabetic() => self.start_tag(start)?,
                // A bare `<` is plain text.
                _ => self.pos += 1,
            }
        }
        self.flush_text(self.bytes.len());

        if self.options.strict
            && let Some(open) = self.stack.first()
        {
            return Err(ParseError::UnclosedElement {
                name: open.name.to_string(),
                offset: open.offset,
            });
        }
        Ok(self.tree)
    }

    fn current(&self) -> Option<NodeId> {
        self.stack.last().map(|e| e.id)
    }

    fn flush_text(&mut self, end: usize) {
        if end > self.text_start {
            let data = self.src[self.text_start..end].to_string();
            let parent = self.current();
            self.tree.append(parent, NodeKind::Text { data }, self.text_start);
        }
    }

    fn normalize(&self, name: &str) -> CompactString {
        if self.options.lowercase_names {
            CompactString::from(name.to_ascii_lowercase())
        } else {
            CompactString::from(name)
        }
    }

    fn comment(&mut self, start: usize) -> Result<(), ParseError> {
        let body = start + 4;
        let Some(len) = self.src[body..].find("-->") else {
            return Err(ParseError::UnterminatedComment { offset: start });
        };
        self.flush_text(start);
        let data = self.src[body..body + len].to_string();
        let parent = self.current();
        self.tree.append(parent, NodeKind::Comment { data }, start);
        self.pos = body + len + 3;
        self.text_start = self.pos;
        Ok(())
    }

    fn directive(&mut self, start: usize) -> Result<(), ParseError> {
        let Some(len) = self.src[start..].find('>') else {
            return Err(ParseError::UnterminatedTag { offset: start });
        };
        self.flush_text(start);
        let data = self.src[start + 1..start + len].to_string();
        let parent = self.current();
        self.tree.append(parent, NodeKind::Directive { data }, start);
        self.pos = start + len + 1;
        self.text_start = self.pos;
        Ok(())
    }

    fn end_tag(&mut self, start: usize) -> Result<(), ParseError> {
        let Some(len) = self.src[start..].find('>') else {
            return Err(ParseError::UnterminatedTag { offset: start });
        };
        let inner = &self.src[start + 2..start + len];
        let raw_name = inner
            .split(|c: char| c.is_ascii_whitespace() || c == '/')
            .next()
            .unwrap_or_default();
        self.flush_text(start);
        self.pos = start + len + 1;
        self.text_start = self.pos;

        // `</>` and friends carry no name and are dropped.
        if raw_name.is_empty() {
            return Ok(());
        }
        let name = self.normalize(raw_name);
        self.close_element(&name, start)
    }

    fn close_element(&mut self, name: &str, offset: usize) -> Result<(), ParseError> {
        if let Some(depth) = self.stack.iter().rposition(|e| e.name == name) {
            self.stack.truncate(depth);
            return Ok(());
        }
        match name {
            // `</br>` behaves like `<br>` and a stray `</p>` like `<p></p>`.
            "br" | "p" if !(self.options.strict && name == "p") => {
                let parent = self.current();
                self.tree.append(
                    parent,
                    NodeKind::Tag {
                        name: CompactString::from(name),
                        attribs: Attrs::new(),
                    },
                    offset,
                );
                Ok(())
            }
            _ if self.options.strict && !is_void_element(name) => {
                Err(ParseError::UnexpectedEndTag {
                    name: name.to_string(),
                    offset,
                })
            }
            _ => {
                log::trace!("ignoring stray end tag </{name}> at byte {offset}");
                Ok(())
            }
        }
    }

    fn start_tag(&mut self, start: usize) -> Result<(), ParseError> {
        let tag = self.scan_start_tag(start)?;
        self.flush_text(start);
        self.pos = tag.end;
        self.text_start = self.pos;

        let closes = open_implies_close(&tag.name);
        while let Some(top) = self.stack.last()
            && closes.contains(&top.name.as_str())
        {
            self.stack.pop();
        }

        if self.stack.len() >= self.options.max_depth {
            return Err(ParseError::TooDeep {
                limit: self.options.max_depth,
                offset: start,
            });
        }

        let parent = self.current();
        let name = tag.name.clone();

        if is_raw_text_element(&name) {
            let id = self.tree.append(
                parent,
                NodeKind::RawText {
                    name: tag.name,
                    attribs: tag.attribs,
                },
                start,
            );
            return self.raw_text(id, &name);
        }

        let id = self.tree.append(
            parent,
            NodeKind::Tag {
                name: tag.name,
                attribs: tag.attribs,
            },
            start,
        );

        if is_void_element(&name) || (tag.self_closing && self.options.recognize_self_closing) {
            return Ok(());
        }

        self.stack.push(OpenElement {
            id,
            name,
            offset: start,
        });
        Ok(())
    }

    /// Consume the body of `<script>`/`<style>` verbatim up to its end tag.
    fn raw_text(&mut self, id: NodeId, name: &str) -> Result<(), ParseError> {
        let rest = &self.src[self.pos..];
        let needle = format!("</{name}");
        let body_len = rest.to_ascii_lowercase().find(&needle).unwrap_or(rest.len());
        if body_len > 0 {
            let data = rest[..body_len].to_string();
            self.tree.append(Some(id), NodeKind::Text { data }, self.pos);
        }
        let close = self.pos + body_len;
        if close >= self.bytes.len() {
            self.pos = self.bytes.len();
            self.text_start = self.pos;
            if self.options.strict {
                return Err(ParseError::UnclosedElement {
                    name: name.to_string(),
                    offset: self.tree[id].offset,
                });
            }
            return Ok(());
        }
        let Some(len) = self.src[close..].find('>') else {
            return Err(ParseError::UnterminatedTag { offset: close });
        };
        self.pos = close + len + 1;
        self.text_start = self.pos;
        Ok(())
    }

    fn scan_start_tag(&self, start: usize) -> Result<StartTag, ParseError> {
        let unterminated = ParseError::UnterminatedTag { offset: start };
        let bytes = self.bytes;
        let mut i = start + 1;

        let name_start = i;
        while i < bytes.len() && !is_name_terminator(bytes[i]) {
            i += 1;
        }
        let name = self.normalize(&self.src[name_start..i]);
        let mut attribs = Attrs::new();

        loop {
            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            match bytes.get(i) {
                None => return Err(unterminated),
                Some(b'>') => {
                    return Ok(StartTag {
                        name,
                        attribs,
                        self_closing: false,
                        end: i + 1,
                    });
                }
                Some(b'/') if bytes.get(i + 1) == Some(&b'>') => {
                    return Ok(StartTag {
                        name,
                        attribs,
                        self_closing: true,
                        end: i + 2,
                    });
                }
                Some(b'/') => {
                    i += 1;
                    continue;
                }
                Some(_) => {}
            }

            let attr_start = i;
            while i < bytes.len() && !is_name_terminator(bytes[i]) && bytes[i] != b'=' {
                i += 1;
            }
            let attr_name = self.normalize(&self.src[attr_start..i]);

            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            let mut value = String::new();
            if bytes.get(i) == Some(&b'=') {
                i += 1;
                while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                    i += 1;
                }
                match bytes.get(i) {
                    None => return Err(unterminated),
                    Some(&quote) if quote == b'"' || quote == b'\'' => {
                        let body = i + 1;
                        let Some(len) = self.src[body..].find(quote as char) else {
                            return Err(unterminated);
                        };
                        value.push_str(&self.src[body..body + len]);
                        i = body + len + 1;
                    }
                    Some(_) => {
                        let value_start = i;
                        while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' {
                            i += 1;
                        }
                        value.push_str(&self.src[value_start..i]);
                    }
                }
            }

            // First occurrence wins.
            if !attr_name.is_empty() && !attribs.has_attr(&attr_name) {
                attribs.push((attr_name.into_string(), value));
            }
        }
    }
}

fn is_name_terminator(b: u8) -> bool {
    b.is_ascii_whitespace() || b == b'>' || b == b'/'
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::NodeRef;

    fn parse(src: &str) -> DomTree {
        HtmlParser::default().parse(src).unwrap()
    }

    fn shape(node: NodeRef<'_>) -> String {
        match node.kind() {
            NodeKind::Text { data } => format!("{data:?}"),
            NodeKind::Comment { .. } => "#comment".into(),
            NodeKind::Directive { .. } => "#directive".into(),
            NodeKind::Tag { name, .. } | NodeKind::RawText { name, .. } => {
                let children: Vec<_> = node
                    .children()
                    .iter()
                    .map(|&c| shape(node.tree().node(c)))
                    .collect();
                format!("{name}[{}]", children.join(","))
            }
        }
    }

    fn shapes(tree: &DomTree) -> Vec<String> {
        tree.roots().iter().map(|&id| shape(tree.node(id))).collect()
    }

    #[test]
    fn test_text_only() {
        let tree = parse("A &amp; B");
        assert_eq!(shapes(&tree), vec!["\"A &amp; B\""]);
    }

    #[test]
    fn test_nested_list() {
        let tree = parse("<ul><li>x</li><li>y</li></ul>");
        assert_eq!(shapes(&tree), vec!["ul[li[\"x\"],li[\"y\"]]"]);
    }

    #[test]
    fn test_list_stays_inside_paragraph() {
        let tree = parse("<p><ul><li>x</li></ul></p>");
        assert_eq!(shapes(&tree), vec!["p[ul[li[\"x\"]]]"]);
    }

    #[test]
    fn test_implied_close() {
        let tree = parse("<ul><li>a<li>b</ul><p>one<p>two");
        assert_eq!(
            shapes(&tree),
            vec!["ul[li[\"a\"],li[\"b\"]]", "p[\"one\"]", "p[\"two\"]"]
        );
    }

    #[test]
    fn test_void_and_attributes() {
        let tree = parse(r#"<IMG SRC="a.png" width=40 alt='x > y' hidden>after"#);
        assert_eq!(tree.roots().len(), 2);
        let img = tree.node(tree.roots()[0]);
        assert_eq!(img.name(), Some("img"));
        assert_eq!(img.attr("src"), Some("a.png"));
        assert_eq!(img.attr("width"), Some("40"));
        assert_eq!(img.attr("alt"), Some("x > y"));
        assert_eq!(img.attr("hidden"), Some(""));
        assert!(img.children().is_empty());
    }

    #[test]
    fn test_first_duplicate_attribute_wins() {
        let tree = parse(r#"<a href="one" href="two">x</a>"#);
        assert_eq!(tree.node(tree.roots()[0]).attr("href"), Some("one"));
    }

    #[test]
    fn test_entities_are_not_decoded() {
        let tree = parse(r#"<a href="?a=1&amp;b=2">x &lt; y</a>"#);
        let a = tree.node(tree.roots()[0]);
        assert_eq!(a.attr("href"), Some("?a=1&amp;b=2"));
        assert_eq!(a.text_content(), "x &lt; y");
    }

    #[test]
    fn test_comment_and_doctype() {
        let tree = parse("<!DOCTYPE html><!-- hi --><b>x</b>");
        assert_eq!(shapes(&tree), vec!["#directive", "#comment", "b[\"x\"]"]);
    }

    #[test]
    fn test_bare_lt_is_text() {
        let tree = parse("1 < 2 <b>x</b>");
        assert_eq!(shapes(&tree), vec!["\"1 < 2 \"", "b[\"x\"]"]);
    }

    #[test]
    fn test_script_is_raw_text() {
        let tree = parse("<script>if (a<b) {}</script>x");
        assert_eq!(shapes(&tree), vec!["script[\"if (a<b) {}\"]", "\"x\""]);
        let script = tree.node(tree.roots()[0]);
        assert!(script.is_raw_text());
        assert!(!script.is_tag());
        assert_eq!(script.name(), Some("script"));
    }

    #[test]
    fn test_style_keeps_attributes() {
        let tree = parse(r#"<STYLE media="print">p > b { color: red }</STYLE>"#);
        let style = tree.node(tree.roots()[0]);
        assert!(style.is_raw_text());
        assert_eq!(style.attr("media"), Some("print"));
        assert_eq!(style.text_content(), "p > b { color: red }");
    }

    #[test]
    fn test_nesting_limit() {
        let parser = HtmlParser::new(ParseOptions::LENIENT.with_max_depth(3));
        assert!(parser.parse("<b><i><u>x</u></i></b><br>").is_ok());
        assert_eq!(
            parser.parse("<b><i><u><s>x").unwrap_err(),
            ParseError::TooDeep { limit: 3, offset: 9 }
        );
        assert_eq!(
            parser.parse("<b><i><u><br>").unwrap_err(),
            ParseError::TooDeep { limit: 3, offset: 9 }
        );

        // Implied closes free a level before the limit is checked.
        let parser = HtmlParser::new(ParseOptions::LENIENT.with_max_depth(2));
        assert!(parser.parse("<ul><li>a<li>b<li>c</ul>").is_ok());
    }

    #[test]
    fn test_deep_markup_is_rejected() {
        let markup = "<b>".repeat(20_000) + "x";
        let err = HtmlParser::default().parse(&markup).unwrap_err();
        assert_eq!(
            err,
            ParseError::TooDeep { limit: DEFAULT_MAX_DEPTH, offset: DEFAULT_MAX_DEPTH * 3 }
        );
    }

    #[test]
    fn test_stray_end_tags() {
        let tree = parse("a</div>b</br>c");
        assert_eq!(shapes(&tree), vec!["\"a\"", "\"b\"", "br[]", "\"c\""]);
    }

    #[test]
    fn test_self_closing_option() {
        let lenient = parse("<div/>x");
        assert_eq!(shapes(&lenient), vec!["div[\"x\"]"]);

        let parser = HtmlParser::new(ParseOptions::LENIENT.with_self_closing(true));
        let tree = parser.parse("<div/>x").unwrap();
        assert_eq!(shapes(&tree), vec!["div[]", "\"x\""]);
    }

    #[test]
    fn test_unterminated_tag() {
        let err = HtmlParser::default().parse("ok <div class=\"x").unwrap_err();
        assert_eq!(err, ParseError::UnterminatedTag { offset: 3 });
    }

    #[test]
    fn test_unterminated_comment() {
        let err = HtmlParser::default().parse("<!-- open").unwrap_err();
        assert_eq!(err, ParseError::UnterminatedComment { offset: 0 });
    }

    #[test]
    fn test_strict_mode() {
        let strict = HtmlParser::new(ParseOptions::STRICT);
        assert!(strict.parse("<p>ok</p><br/>").is_ok());
        assert_eq!(
            strict.parse("<b>x</i></b>").unwrap_err(),
            ParseError::UnexpectedEndTag { name: "i".into(), offset: 4 }
        );
        assert_eq!(
            strict.parse("<b>x").unwrap_err(),
            ParseError::UnclosedElement { name: "b".into(), offset: 0 }
        );
    }

    #[test]
    fn test_parent_links() {
        let tree = parse("<ul><li>x</li></ul>");
        let ul = tree.roots()[0];
        let li = tree.node(ul).children()[0];
        let text = tree.node(li).children()[0];
        assert_eq!(tree.node(text).parent().map(|p| p.id()), Some(li));
        assert_eq!(tree.node(li).parent().map(|p| p.id()), Some(ul));
        assert!(tree.node(ul).parent().is_none());
    }

    #[test]
    fn test_closure_parser() {
        let parser = |_: &str| -> Result<DomTree, ParseError> { Ok(DomTree::new()) };
        assert!(parser.parse("<b>").unwrap().is_empty());
    }
}
