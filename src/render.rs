//! Outline rendering for render trees
//!
//! Renders a render tree to an indented, human-readable outline. Used for
//! debugging and for comparing whole trees in tests.
//!
//! ```text
//! block#0 {position: relative}
//!   text "• "
//!   inline#0
//!     text#0 "x"
//! ```

use crate::node::{RenderList, RenderNode};

// =============================================================================
// OutlineConfig
// =============================================================================

/// Configuration for outline rendering.
#[derive(Debug, Clone)]
pub struct OutlineConfig {
    /// Whether to print node styles.
    pub show_styles: bool,
    /// Whether to print sibling keys (`#n`).
    pub show_keys: bool,
    /// Indentation per depth level.
    pub indent: usize,
}

impl OutlineConfig {
    /// Everything shown.
    pub const VERBOSE: Self = Self {
        show_styles: true,
        show_keys: true,
        indent: 2,
    };

    /// Structure and text only.
    pub const COMPACT: Self = Self {
        show_styles: false,
        show_keys: false,
        indent: 2,
    };
}

impl Default for OutlineConfig {
    fn default() -> Self {
        Self::VERBOSE
    }
}

// =============================================================================
// Rendering
// =============================================================================

/// Render a render list with the default (verbose) config.
pub fn outline(list: &RenderList) -> String {
    outline_with(list, &OutlineConfig::default())
}

/// Render a render list to an outline string.
pub fn outline_with(list: &[Option<RenderNode>], config: &OutlineConfig) -> String {
    let mut output = String::new();
    render_list(list, config, 0, &mut output);
    output
}

fn render_list(list: &[Option<RenderNode>], config: &OutlineConfig, depth: usize, output: &mut String) {
    for node in list {
        match node {
            Some(node) => render_node(node, config, depth, output),
            None => {
                push_indent(config, depth, output);
                output.push_str("none\n");
            }
        }
    }
}

fn render_node(node: &RenderNode, config: &OutlineConfig, depth: usize, output: &mut String) {
    push_indent(config, depth, output);

    output.push_str(match node {
        RenderNode::Text(_) => "text",
        RenderNode::Inline(_) => "inline",
        RenderNode::Block(_) => "block",
        RenderNode::Image(_) => "image",
    });

    if config.show_keys
        && let Some(key) = node.key()
    {
        output.push('#');
        output.push_str(&key.to_string());
    }

    match node {
        RenderNode::Text(text) => {
            output.push(' ');
            output.push_str(&format!("{:?}", text.content));
        }
        RenderNode::Image(image) => {
            output.push(' ');
            output.push_str(image.uri.as_deref().unwrap_or("-"));
            output.push_str(&format!(" {}x{}", image.width, image.height));
        }
        RenderNode::Inline(group) => {
            if let Some(press) = &group.on_press {
                output.push_str(" -> ");
                output.push_str(press.url());
            }
        }
        RenderNode::Block(_) => {}
    }

    if config.show_styles
        && !node.is_image()
        && let Some(style) = node.style()
    {
        output.push(' ');
        output.push_str(&style.to_string());
    }

    output.push('\n');
    render_list(node.children(), config, depth + 1, output);
}

fn push_indent(config: &OutlineConfig, depth: usize, output: &mut String) {
    for _ in 0..depth * config.indent {
        output.push(' ');
    }
}

// =============================================================================
// Tests
// =============================================================================
