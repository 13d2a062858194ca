//! Style descriptors and the style registry.
//!
//! A [`Style`] is an ordered list of `property: value` pairs handed through to
//! the UI primitives untouched. The converter only ever combines styles, via
//! [`merge_styles`], whose precedence is fixed:
//!
//! ```text
//! ambient (root)  <  per-tag (caller)  <  structural default
//! ```

use compact_str::CompactString;
use rustc_hash::FxHashMap;

// =============================================================================
// StyleValue / Style
// =============================================================================

/// A single style property value.
#[derive(Debug, Clone, PartialEq)]
pub enum StyleValue {
    Number(f32),
    Keyword(CompactString),
}

impl From<f32> for StyleValue {
    fn from(n: f32) -> Self {
        Self::Number(n)
    }
}

impl From<f64> for StyleValue {
    fn from(n: f64) -> Self {
        Self::Number(n as f32)
    }
}

impl From<i32> for StyleValue {
    fn from(n: i32) -> Self {
        Self::Number(n as f32)
    }
}

impl From<u32> for StyleValue {
    fn from(n: u32) -> Self {
        Self::Number(n as f32)
    }
}

impl From<&str> for StyleValue {
    fn from(s: &str) -> Self {
        Self::Keyword(CompactString::from(s))
    }
}

impl std::fmt::Display for StyleValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Keyword(k) => f.write_str(k),
        }
    }
}

/// Ordered set of style properties. Setting an existing property replaces
/// its value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Style {
    props: Vec<(CompactString, StyleValue)>,
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Style::set`].
    pub fn with(mut self, name: &str, value: impl Into<StyleValue>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: &str, value: impl Into<StyleValue>) {
        let value = value.into();
        if let Some(prop) = self.props.iter_mut().find(|(k, _)| k == name) {
            prop.1 = value;
        } else {
            self.props.push((CompactString::from(name), value));
        }
    }

    pub fn get(&self, name: &str) -> Option<&StyleValue> {
        self.props.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Numeric property value.
    pub fn number(&self, name: &str) -> Option<f32> {
        match self.get(name)? {
            StyleValue::Number(n) => Some(*n),
            StyleValue::Keyword(_) => None,
        }
    }

    /// Overlay `other` onto `self`; properties of `other` win.
    pub fn merge(&mut self, other: &Style) {
        for (name, value) in &other.props {
            self.set(name, value.clone());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }

    pub fn len(&self) -> usize {
        self.props.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &StyleValue)> {
        self.props.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl std::fmt::Display for Style {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("{")?;
        for (i, (name, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{name}: {value}")?;
        }
        f.write_str("}")
    }
}

/// Merge style layers in increasing priority.
///
/// Absent layers are skipped. Returns `None` when every layer is absent, so
/// "no style" stays distinguishable from an empty style.
pub fn merge_styles<'a>(layers: impl IntoIterator<Item = Option<&'a Style>>) -> Option<Style> {
    let mut merged: Option<Style> = None;
    for layer in layers.into_iter().flatten() {
        merged.get_or_insert_with(Style::new).merge(layer);
    }
    merged
}

// =============================================================================
// StyleSheet
// =============================================================================

/// Caller-supplied style registry: per-tag styles plus the root style.
///
/// The root style is the ambient style given to free-standing text and to
/// inline wrappers.
#[derive(Debug, Clone, Default)]
pub struct StyleSheet {
    pub root: Option<Style>,
    tags: FxHashMap<CompactString, Style>,
}

impl StyleSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(mut self, style: Style) -> Self {
        self.root = Some(style);
        self
    }

    pub fn with_tag(mut self, tag: &str, style: Style) -> Self {
        self.insert(tag, style);
        self
    }

    pub fn insert(&mut self, tag: &str, style: Style) {
        self.tags.insert(CompactString::from(tag), style);
    }

    pub fn root(&self) -> Option<&Style> {
        self.root.as_ref()
    }

    /// Style registered for a tag.
    pub fn tag(&self, tag: &str) -> Option<&Style> {
        self.tags.get(tag)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains_key(tag)
    }
}

// =============================================================================
// Structural defaults
// =============================================================================

/// Horizontal offset of the list bullet relative to its item.
pub const BULLET_OFFSET: f32 = -20.0;

/// Style always applied to a tag, on top of caller styles.
pub fn structural_style(tag: &str) -> Option<Style> {
    match tag {
        "li" => Some(Style::new().with("position", "relative")),
        _ => None,
    }
}

/// Style of the bullet marker prepended to list items.
pub fn bullet_style() -> Style {
    Style::new()
        .with("position", "absolute")
        .with("left", BULLET_OFFSET)
}
