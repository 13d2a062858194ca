//! Attribute system for DOM nodes
//!
//! Attributes are kept as parsed: a plain `Vec<(String, String)>` in source
//! order, with entity references left undecoded.

/// Tag attributes as simple key-value pairs
pub type Attrs = Vec<(String, String)>;

/// Extension trait for attribute operations on Attrs
pub trait AttrsExt {
    /// Get an attribute value by name
    fn get_attr(&self, name: &str) -> Option<&str>;

    /// Check if an attribute exists
    fn has_attr(&self, name: &str) -> bool;

    /// Set an attribute value (insert or update)
    fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>);

    /// Remove an attribute by name, returning the old value if present
    fn remove_attr(&mut self, name: &str) -> Option<String>;

    /// Read a pixel dimension from `primary`, falling back to `fallback`.
    ///
    /// Returns 0 ("unspecified") when neither attribute holds a positive number.
    fn dimension(&self, primary: &str, fallback: &str) -> u32 {
        self.get_attr(primary)
            .and_then(parse_dimension)
            .or_else(|| self.get_attr(fallback).and_then(parse_dimension))
            .unwrap_or(0)
    }
}

impl AttrsExt for Attrs {
    fn get_attr(&self, name: &str) -> Option<&str> {
        self.iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    fn has_attr(&self, name: &str) -> bool {
        self.iter().any(|(k, _)| k == name)
    }

    fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(attr) = self.iter_mut().find(|(k, _)| k == &name) {
            attr.1 = value;
        } else {
            self.push((name, value));
        }
    }

    fn remove_attr(&mut self, name: &str) -> Option<String> {
        self.iter()
            .position(|(k, _)| k == name)
            .map(|pos| self.remove(pos).1)
    }
}

/// Parse a dimension attribute value.
///
/// Accepts surrounding whitespace and fractional values (truncated).
/// Zero, negative and non-numeric values yield `None`.
pub fn parse_dimension(value: &str) -> Option<u32> {
    let value = value.trim();
    if let Ok(n) = value.parse::<u32>() {
        return (n > 0).then_some(n);
    }
    let n = value.parse::<f64>().ok()?;
    if n.is_finite() && n >= 1.0 {
        Some(n.min(u32::MAX as f64) as u32)
    } else {
        None
    }
}

// =============================================================================
// Tests
// =============================================================================
