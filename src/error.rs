//! Error types for htmlview.
//!
//! Parsing is the only fallible stage. Missing styles, missing `href`s and
//! unparseable image dimensions are all handled as "unspecified" by the
//! converter and never surface here.

use thiserror::Error;

/// Malformed markup reported by the parser.
///
/// Every variant carries the byte offset into the input where the problem
/// was detected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A `<` opened a tag that never reached its closing `>`.
    #[error("unterminated tag starting at byte {offset}")]
    UnterminatedTag {
        /// Offset of the opening `<`
        offset: usize,
    },

    /// A `<!--` comment that never reached `-->`.
    #[error("unterminated comment starting at byte {offset}")]
    UnterminatedComment {
        /// Offset of the opening `<!--`
        offset: usize,
    },

    /// An end tag with no matching open element (strict mode only).
    #[error("unexpected end tag </{name}> at byte {offset}")]
    UnexpectedEndTag {
        /// Tag name as written (after lowercasing, if enabled)
        name: String,
        /// Offset of the `</`
        offset: usize,
    },

    /// An element still open at end of input (strict mode only).
    #[error("element <{name}> opened at byte {offset} is never closed")]
    UnclosedElement {
        /// Tag name of the open element
        name: String,
        /// Offset of its start tag
        offset: usize,
    },

    /// An element nested deeper than [`ParseOptions::max_depth`](crate::dom::ParseOptions).
    #[error("element at byte {offset} exceeds the nesting limit of {limit}")]
    TooDeep {
        /// Configured maximum depth
        limit: usize,
        /// Offset of the start tag that crossed the limit
        offset: usize,
    },
}

impl ParseError {
    /// Byte offset where the error was detected.
    pub fn offset(&self) -> usize {
        match self {
            Self::UnterminatedTag { offset }
            | Self::UnterminatedComment { offset }
            | Self::UnexpectedEndTag { offset, .. }
            | Self::UnclosedElement { offset, .. }
            | Self::TooDeep { offset, .. } => *offset,
        }
    }
}

/// Errors that can occur while turning markup into a render tree.
#[derive(Debug, Error)]
pub enum HtmlViewError {
    /// The markup could not be parsed; no tree was produced.
    #[error("malformed markup: {0}")]
    Parse(#[from] ParseError),
}

/// Result type alias for htmlview operations.
pub type HtmlViewResult<T> = Result<T, HtmlViewError>;
