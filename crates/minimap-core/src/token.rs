#![forbid(unsafe_code)]

//! Token classification contract.
//!
//! The syntax service lives outside this workspace; the pipeline only needs
//! a way to partition a text snapshot into spans labeled by lexical kind so
//! the render kernel can pick pixel colors. Classifier failures must be
//! catchable: a minimap that falls back to a single color is acceptable, a
//! wedged render queue is not.

use std::fmt;
use std::ops::Range;

/// Lexical category of a classified span.
///
/// Deliberately coarse: at one pixel per column, anything finer than these
/// buckets is indistinguishable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Keyword,
    Identifier,
    Literal,
    String,
    Comment,
    Operator,
    Punctuation,
    Plain,
}

/// A half-open byte range of the snapshot labeled with a token kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSpan {
    pub range: Range<usize>,
    pub kind: TokenKind,
}

impl TokenSpan {
    /// Create a span covering `range` with the given kind.
    pub fn new(range: Range<usize>, kind: TokenKind) -> Self {
        Self { range, kind }
    }
}

/// Classifies a text snapshot into colored spans.
///
/// Implementations run on the render worker thread and must be `Send + Sync`
/// so one classifier handle can serve successive jobs. Spans may be returned
/// in any order and need not cover the whole text; uncovered bytes render
/// with the scheme's default foreground.
pub trait TokenClassifier: Send + Sync {
    /// Produce spans for `text`.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifyError`] when the snapshot cannot be processed. The
    /// caller recovers by rendering unclassified output; the error never
    /// aborts a render job.
    fn classify(&self, text: &str) -> Result<Vec<TokenSpan>, ClassifyError>;
}

/// Failure reported by a [`TokenClassifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifyError {
    message: String,
}

impl ClassifyError {
    /// Create an error with a human-readable reason.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ClassifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "token classification failed: {}", self.message)
    }
}

impl std::error::Error for ClassifyError {}
