//! Core types and options for the Sift text analysis pipeline.
//!
//! This crate holds the values that cross the boundary between the analysis
//! pipeline and its consumers (indexers, query parsers, highlighters):
//!
//! - **[`Token`]**: an immutable lexical unit with UTF-16 offsets and a position
//! - **[`options`]**: the immutable configuration objects for char filters and
//!   tokenizers, built through validating builders
//!
//! Keeping them separate from `sift-core` lets storage code depend on the
//! token shape without pulling in the Unicode tables.

#![warn(missing_docs)]

use core::ops::Range;

use serde::{Deserialize, Serialize};

pub mod options;

pub use options::{
    CharFilterOptions, CharFilterOptionsBuilder, CombiningMarkPolicy, DigitNormalization,
    ElongationHandling, JoinerHandling, NewlinePolicy, OptionsError, SpaceNormalization,
    TokenizerOptions, TokenizerOptionsBuilder, UnicodeNormalization, WhitespaceCollapse,
};

/// Zero-based term position inside one token stream.
pub type Position = u32;

/// Returns the length of `text` in UTF-16 code units.
///
/// This is the metric used for every token offset and length bound.
#[inline]
pub fn utf16_len(text: &str) -> usize {
    text.chars().map(char::len_utf16).sum()
}

/// Errors raised when a [`Token`] would violate its invariants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// The term text was empty.
    #[error("token term must not be empty")]
    EmptyTerm,
    /// The span was empty or reversed.
    #[error("token span [{start}, {end}) is empty or reversed")]
    EmptySpan {
        /// Requested start offset.
        start: usize,
        /// Requested end offset.
        end: usize,
    },
    /// The span length disagrees with the UTF-16 length of the term.
    #[error("token span covers {span} code units but term has {term}")]
    LengthMismatch {
        /// `end - start`.
        span: usize,
        /// UTF-16 length of the term.
        term: usize,
    },
    /// Shifting the offsets would move them below zero or past `usize::MAX`.
    #[error("token offsets overflow when shifted")]
    OffsetOverflow,
}

/// One lexical unit produced by a tokenizer.
///
/// Offsets are half-open `[start, end)` and measured in **UTF-16 code units**
/// against the exact text the tokenizer consumed (the post-char-filter text),
/// never against raw input. `position` is zero-based; within one stream it is
/// monotonic non-decreasing.
///
/// Tokens are immutable. [`Token::with_term`] and [`Token::shift`] return new
/// values and leave the original untouched.
///
/// # Example
///
/// ```
/// use sift_types::Token;
///
/// let source = "state of the art";
/// let token = Token::new("the", 9, 12, 2).unwrap();
/// assert_eq!(token.slice_of(source), Some("the"));
/// assert_eq!(token.len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawToken")]
pub struct Token {
    term: String,
    start: usize,
    end: usize,
    position: Position,
}

#[derive(Deserialize)]
struct RawToken {
    term: String,
    start: usize,
    end: usize,
    position: Position,
}

impl TryFrom<RawToken> for Token {
    type Error = TokenError;

    fn try_from(raw: RawToken) -> Result<Self, Self::Error> {
        Token::new(raw.term, raw.start, raw.end, raw.position)
    }
}

impl Token {
    /// Creates a token, validating every invariant.
    ///
    /// # Errors
    ///
    /// Fails if `term` is empty, if `start >= end`, or if `end - start` is not
    /// the UTF-16 length of `term`.
    pub fn new(
        term: impl Into<String>,
        start: usize,
        end: usize,
        position: Position,
    ) -> Result<Self, TokenError> {
        let term = term.into();
        if term.is_empty() {
            return Err(TokenError::EmptyTerm);
        }
        if start >= end {
            return Err(TokenError::EmptySpan { start, end });
        }
        let units = utf16_len(&term);
        if end - start != units {
            return Err(TokenError::LengthMismatch {
                span: end - start,
                term: units,
            });
        }
        Ok(Self {
            term,
            start,
            end,
            position,
        })
    }

    /// The term text.
    #[inline]
    pub fn term(&self) -> &str {
        &self.term
    }

    /// Start offset (inclusive), in UTF-16 code units.
    #[inline]
    pub const fn start(&self) -> usize {
        self.start
    }

    /// End offset (exclusive), in UTF-16 code units.
    #[inline]
    pub const fn end(&self) -> usize {
        self.end
    }

    /// Zero-based term position.
    #[inline]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Span length in code units (`end - start`). Never zero.
    #[inline]
    #[allow(clippy::len_without_is_empty)]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns a token with the same offsets and position but a new term.
    ///
    /// Used by post-processing (case folding, synonyms) where the term no
    /// longer matches the source span verbatim.
    ///
    /// # Errors
    ///
    /// Fails with [`TokenError::EmptyTerm`] if `term` is empty.
    pub fn with_term(&self, term: impl Into<String>) -> Result<Self, TokenError> {
        let term = term.into();
        if term.is_empty() {
            return Err(TokenError::EmptyTerm);
        }
        Ok(Self {
            term,
            start: self.start,
            end: self.end,
            position: self.position,
        })
    }

    /// Shifts both offsets by `delta` code units.
    ///
    /// # Errors
    ///
    /// Fails with [`TokenError::OffsetOverflow`] if either offset would leave
    /// the `usize` range.
    pub fn shift(&self, delta: isize) -> Result<Self, TokenError> {
        let start = self
            .start
            .checked_add_signed(delta)
            .ok_or(TokenError::OffsetOverflow)?;
        let end = self
            .end
            .checked_add_signed(delta)
            .ok_or(TokenError::OffsetOverflow)?;
        Ok(Self {
            term: self.term.clone(),
            start,
            end,
            position: self.position,
        })
    }

    /// Maps the UTF-16 span onto UTF-8 byte offsets of `source`.
    ///
    /// Returns `None` when the span runs past the end of `source` or either
    /// offset falls inside a surrogate pair.
    pub fn byte_range(&self, source: &str) -> Option<Range<usize>> {
        let mut units = 0usize;
        let mut start_byte = None;

        for (byte, ch) in source.char_indices() {
            if units == self.start {
                start_byte = Some(byte);
            }
            if units == self.end {
                return start_byte.map(|s| s..byte);
            }
            if units > self.end {
                return None;
            }
            units += ch.len_utf16();
        }

        if units == self.end {
            start_byte.map(|s| s..source.len())
        } else {
            None
        }
    }

    /// Resolves the span against `source`.
    ///
    /// For a token produced from `source` this always equals [`Token::term`].
    pub fn slice_of<'s>(&self, source: &'s str) -> Option<&'s str> {
        self.byte_range(source).map(|r| &source[r])
    }
}
