//! Text analysis pipeline.
//!
//! This module provides the text processing components:
//! - **Char filters**: rewrite raw text (newlines, spaces, normalization form, ...)
//! - **Tokenizer**: splits filtered text into tokens with UTF-16 offsets
//! - **Pipeline**: ordered filter stages plus one tokenizer stage
//! - **Analyzer**: runs a pipeline and returns the filtered text with its tokens
//!
//! Token offsets always refer to [`Analysis::normalized_text`], the output of
//! the last char filter stage.

use std::borrow::Cow;
use std::io::Read;

use serde::Serialize;
use sift_types::{Token, TokenizerOptions};
use tracing::trace;

use crate::error::AnalysisError;

pub mod char_filter;
pub mod pipeline;
pub mod tokenizer;
pub(crate) mod unicode;

pub use char_filter::{CharFilter, Filtered, StandardCharFilter};
pub use pipeline::{FilterStage, Pipeline, PipelineBuilder, TokenizerStage};
pub use tokenizer::{StandardTokenizer, Tokenizer};

/// Runs a [`Pipeline`] end to end.
///
/// Stateless apart from its immutable pipeline, so one analyzer can serve any
/// number of threads.
///
/// # Example
///
/// ```
/// use sift_core::Analyzer;
///
/// let analysis = Analyzer::standard().analyze("Hello,\u{00A0}\u{00A0}world");
/// assert_eq!(analysis.normalized_text(), Some("Hello, world"));
/// let terms: Vec<_> = analysis.tokens().iter().map(|t| t.term()).collect();
/// assert_eq!(terms, ["Hello", "world"]);
/// ```
#[derive(Debug, Clone)]
pub struct Analyzer {
    pipeline: Pipeline,
    tokenizer_options: TokenizerOptions,
}

impl Analyzer {
    /// Wraps `pipeline`.
    ///
    /// When any filter stage keeps joiners as inner-word characters, the
    /// tokenizer runs with joiner handling on regardless of its own options.
    pub fn new(pipeline: Pipeline) -> Self {
        let tokenizer_options = pipeline.effective_tokenizer_options();
        Self {
            pipeline,
            tokenizer_options,
        }
    }

    /// Analyzer over [`Pipeline::standard`].
    pub fn standard() -> Self {
        Self::new(Pipeline::standard())
    }

    /// The pipeline this analyzer runs.
    #[inline]
    pub const fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Runs only the char filter stages, each one's output feeding the next.
    pub fn filter<'a>(&self, text: &'a str) -> Cow<'a, str> {
        let mut current = Cow::Borrowed(text);

        for stage in self.pipeline.filters() {
            let next = match stage.apply(&current).into_text() {
                Cow::Borrowed(_) => None,
                Cow::Owned(next) => Some(next),
            };
            if let Some(next) = next {
                current = Cow::Owned(next);
            }
        }

        current
    }

    /// Filters `text` through every stage in order, then tokenizes the result.
    pub fn analyze(&self, text: &str) -> Analysis {
        let current = self.filter(text);
        let tokens = self
            .pipeline
            .tokenizer()
            .tokenize(&current, &self.tokenizer_options);

        trace!(
            input_len = text.len(),
            output_len = current.len(),
            tokens = tokens.len(),
            "analyzed"
        );

        Analysis {
            normalized_text: Some(current.into_owned()),
            tokens,
        }
    }

    /// Null-aware form of [`analyze`](Self::analyze): `None` yields an
    /// analysis with no text and no tokens.
    pub fn analyze_opt(&self, text: Option<&str>) -> Analysis {
        match text {
            Some(text) => self.analyze(text),
            None => Analysis::default(),
        }
    }

    /// Drains `reader` into memory, then analyzes it.
    ///
    /// # Errors
    ///
    /// [`AnalysisError::Io`] if reading fails or the input is not valid UTF-8.
    pub fn analyze_reader<R: Read>(&self, mut reader: R) -> Result<Analysis, AnalysisError> {
        let mut buf = String::new();
        reader.read_to_string(&mut buf)?;
        Ok(self.analyze(&buf))
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::standard()
    }
}

/// Result of one analysis call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Analysis {
    normalized_text: Option<String>,
    tokens: Vec<Token>,
}

impl Analysis {
    /// The filtered text the token offsets refer to. `None` for null input.
    #[inline]
    pub fn normalized_text(&self) -> Option<&str> {
        self.normalized_text.as_deref()
    }

    /// Tokens in stream order.
    #[inline]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// True if no tokens were produced.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Consumes the analysis.
    pub fn into_parts(self) -> (Option<String>, Vec<Token>) {
        (self.normalized_text, self.tokens)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use sift_types::{CharFilterOptions, JoinerHandling, NewlinePolicy};

    use super::*;

    fn terms(analysis: &Analysis) -> Vec<&str> {
        analysis.tokens().iter().map(|t| t.term()).collect()
    }

    #[test]
    fn empty_input() {
        let a = Analyzer::standard().analyze("");
        assert_eq!(a.normalized_text(), Some(""));
        assert!(a.is_empty());
    }

    #[test]
    fn null_input() {
        let a = Analyzer::standard().analyze_opt(None);
        assert_eq!(a.normalized_text(), None);
        assert!(a.is_empty());
        assert_eq!(
            Analyzer::standard().analyze_opt(Some("x y")),
            Analyzer::standard().analyze("x y")
        );
    }

    #[test]
    fn offsets_refer_to_filtered_text() {
        let a = Analyzer::standard().analyze("  ab\r\n\u{00A0}\u{00A0}cd");
        let text = a.normalized_text().unwrap();
        assert_eq!(text, " ab\n cd");
        for t in a.tokens() {
            assert_eq!(t.slice_of(text), Some(t.term()));
        }
        assert_eq!(a.tokens()[1].start(), 5);
    }

    #[test]
    fn stages_feed_each_other() {
        let remove_newlines = CharFilterOptions::passthrough();
        let remove_newlines = sift_types::CharFilterOptionsBuilder::from(remove_newlines)
            .newline_policy(NewlinePolicy::Remove)
            .build();
        let pipeline = Pipeline::builder()
            .char_filter(Arc::new(StandardCharFilter), remove_newlines)
            .char_filter(Arc::new(StandardCharFilter), CharFilterOptions::standard())
            .tokenizer(Arc::new(StandardTokenizer), TokenizerOptions::standard())
            .build()
            .unwrap();
        let a = Analyzer::new(pipeline).analyze("a \n b");
        assert_eq!(a.normalized_text(), Some("a b"));
        assert_eq!(terms(&a), ["a", "b"]);
    }

    #[test]
    fn joiner_policy_reaches_tokenizer() {
        let word = "\u{0645}\u{06CC}\u{200C}\u{062E}\u{0648}\u{0627}\u{0645}";
        let tokenizer_without = TokenizerOptions::builder()
            .treat_joiner_as_inner_word(false)
            .build()
            .unwrap();

        let inner = Pipeline::builder()
            .char_filter(Arc::new(StandardCharFilter), CharFilterOptions::standard())
            .tokenizer(Arc::new(StandardTokenizer), tokenizer_without)
            .build()
            .unwrap();
        assert_eq!(Analyzer::new(inner).analyze(word).tokens().len(), 1);

        let keep_only = CharFilterOptions::builder()
            .joiner_handling(JoinerHandling::Preserve)
            .build();
        let plain = Pipeline::builder()
            .char_filter(Arc::new(StandardCharFilter), keep_only)
            .tokenizer(Arc::new(StandardTokenizer), tokenizer_without)
            .build()
            .unwrap();
        assert_eq!(Analyzer::new(plain).analyze(word).tokens().len(), 2);
    }

    #[test]
    fn reader_matches_str() {
        let input = "Zoë's café\r\nrocks";
        let analyzer = Analyzer::standard();
        let via_reader = analyzer.analyze_reader(input.as_bytes()).unwrap();
        assert_eq!(via_reader, analyzer.analyze(input));
    }

    #[test]
    fn reader_rejects_invalid_utf8() {
        let err = Analyzer::standard()
            .analyze_reader(&[b'o', b'k', 0xFE][..])
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Io(_)));
    }

    #[test]
    fn filter_borrows_clean_text() {
        let analyzer = Analyzer::standard();
        assert!(matches!(analyzer.filter("clean text"), Cow::Borrowed("clean text")));
        assert_eq!(analyzer.filter("a \t b"), "a b");
    }

    #[test]
    fn into_parts_returns_both() {
        let (text, tokens) = Analyzer::standard().analyze("one two").into_parts();
        assert_eq!(text.as_deref(), Some("one two"));
        assert_eq!(tokens.len(), 2);
    }

    #[test]
    fn serializes_to_json() {
        let a = Analyzer::standard().analyze("hi");
        let json = serde_json::to_string(&a).unwrap();
        assert_eq!(
            json,
            r#"{"normalized_text":"hi","tokens":[{"term":"hi","start":0,"end":2,"position":0}]}"#
        );
    }
}
