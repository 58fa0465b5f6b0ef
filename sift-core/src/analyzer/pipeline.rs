//! Pipeline assembly: an ordered list of char filter stages and one tokenizer
//! stage, each paired with its options.
//!
//! Pipelines are immutable once built and cheap to clone (stages hold their
//! components behind `Arc`). The same pipeline must be used at index time and
//! at query time; [`Pipeline::fingerprint`] gives a stable value to compare.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use rustc_hash::FxHasher;
use sift_types::{CharFilterOptions, JoinerHandling, Token, TokenizerOptions};
use smallvec::{smallvec, SmallVec};
use tracing::debug;

use super::char_filter::{CharFilter, Filtered, StandardCharFilter};
use super::tokenizer::{StandardTokenizer, Tokenizer};
use crate::config::PipelineConfig;
use crate::error::PipelineError;

/// A char filter together with the options it runs with.
#[derive(Clone)]
pub struct FilterStage {
    filter: Arc<dyn CharFilter>,
    options: CharFilterOptions,
}

impl FilterStage {
    /// Pairs `filter` with `options`.
    pub fn new(filter: Arc<dyn CharFilter>, options: CharFilterOptions) -> Self {
        Self { filter, options }
    }

    /// The filter component.
    #[inline]
    pub fn filter(&self) -> &dyn CharFilter {
        &*self.filter
    }

    /// The options passed to the filter.
    #[inline]
    pub const fn options(&self) -> &CharFilterOptions {
        &self.options
    }

    /// Runs the filter on `text`.
    #[inline]
    pub fn apply<'a>(&self, text: &'a str) -> Filtered<'a> {
        self.filter.apply(text, &self.options)
    }
}

impl fmt::Debug for FilterStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterStage")
            .field("filter", &self.filter.name())
            .field("options", &self.options)
            .finish()
    }
}

/// The tokenizer together with the options it was configured with.
#[derive(Clone)]
pub struct TokenizerStage {
    tokenizer: Arc<dyn Tokenizer>,
    options: TokenizerOptions,
}

impl TokenizerStage {
    /// Pairs `tokenizer` with `options`.
    pub fn new(tokenizer: Arc<dyn Tokenizer>, options: TokenizerOptions) -> Self {
        Self { tokenizer, options }
    }

    /// The tokenizer component.
    #[inline]
    pub fn tokenizer(&self) -> &dyn Tokenizer {
        &*self.tokenizer
    }

    /// The options as configured.
    ///
    /// An [`Analyzer`](super::Analyzer) may run the tokenizer with joiner
    /// handling turned on; see [`Pipeline::effective_tokenizer_options`].
    #[inline]
    pub const fn options(&self) -> &TokenizerOptions {
        &self.options
    }

    /// Runs the tokenizer on `text` with `options`.
    #[inline]
    pub fn tokenize(&self, text: &str, options: &TokenizerOptions) -> Vec<Token> {
        self.tokenizer.tokenize(text, options)
    }
}

impl fmt::Debug for TokenizerStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenizerStage")
            .field("tokenizer", &self.tokenizer.name())
            .field("options", &self.options)
            .finish()
    }
}

/// Ordered char filter stages followed by exactly one tokenizer stage.
#[derive(Debug, Clone)]
pub struct Pipeline {
    filters: SmallVec<[FilterStage; 4]>,
    tokenizer: TokenizerStage,
}

impl Pipeline {
    /// Starts an empty builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// One [`StandardCharFilter`] stage and the [`StandardTokenizer`], both
    /// with standard options.
    pub fn standard() -> Self {
        Self::from_parts(
            smallvec![FilterStage::new(
                Arc::new(StandardCharFilter),
                CharFilterOptions::standard()
            )],
            TokenizerStage::new(Arc::new(StandardTokenizer), TokenizerOptions::standard()),
        )
    }

    pub(crate) fn from_parts(
        filters: SmallVec<[FilterStage; 4]>,
        tokenizer: TokenizerStage,
    ) -> Self {
        let pipeline = Self { filters, tokenizer };
        debug!(
            filters = pipeline.filters.len(),
            tokenizer = pipeline.tokenizer.tokenizer.name(),
            fingerprint = pipeline.fingerprint(),
            "pipeline built"
        );
        pipeline
    }

    /// Char filter stages in application order.
    #[inline]
    pub fn filters(&self) -> &[FilterStage] {
        &self.filters
    }

    /// The tokenizer stage.
    #[inline]
    pub const fn tokenizer(&self) -> &TokenizerStage {
        &self.tokenizer
    }

    /// True if any filter stage keeps joiners as intra-word connectors.
    pub fn joiners_inner_word(&self) -> bool {
        self.filters
            .iter()
            .any(|s| s.options.joiner_handling() == JoinerHandling::PreserveAsInnerWord)
    }

    /// Tokenizer options as an analyzer runs them: the configured options,
    /// with joiner handling forced on when [`joiners_inner_word`](Self::joiners_inner_word).
    pub fn effective_tokenizer_options(&self) -> TokenizerOptions {
        let options = self.tokenizer.options;
        if self.joiners_inner_word() {
            options.with_joiner_as_inner_word(true)
        } else {
            options
        }
    }

    /// Hash of every stage's component name and options, in order.
    ///
    /// Two pipelines with equal fingerprints analyze text identically. The
    /// value is stable across runs of the same build, not across platforms.
    pub fn fingerprint(&self) -> u64 {
        let mut h = FxHasher::default();
        self.filters.len().hash(&mut h);
        for stage in &self.filters {
            stage.filter.name().hash(&mut h);
            stage.options.hash(&mut h);
        }
        self.tokenizer.tokenizer.name().hash(&mut h);
        self.tokenizer.options.hash(&mut h);
        h.finish()
    }

    /// Serializable description of this pipeline.
    ///
    /// `None` if any stage uses a component other than the standard ones,
    /// since custom components cannot be restored from options alone.
    pub fn to_config(&self) -> Option<PipelineConfig> {
        let standard_filters = self
            .filters
            .iter()
            .all(|s| s.filter.name() == StandardCharFilter::NAME);
        if !standard_filters || self.tokenizer.tokenizer.name() != StandardTokenizer::NAME {
            return None;
        }

        Some(PipelineConfig {
            char_filters: self.filters.iter().map(|s| s.options).collect(),
            tokenizer: self.tokenizer.options,
        })
    }
}

/// Builder for [`Pipeline`].
#[derive(Debug, Default)]
#[must_use]
pub struct PipelineBuilder {
    filters: SmallVec<[FilterStage; 4]>,
    tokenizer: Option<TokenizerStage>,
}

impl PipelineBuilder {
    /// Appends a char filter stage. The same filter may be added repeatedly.
    pub fn char_filter(mut self, filter: Arc<dyn CharFilter>, options: CharFilterOptions) -> Self {
        self.filters.push(FilterStage::new(filter, options));
        self
    }

    /// Sets the tokenizer stage, replacing any earlier one.
    pub fn tokenizer(mut self, tokenizer: Arc<dyn Tokenizer>, options: TokenizerOptions) -> Self {
        self.tokenizer = Some(TokenizerStage::new(tokenizer, options));
        self
    }

    /// Finishes the pipeline.
    ///
    /// # Errors
    ///
    /// [`PipelineError::MissingTokenizer`] if no tokenizer stage was set.
    pub fn build(self) -> Result<Pipeline, PipelineError> {
        let tokenizer = self.tokenizer.ok_or(PipelineError::MissingTokenizer)?;
        Ok(Pipeline::from_parts(self.filters, tokenizer))
    }
}
