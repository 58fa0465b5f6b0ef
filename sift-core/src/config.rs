//! Serializable pipeline configuration.
//!
//! A [`PipelineConfig`] describes a pipeline built from the standard
//! components: one char filter stage per entry in `char_filters`, then the
//! standard tokenizer. Storing it next to an index is how query time gets
//! the exact pipeline index time used.
//!
//! ```
//! use sift_core::PipelineConfig;
//!
//! let json = r#"{
//!     "char_filters": [{ "unicode_normalization": "nfkc" }],
//!     "tokenizer": { "keep_hyphens": false }
//! }"#;
//! let analyzer = PipelineConfig::from_json(json).unwrap().to_analyzer();
//! let terms: Vec<_> = analyzer
//!     .analyze("ﬁne-grained")
//!     .tokens()
//!     .iter()
//!     .map(|t| t.term().to_owned())
//!     .collect();
//! assert_eq!(terms, ["fine", "grained"]);
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sift_types::{CharFilterOptions, TokenizerOptions};

use crate::analyzer::char_filter::StandardCharFilter;
use crate::analyzer::pipeline::{FilterStage, Pipeline, TokenizerStage};
use crate::analyzer::tokenizer::StandardTokenizer;
use crate::analyzer::Analyzer;
use crate::error::AnalysisError;

/// Options for every stage of a standard-component pipeline.
///
/// Missing fields take the [`Default`] values: one standard char filter
/// stage and standard tokenizer options. Unknown fields are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// One entry per char filter stage, in application order.
    pub char_filters: Vec<CharFilterOptions>,
    /// Tokenizer options.
    pub tokenizer: TokenizerOptions,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            char_filters: vec![CharFilterOptions::standard()],
            tokenizer: TokenizerOptions::standard(),
        }
    }
}

impl PipelineConfig {
    /// Parses a config from JSON.
    ///
    /// # Errors
    ///
    /// [`AnalysisError::Config`] on malformed JSON, unknown fields, or
    /// tokenizer options that fail validation.
    pub fn from_json(json: &str) -> Result<Self, AnalysisError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// [`AnalysisError::Config`] if serialization fails.
    pub fn to_json(&self) -> Result<String, AnalysisError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Builds the described pipeline.
    pub fn into_pipeline(self) -> Pipeline {
        let filter: Arc<StandardCharFilter> = Arc::new(StandardCharFilter);
        let filters = self
            .char_filters
            .into_iter()
            .map(|options| FilterStage::new(filter.clone(), options))
            .collect();
        let tokenizer = TokenizerStage::new(Arc::new(StandardTokenizer), self.tokenizer);
        Pipeline::from_parts(filters, tokenizer)
    }

    /// Builds an [`Analyzer`] over the described pipeline.
    pub fn to_analyzer(&self) -> Analyzer {
        Analyzer::new(self.clone().into_pipeline())
    }
}
