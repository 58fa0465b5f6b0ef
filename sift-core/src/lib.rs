//! Unicode-aware text analysis for search.
//!
//! Raw text goes through an ordered list of char filters, then one tokenizer;
//! the result is the filtered text plus [`Token`]s whose UTF-16 offsets point
//! into it.
//!
//! ```text
//! raw text ──▶ CharFilter ──▶ ... ──▶ CharFilter ──▶ Tokenizer ──▶ Analysis
//! ```
//!
//! - [`analyzer`]: the stages, [`Pipeline`] assembly and the [`Analyzer`]
//! - [`config`]: JSON round-tripping of standard pipelines
//! - [`registry`]: analyzers shared by name
//!
//! Every component is immutable after construction and `Send + Sync`.
//!
//! ```
//! use sift_core::Analyzer;
//!
//! let analysis = Analyzer::standard().analyze("state-of-the-art a\u{0301} 🚀");
//! let terms: Vec<_> = analysis.tokens().iter().map(|t| t.term()).collect();
//! assert_eq!(terms, ["state-of-the-art", "\u{00E1}"]);
//! ```

pub mod analyzer;
pub mod config;
pub mod error;
pub mod registry;

pub use analyzer::{
    Analysis, Analyzer, CharFilter, FilterStage, Filtered, Pipeline, PipelineBuilder,
    StandardCharFilter, StandardTokenizer, Tokenizer, TokenizerStage,
};
pub use config::PipelineConfig;
pub use error::{AnalysisError, PipelineError};
pub use registry::AnalyzerRegistry;
pub use sift_types::{CharFilterOptions, Token, TokenizerOptions};
