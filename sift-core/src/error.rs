//! Error types for pipeline construction and analysis.

use std::io;

/// Raised when a [`PipelineBuilder`](crate::analyzer::pipeline::PipelineBuilder)
/// cannot produce a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
    /// `build` was called before a tokenizer stage was set.
    #[error("pipeline has no tokenizer stage")]
    MissingTokenizer,
}

/// Errors surfaced by the fallible analysis entry points.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// Reading input failed, or the input was not valid UTF-8.
    #[error("failed to read input: {0}")]
    Io(#[from] io::Error),

    /// A pipeline config could not be parsed or failed validation.
    #[error("invalid pipeline config: {0}")]
    Config(#[from] serde_json::Error),

    /// The pipeline could not be assembled.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// No analyzer is registered under the requested name.
    #[error("no analyzer registered as {0:?}")]
    UnknownAnalyzer(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        assert_eq!(
            PipelineError::MissingTokenizer.to_string(),
            "pipeline has no tokenizer stage"
        );
        assert_eq!(
            AnalysisError::from(PipelineError::MissingTokenizer).to_string(),
            "pipeline has no tokenizer stage"
        );
        assert_eq!(
            AnalysisError::UnknownAnalyzer("fr".into()).to_string(),
            "no analyzer registered as \"fr\""
        );
    }

    #[test]
    fn io_errors_convert() {
        let err: AnalysisError = io::Error::new(io::ErrorKind::InvalidData, "bad").into();
        assert!(matches!(err, AnalysisError::Io(_)));
        assert!(err.to_string().starts_with("failed to read input"));
    }
}
