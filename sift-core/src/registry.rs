//! Named analyzers.
//!
//! An [`AnalyzerRegistry`] maps names to shared [`Analyzer`]s so that an
//! indexer and a query parser can look up the same analyzer by name. It is
//! the one mutable structure in the crate; lookups take a read lock and
//! analysis itself runs outside of it.

use std::sync::{Arc, PoisonError, RwLock};

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::analyzer::{Analysis, Analyzer};
use crate::error::AnalysisError;

/// Thread-safe name → analyzer map.
#[derive(Debug)]
pub struct AnalyzerRegistry {
    analyzers: RwLock<FxHashMap<String, Arc<Analyzer>>>,
}

impl AnalyzerRegistry {
    /// Name of the analyzer every registry starts with.
    pub const STANDARD: &'static str = "standard";

    /// Creates a registry holding [`Analyzer::standard`] as `"standard"`.
    pub fn new() -> Self {
        let mut analyzers = FxHashMap::default();
        analyzers.insert(Self::STANDARD.to_owned(), Arc::new(Analyzer::standard()));
        Self {
            analyzers: RwLock::new(analyzers),
        }
    }

    /// Registers `analyzer` under `name`, returning the one it replaced.
    pub fn register(
        &self,
        name: impl Into<String>,
        analyzer: impl Into<Arc<Analyzer>>,
    ) -> Option<Arc<Analyzer>> {
        let name = name.into();
        let analyzer = analyzer.into();
        let fingerprint = analyzer.pipeline().fingerprint();

        let previous = self
            .analyzers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.clone(), analyzer);

        debug!(
            name = %name,
            fingerprint,
            replaced = previous.is_some(),
            "analyzer registered"
        );
        previous
    }

    /// Looks up an analyzer by name.
    pub fn get(&self, name: &str) -> Option<Arc<Analyzer>> {
        self.analyzers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Analyzes `text` with the analyzer registered as `name`.
    ///
    /// # Errors
    ///
    /// [`AnalysisError::UnknownAnalyzer`] if nothing is registered under `name`.
    pub fn analyze(&self, name: &str, text: &str) -> Result<Analysis, AnalysisError> {
        let analyzer = self
            .get(name)
            .ok_or_else(|| AnalysisError::UnknownAnalyzer(name.to_owned()))?;
        Ok(analyzer.analyze(text))
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .analyzers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort_unstable();
        names
    }
}

impl Default for AnalyzerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use sift_types::TokenizerOptions;

    use super::*;
    use crate::config::PipelineConfig;

    fn min3() -> Analyzer {
        PipelineConfig {
            tokenizer: TokenizerOptions::builder()
                .min_token_length(3)
                .build()
                .unwrap(),
            ..PipelineConfig::default()
        }
        .to_analyzer()
    }

    #[test]
    fn starts_with_standard() {
        let registry = AnalyzerRegistry::new();
        assert_eq!(registry.names(), ["standard"]);
        let a = registry.analyze("standard", "hello world").unwrap();
        assert_eq!(a.tokens().len(), 2);
    }

    #[test]
    fn unknown_name_errors() {
        let registry = AnalyzerRegistry::new();
        let err = registry.analyze("klingon", "qapla'").unwrap_err();
        assert!(matches!(err, AnalysisError::UnknownAnalyzer(ref n) if n == "klingon"));
        assert!(registry.get("klingon").is_none());
    }

    #[test]
    fn register_and_replace() {
        let registry = AnalyzerRegistry::new();
        assert!(registry.register("long", min3()).is_none());
        assert_eq!(registry.names(), ["long", "standard"]);

        let a = registry.analyze("long", "a an ant").unwrap();
        assert_eq!(a.tokens().len(), 1);

        let previous = registry.register("long", Analyzer::standard());
        assert!(previous.is_some());
        assert_eq!(registry.analyze("long", "a an ant").unwrap().tokens().len(), 3);
    }

    #[test]
    fn shared_across_threads() {
        let registry = AnalyzerRegistry::new();
        registry.register("long", min3());

        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..50 {
                        let a = registry.analyze("long", "the cat sat").unwrap();
                        assert_eq!(a.tokens().len(), 3);
                    }
                });
            }
            s.spawn(|| registry.register("other", Analyzer::standard()));
        });

        assert_eq!(registry.names(), ["long", "other", "standard"]);
    }
}
