//! `ExtractorChain`: agrega la metadata de varios extractores.
//!
//! Orden de merge: extractores en orden de registro, el posterior gana. Un
//! extractor que falla se ignora; la cadena solo falla si el resultado final
//! queda vacío.

use std::fmt::Debug;

use log::debug;

use super::merge::merge_metadata;
use super::TriggerMetadata;
use crate::errors::ScriptError;

/// Estrategia que obtiene `script → perfiles` de una fuente `S`.
pub trait MetadataExtractor<S: ?Sized>: Send + Sync + Debug {
    fn name(&self) -> &str;
    fn extract(&self, source: &S) -> Result<TriggerMetadata, ScriptError>;
}

#[derive(Debug)]
pub struct ExtractorChain<S: ?Sized> {
    extractors: Vec<Box<dyn MetadataExtractor<S>>>,
}

impl<S: ?Sized> ExtractorChain<S> {
    pub fn new() -> Self {
        Self { extractors: Vec::new() }
    }

    pub fn with_extractors(extractors: Vec<Box<dyn MetadataExtractor<S>>>) -> Self {
        Self { extractors }
    }

    pub fn push(&mut self, extractor: Box<dyn MetadataExtractor<S>>) {
        self.extractors.push(extractor);
    }

    pub fn extract(&self, source: &S) -> Result<TriggerMetadata, ScriptError> {
        let mut merged = TriggerMetadata::new();
        for extractor in &self.extractors {
            match extractor.extract(source) {
                Ok(found) => merge_metadata(&mut merged, found),
                Err(e) => debug!("extractor '{}' skipped: {e}", extractor.name()),
            }
        }
        if merged.is_empty() {
            return Err(ScriptError::MetadataAggregation);
        }
        Ok(merged)
    }
}

impl<S: ?Sized> Default for ExtractorChain<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Fixed(&'static str, Vec<(&'static str, Vec<&'static str>)>);

    impl MetadataExtractor<str> for Fixed {
        fn name(&self) -> &str {
            self.0
        }

        fn extract(&self, _source: &str) -> Result<TriggerMetadata, ScriptError> {
            Ok(self.1
                   .iter()
                   .map(|(s, p)| (s.to_string(), p.iter().map(|x| x.to_string()).collect()))
                   .collect())
        }
    }

    #[derive(Debug)]
    struct Failing;

    impl MetadataExtractor<str> for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn extract(&self, _source: &str) -> Result<TriggerMetadata, ScriptError> {
            Err(ScriptError::Extraction("no declaration".into()))
        }
    }

    #[test]
    fn later_extractor_wins_and_failures_are_skipped() {
        let chain: ExtractorChain<str> =
            ExtractorChain::with_extractors(vec![Box::new(Fixed("first", vec![("a.py", vec!["dev"])])),
                                                 Box::new(Failing),
                                                 Box::new(Fixed("second", vec![("a.py", vec!["prod"]), ("b.py", vec![])]))]);
        let meta = chain.extract("site").unwrap();
        assert_eq!(meta["a.py"], vec!["prod".to_string()]);
        assert!(meta.contains_key("b.py"));
    }

    #[test]
    fn all_failing_is_aggregation_error() {
        let chain: ExtractorChain<str> = ExtractorChain::with_extractors(vec![Box::new(Failing), Box::new(Failing)]);
        assert!(matches!(chain.extract("site"), Err(ScriptError::MetadataAggregation)));
    }

    #[test]
    fn empty_chain_is_aggregation_error() {
        let chain: ExtractorChain<str> = ExtractorChain::default();
        assert!(matches!(chain.extract("site"), Err(ScriptError::MetadataAggregation)));
    }
}
