//! Errores del core.
//!
//! Un único enum cubre todas las capas (resolvers, executors, processor y
//! decoradores de cache) para que los decoradores puedan implementar la misma
//! interfaz que envuelven sin convertir tipos de error.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("invalid configuration: {0}")] Config(String),
    #[error("script cannot be null or empty")] EmptyScript,
    #[error("failed to load script '{path}': {reason}")] ScriptLoad { path: String, reason: String },
    #[error("failed to write script '{path}': {reason}")] ScriptWrite { path: String, reason: String },
    #[error("expression '{expression}' could not be evaluated: {reason}")] ExpressionEvaluation { expression: String, reason: String },
    #[error("metadata extractor failed: {0}")] Extraction(String),
    #[error("no metadata extractor produced a value")] MetadataAggregation,
    #[error("script execution failed: {0}")] Execution(String),
    #[error("cache key generation failed: {0}")] CacheKeyGeneration(String),
    #[error("cache store failure: {0}")] CacheStore(String),
}

impl ScriptError {
    pub fn execution(reason: impl std::fmt::Display) -> Self {
        Self::Execution(reason.to_string())
    }

    pub fn expression(expression: &str, reason: impl std::fmt::Display) -> Self {
        Self::ExpressionEvaluation { expression: expression.to_string(),
                                     reason: reason.to_string() }
    }
}
