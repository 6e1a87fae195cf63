//! Errores de los stores de cache.
//! Los decoradores los convierten en `ScriptError::CacheStore`.

use py_core::ScriptError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheStoreError {
    #[error("unknown cache region: {0}")]
    UnknownRegion(String),
    #[error("unexpected entry under key '{key}': {reason}")]
    UnexpectedEntry { key: String, reason: String },
    #[error("cache backend failure: {0}")]
    Backend(String),
}

impl From<CacheStoreError> for ScriptError {
    fn from(err: CacheStoreError) -> Self {
        ScriptError::CacheStore(err.to_string())
    }
}
