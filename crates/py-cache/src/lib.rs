//! py-cache: decoradores con cache para las capas de py-core.
//!
//! Las regiones viven en un `CacheManager`; las claves salen de un
//! `CacheKeyGenerator` sobre el script (y los argumentos ordenados).
pub mod config;
pub mod decorators;
pub mod error;
pub mod key;
pub mod locks;
pub mod store;

pub use config::{CacheConfig, CacheLevel, CacheNames, KeyConfig};
pub use decorators::{CacheContext, CachingExecutor, CachingFileHandler, CachingProcessor, CachingResolverChain};
pub use error::CacheStoreError;
pub use key::{CacheKeyGenerator, HashAlgorithm, HashKeyGenerator};
pub use locks::KeyedLocks;
pub use store::{CacheManager, CacheStore, InMemoryCacheManager, InMemoryCacheStore};

use std::sync::Arc;

use py_core::ScriptError;

/// Contexto de cache en memoria a partir de la configuración.
pub fn in_memory_context(config: &CacheConfig) -> Result<CacheContext, ScriptError> {
    let keys = HashKeyGenerator::new(config.key.algorithm, config.key.delimiter.clone())?;
    let ctx = CacheContext::new(Arc::new(InMemoryCacheManager::new()), Arc::new(keys));
    Ok(if config.single_flight { ctx.with_single_flight() } else { ctx })
}
