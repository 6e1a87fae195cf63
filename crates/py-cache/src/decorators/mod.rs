//! Decoradores con cache sobre las cuatro capas del core.
//!
//! Todos siguen el mismo flujo: calcular clave, buscar, en miss delegar,
//! guardar y devolver. Los errores del delegado pasan sin tocar.

mod executor;
mod file;
mod processor;
mod resolver;

use std::sync::Arc;

use log::debug;
use py_core::ScriptError;
use serde_json::Value;

use crate::key::CacheKeyGenerator;
use crate::locks::KeyedLocks;
use crate::store::{CacheManager, CacheStore};

pub use executor::CachingExecutor;
pub use file::CachingFileHandler;
pub use processor::CachingProcessor;
pub use resolver::CachingResolverChain;

/// Lo que comparten todos los decoradores: manager, claves y locks.
#[derive(Debug, Clone)]
pub struct CacheContext {
    pub manager: Arc<dyn CacheManager>,
    pub keys: Arc<dyn CacheKeyGenerator>,
    pub locks: Option<Arc<KeyedLocks>>,
}

impl CacheContext {
    pub fn new(manager: Arc<dyn CacheManager>, keys: Arc<dyn CacheKeyGenerator>) -> Self {
        Self { manager,
               keys,
               locks: None }
    }

    pub fn with_single_flight(mut self) -> Self {
        self.locks = Some(Arc::new(KeyedLocks::new()));
        self
    }

    pub(crate) fn region(&self, name: &str) -> Result<Region, ScriptError> {
        Ok(Region { store: self.manager.store(name)?,
                    locks: self.locks.clone() })
    }
}

#[derive(Debug)]
pub(crate) struct Region {
    store: Arc<dyn CacheStore>,
    locks: Option<Arc<KeyedLocks>>,
}

impl Region {
    pub(crate) fn cached<F>(&self, key: &str, compute: F) -> Result<Value, ScriptError>
        where F: FnOnce() -> Result<Value, ScriptError>
    {
        if let Some(hit) = self.store.get(key)? {
            debug!("cache hit in '{}' for {key}", self.store.name());
            return Ok(hit);
        }
        match &self.locks {
            Some(locks) => locks.with_lock(key, || {
                                    if let Some(hit) = self.store.get(key)? {
                                        return Ok(hit);
                                    }
                                    self.compute_and_store(key, compute)
                                }),
            None => self.compute_and_store(key, compute),
        }
    }

    fn compute_and_store<F>(&self, key: &str, compute: F) -> Result<Value, ScriptError>
        where F: FnOnce() -> Result<Value, ScriptError>
    {
        debug!("cache miss in '{}' for {key}", self.store.name());
        let value = compute()?;
        self.store.put(key, value.clone())?;
        Ok(value)
    }

    pub(crate) fn evict(&self, key: &str) -> Result<bool, ScriptError> {
        Ok(self.store.evict_if_present(key)?)
    }
}
