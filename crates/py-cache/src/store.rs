//! Stores de cache por región y su manager.
//!
//! El store en memoria usa `DashMap`, así que es seguro compartirlo entre
//! llamadas concurrentes sin lock global.

use std::fmt::Debug;
use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;

use crate::error::CacheStoreError;

pub trait CacheStore: Send + Sync + Debug {
    fn name(&self) -> &str;
    fn get(&self, key: &str) -> Result<Option<Value>, CacheStoreError>;
    fn put(&self, key: &str, value: Value) -> Result<(), CacheStoreError>;
    /// Devuelve `true` si había una entrada.
    fn evict_if_present(&self, key: &str) -> Result<bool, CacheStoreError>;
}

/// Da acceso a stores por nombre de región.
pub trait CacheManager: Send + Sync + Debug {
    fn store(&self, name: &str) -> Result<Arc<dyn CacheStore>, CacheStoreError>;
}

#[derive(Debug)]
pub struct InMemoryCacheStore {
    name: String,
    entries: DashMap<String, Value>,
}

impl InMemoryCacheStore {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(),
               entries: DashMap::new() }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CacheStore for InMemoryCacheStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self, key: &str) -> Result<Option<Value>, CacheStoreError> {
        Ok(self.entries.get(key).map(|e| e.value().clone()))
    }

    fn put(&self, key: &str, value: Value) -> Result<(), CacheStoreError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn evict_if_present(&self, key: &str) -> Result<bool, CacheStoreError> {
        Ok(self.entries.remove(key).is_some())
    }
}

/// Crea regiones bajo demanda; `strict` limita a las registradas.
#[derive(Debug, Default)]
pub struct InMemoryCacheManager {
    stores: DashMap<String, Arc<InMemoryCacheStore>>,
    strict: bool,
}

impl InMemoryCacheManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Manager que solo sirve las regiones indicadas.
    pub fn with_regions<I, S>(names: I) -> Self
        where I: IntoIterator<Item = S>,
              S: Into<String>
    {
        let stores = DashMap::new();
        for name in names {
            let name = name.into();
            stores.insert(name.clone(), Arc::new(InMemoryCacheStore::new(name)));
        }
        Self { stores, strict: true }
    }

    pub fn region(&self, name: &str) -> Option<Arc<InMemoryCacheStore>> {
        self.stores.get(name).map(|s| Arc::clone(s.value()))
    }
}

impl CacheManager for InMemoryCacheManager {
    fn store(&self, name: &str) -> Result<Arc<dyn CacheStore>, CacheStoreError> {
        if let Some(existing) = self.region(name) {
            return Ok(existing);
        }
        if self.strict {
            return Err(CacheStoreError::UnknownRegion(name.to_string()));
        }
        let created = self.stores
                          .entry(name.to_string())
                          .or_insert_with(|| Arc::new(InMemoryCacheStore::new(name)))
                          .value()
                          .clone();
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn put_get_evict() {
        let store = InMemoryCacheStore::new("r");
        assert_eq!(store.get("k").unwrap(), None);
        store.put("k", json!(1)).unwrap();
        assert_eq!(store.get("k").unwrap(), Some(json!(1)));
        assert!(store.evict_if_present("k").unwrap());
        assert!(!store.evict_if_present("k").unwrap());
    }

    #[test]
    fn manager_reuses_regions() {
        let manager = InMemoryCacheManager::new();
        let a = manager.store("a").unwrap();
        a.put("k", json!("v")).unwrap();
        assert_eq!(manager.store("a").unwrap().get("k").unwrap(), Some(json!("v")));
        assert_eq!(manager.store("b").unwrap().get("k").unwrap(), None);
    }

    #[test]
    fn strict_manager_rejects_unknown_regions() {
        let manager = InMemoryCacheManager::with_regions(["known"]);
        assert!(manager.store("known").is_ok());
        assert!(matches!(manager.store("other"), Err(CacheStoreError::UnknownRegion(_))));
    }
}
