use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::debug;
use py_core::{ScriptError, ScriptFileHandler};
use serde_json::Value;

use super::{CacheContext, Region};
use crate::key::CacheKeyGenerator;

/// Cachea rutas resueltas y cuerpos leídos. Escribir un fichero invalida
/// solo su cuerpo; la ruta sigue siendo válida.
#[derive(Debug)]
pub struct CachingFileHandler {
    delegate: Arc<dyn ScriptFileHandler>,
    keys: Arc<dyn CacheKeyGenerator>,
    paths: Region,
    bodies: Region,
}

impl CachingFileHandler {
    pub fn new(delegate: Arc<dyn ScriptFileHandler>, ctx: &CacheContext, paths_region: &str,
               bodies_region: &str)
               -> Result<Self, ScriptError> {
        Ok(Self { delegate,
                  keys: Arc::clone(&ctx.keys),
                  paths: ctx.region(paths_region)?,
                  bodies: ctx.region(bodies_region)? })
    }

    fn body_key(&self, path: &Path) -> Result<String, ScriptError> {
        self.keys.generate(&path.to_string_lossy(), None, None)
    }
}

fn expect_string(value: Value, key: &str) -> Result<String, ScriptError> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(ScriptError::CacheStore(format!("entry '{key}' is not a string: {other}"))),
    }
}

impl ScriptFileHandler for CachingFileHandler {
    fn is_file_reference(&self, script: &str) -> bool {
        self.delegate.is_file_reference(script)
    }

    fn resolve_path(&self, reference: &str) -> Result<PathBuf, ScriptError> {
        let key = self.keys.generate(reference, None, None)?;
        let cached = self.paths.cached(&key, || {
                                   let path = self.delegate.resolve_path(reference)?;
                                   Ok(Value::String(path.to_string_lossy().into_owned()))
                               })?;
        expect_string(cached, &key).map(PathBuf::from)
    }

    fn read_body(&self, path: &Path) -> Result<String, ScriptError> {
        let key = self.body_key(path)?;
        let cached = self.bodies
                         .cached(&key, || self.delegate.read_body(path).map(Value::String))?;
        expect_string(cached, &key)
    }

    fn write_body(&self, path: &Path, body: &str) -> Result<(), ScriptError> {
        self.delegate.write_body(path, body)?;
        let key = self.body_key(path)?;
        if self.bodies.evict(&key)? {
            debug!("evicted cached body of {}", path.display());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decorators::test_support::BrokenManager;
    use crate::key::HashKeyGenerator;
    use crate::store::InMemoryCacheManager;
    use py_core::LocalFileHandler;

    fn ctx() -> CacheContext {
        CacheContext::new(Arc::new(InMemoryCacheManager::new()), Arc::new(HashKeyGenerator::default()))
    }

    #[test]
    fn body_is_served_from_cache_until_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.py");
        std::fs::write(&path, "x = 1").unwrap();
        let files = CachingFileHandler::new(Arc::new(LocalFileHandler::new(dir.path())), &ctx(), "paths",
                                            "bodies").unwrap();

        assert_eq!(files.read_body(&path).unwrap(), "x = 1");
        std::fs::write(&path, "x = 2").unwrap();
        assert_eq!(files.read_body(&path).unwrap(), "x = 1");

        files.write_body(&path, "x = 3").unwrap();
        assert_eq!(files.read_body(&path).unwrap(), "x = 3");
    }

    #[test]
    fn resolved_paths_are_cached() {
        let dir = tempfile::tempdir().unwrap();
        let files = CachingFileHandler::new(Arc::new(LocalFileHandler::new(dir.path())), &ctx(), "paths",
                                            "bodies").unwrap();
        let first = files.resolve_path("calc.py").unwrap();
        assert_eq!(first, files.resolve_path("calc.py").unwrap());
        assert!(first.ends_with("calc.py"));
    }

    #[test]
    fn store_failure_maps_to_cache_store_error() {
        let dir = tempfile::tempdir().unwrap();
        let broken = CacheContext::new(Arc::new(BrokenManager), Arc::new(HashKeyGenerator::default()));
        let files = CachingFileHandler::new(Arc::new(LocalFileHandler::new(dir.path())), &broken, "p", "b")
            .unwrap();
        assert!(matches!(files.read_body(&dir.path().join("a.py")), Err(ScriptError::CacheStore(_))));
    }
}
