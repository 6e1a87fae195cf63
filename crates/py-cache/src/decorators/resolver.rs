use std::sync::Arc;

use py_core::{Arguments, ResolverChain, ScriptError};
use serde_json::Value;

use super::{CacheContext, Region};
use crate::key::CacheKeyGenerator;

/// Cachea el script resuelto por (script, argumentos).
#[derive(Debug)]
pub struct CachingResolverChain {
    delegate: Arc<dyn ResolverChain>,
    keys: Arc<dyn CacheKeyGenerator>,
    region: Region,
}

impl CachingResolverChain {
    pub fn new(delegate: Arc<dyn ResolverChain>, ctx: &CacheContext, region: &str) -> Result<Self, ScriptError> {
        Ok(Self { delegate,
                  keys: Arc::clone(&ctx.keys),
                  region: ctx.region(region)? })
    }
}

impl ResolverChain for CachingResolverChain {
    fn resolve_all(&self, script: &str, arguments: &Arguments) -> Result<String, ScriptError> {
        if script.trim().is_empty() {
            return Err(ScriptError::EmptyScript);
        }
        let key = self.keys.generate_with_arguments(script, arguments, None, None)?;
        match self.region
                  .cached(&key, || self.delegate.resolve_all(script, arguments).map(Value::String))?
        {
            Value::String(resolved) => Ok(resolved),
            other => Err(ScriptError::CacheStore(format!("entry '{key}' is not a string: {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::HashKeyGenerator;
    use crate::store::InMemoryCacheManager;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Default)]
    struct CountingChain {
        calls: AtomicUsize,
    }

    impl ResolverChain for CountingChain {
        fn resolve_all(&self, script: &str, _arguments: &Arguments) -> Result<String, ScriptError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("{script}#{n}"))
        }
    }

    fn caching(inner: Arc<CountingChain>) -> CachingResolverChain {
        let ctx = CacheContext::new(Arc::new(InMemoryCacheManager::new()), Arc::new(HashKeyGenerator::default()));
        CachingResolverChain::new(inner, &ctx, "py_resolver").unwrap()
    }

    #[test]
    fn second_call_is_a_hit() {
        let inner = Arc::new(CountingChain::default());
        let chain = caching(Arc::clone(&inner));
        let mut args = Arguments::new();
        args.insert("a".into(), json!(1));
        assert_eq!(chain.resolve_all("x", &args).unwrap(), "x#0");
        assert_eq!(chain.resolve_all("x", &args).unwrap(), "x#0");
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn different_arguments_miss() {
        let inner = Arc::new(CountingChain::default());
        let chain = caching(Arc::clone(&inner));
        let mut args = Arguments::new();
        args.insert("a".into(), json!(1));
        chain.resolve_all("x", &args).unwrap();
        args.insert("a".into(), json!(2));
        assert_eq!(chain.resolve_all("x", &args).unwrap(), "x#1");
    }

    #[test]
    fn blank_script_is_rejected_before_lookup() {
        let chain = caching(Arc::new(CountingChain::default()));
        assert!(matches!(chain.resolve_all("  ", &Arguments::new()), Err(ScriptError::EmptyScript)));
    }
}
