use std::sync::Arc;

use py_core::{Arguments, ResultType, ScriptError, ScriptProcessor};
use serde_json::Value;

use super::executor::result_suffix;
use super::{CacheContext, Region};
use crate::key::CacheKeyGenerator;

/// Cachea el resultado final por (script, argumentos, tipo de resultado).
#[derive(Debug)]
pub struct CachingProcessor {
    delegate: Arc<dyn ScriptProcessor>,
    keys: Arc<dyn CacheKeyGenerator>,
    region: Region,
}

impl CachingProcessor {
    pub fn new(delegate: Arc<dyn ScriptProcessor>, ctx: &CacheContext, region: &str)
               -> Result<Self, ScriptError> {
        Ok(Self { delegate,
                  keys: Arc::clone(&ctx.keys),
                  region: ctx.region(region)? })
    }
}

impl ScriptProcessor for CachingProcessor {
    fn process(&self, script: &str, result_type: Option<&ResultType>, arguments: &Arguments)
               -> Result<Option<Value>, ScriptError> {
        let suffix = result_suffix(result_type);
        let key = self.keys.generate_with_arguments(script, arguments, None, Some(&suffix))?;
        let value = self.region.cached(&key, || {
                                   Ok(self.delegate
                                          .process(script, result_type, arguments)?
                                          .unwrap_or(Value::Null))
                               })?;
        Ok(match value {
            Value::Null => None,
            body => Some(body),
        })
    }
}
