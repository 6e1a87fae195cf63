use std::sync::Arc;

use py_core::hashing::hash_str;
use py_core::{ExecutionResponse, ResultType, ScriptError, ScriptExecutor};
use serde_json::Value;

use super::{CacheContext, Region};
use crate::key::CacheKeyGenerator;

const NO_RESULT_SUFFIX: &str = "none";
const RESULT_SUFFIX_LEN: usize = 16;

/// Cachea respuestas por (script, tipo de resultado). "Sin salida" se guarda
/// como `null` y también cuenta como hit.
#[derive(Debug)]
pub struct CachingExecutor {
    delegate: Arc<dyn ScriptExecutor>,
    keys: Arc<dyn CacheKeyGenerator>,
    region: Region,
}

impl CachingExecutor {
    pub fn new(delegate: Arc<dyn ScriptExecutor>, ctx: &CacheContext, region: &str) -> Result<Self, ScriptError> {
        Ok(Self { delegate,
                  keys: Arc::clone(&ctx.keys),
                  region: ctx.region(region)? })
    }
}

/// Sufijo de clave para un tipo de resultado: hash corto del nombre, así no
/// contiene el delimitador y dos tipos distintos no comparten sufijo.
pub(crate) fn result_suffix(result_type: Option<&ResultType>) -> String {
    match result_type {
        None => NO_RESULT_SUFFIX.to_string(),
        Some(rt) => hash_str(rt.name())[..RESULT_SUFFIX_LEN].to_string(),
    }
}

impl ScriptExecutor for CachingExecutor {
    fn execute(&self, script: &str, result_type: Option<&ResultType>) -> Result<ExecutionResponse, ScriptError> {
        let suffix = result_suffix(result_type);
        let key = self.keys.generate(script, None, Some(&suffix))?;
        let value = self.region.cached(&key, || {
                                   let response = self.delegate.execute(script, result_type)?;
                                   Ok(response.body.unwrap_or(Value::Null))
                               })?;
        Ok(match value {
            Value::Null => ExecutionResponse::empty(),
            body => ExecutionResponse::with_body(body),
        })
    }
}
