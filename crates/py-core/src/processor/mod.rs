//! Processor: punto de integración único (fichero → resolvers → executor).

use std::fmt::Debug;
use std::sync::Arc;

use log::debug;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::ScriptError;
use crate::executor::{ExecutionResponse, ResultType, ScriptExecutor};
use crate::file::ScriptFileHandler;
use crate::resolver::ResolverChain;
use crate::Arguments;

pub trait ScriptProcessor: Send + Sync + Debug {
    fn process(&self, script: &str, result_type: Option<&ResultType>, arguments: &Arguments)
               -> Result<Option<Value>, ScriptError>;
}

/// Acceso tipado sobre cualquier `ScriptProcessor`.
pub trait ProcessorExt: ScriptProcessor {
    fn process_as<R>(&self, script: &str, arguments: &Arguments) -> Result<Option<R>, ScriptError>
        where R: DeserializeOwned + 'static
    {
        let body = self.process(script, Some(&ResultType::of::<R>()), arguments)?;
        ExecutionResponse { body }.into_typed()
    }
}

impl<P: ScriptProcessor + ?Sized> ProcessorExt for P {}

#[derive(Debug, Clone)]
pub struct BasicProcessor {
    files: Arc<dyn ScriptFileHandler>,
    resolvers: Arc<dyn ResolverChain>,
    executor: Arc<dyn ScriptExecutor>,
}

impl BasicProcessor {
    pub fn new(files: Arc<dyn ScriptFileHandler>,
               resolvers: Arc<dyn ResolverChain>,
               executor: Arc<dyn ScriptExecutor>)
               -> Self {
        Self { files,
               resolvers,
               executor }
    }
}

impl ScriptProcessor for BasicProcessor {
    fn process(&self, script: &str, result_type: Option<&ResultType>, arguments: &Arguments)
               -> Result<Option<Value>, ScriptError> {
        let body = if self.files.is_file_reference(script) {
            debug!("loading script from file reference '{}'", script.trim());
            self.files.read_reference(script)?
        } else {
            script.to_string()
        };
        let resolved = self.resolvers.resolve_all(&body, arguments)?;
        let response = self.executor.execute(&resolved, result_type)?;
        Ok(response.body)
    }
}
