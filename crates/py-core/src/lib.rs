//! py-core: preparación y ejecución de scripts Python.
//!
//! Un script (texto literal o referencia a fichero) pasa por una cadena de
//! resolvers que lo reescriben, luego por un executor que lo ejecuta en un
//! backend (proceso local, HTTP o RPC) y devuelve el resultado como JSON.
pub mod constants;
pub mod errors;
pub mod executor;
pub mod file;
pub mod fragment;
pub mod hashing;
pub mod processor;
pub mod resolver;
pub mod trigger;

use std::collections::HashMap;

/// Argumentos nombrados de una llamada. Solo lectura durante la resolución.
pub type Arguments = HashMap<String, serde_json::Value>;

pub use errors::ScriptError;
pub use executor::{ExecutionResponse, ExecutorConfig, ExecutorKind, HttpExecutor, LocalProcessExecutor, ResultType,
                   RpcExecutor, ScriptExecutor};
pub use file::{LocalFileHandler, ScriptFileHandler};
pub use processor::{BasicProcessor, ProcessorExt, ScriptProcessor};
pub use resolver::{ArgumentPathEvaluator, DeclaredResolver, ExpressionEvaluator, OrderedResolverChain,
                   ResolverChain, ResolverConfig, ScriptResolver};
pub use trigger::{ExtractorChain, MetadataExtractor, ProfileGate, TriggerEvaluator, TriggerMetadata};
