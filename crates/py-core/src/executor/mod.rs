//! Executors: ejecutan un script ya resuelto en un backend y devuelven el
//! payload de resultado como JSON.
//!
//! Los tres backends (proceso local, HTTP y RPC) comparten la misma regla de
//! materialización (`materialize`) para que el caller no tenga que distinguir
//! entre ellos.

pub mod config;
pub mod http;
pub mod local;
pub mod rpc;

use std::fmt::{self, Debug, Display};

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::ScriptError;

pub use config::{ExecutorConfig, ExecutorKind, HttpExecutorConfig, LocalExecutorConfig, RpcExecutorConfig};
pub use http::HttpExecutor;
pub use local::LocalProcessExecutor;
pub use rpc::RpcExecutor;

/// Descriptor del tipo de resultado pedido. Forma parte de las claves de
/// cache, por eso se identifica por nombre.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResultType {
    name: String,
}

impl ResultType {
    pub fn of<R: ?Sized + 'static>() -> Self {
        Self { name: std::any::type_name::<R>().to_string() }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Display for ResultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Respuesta de un executor. `body == None` significa "sin salida".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionResponse {
    pub body: Option<Value>,
}

impl ExecutionResponse {
    pub fn empty() -> Self {
        Self { body: None }
    }

    pub fn with_body(body: Value) -> Self {
        Self { body: Some(body) }
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_none()
    }

    /// Deserializa el cuerpo al tipo pedido.
    pub fn into_typed<R: DeserializeOwned>(self) -> Result<Option<R>, ScriptError> {
        match self.body {
            None => Ok(None),
            Some(v) => serde_json::from_value(v).map(Some)
                                                .map_err(|e| ScriptError::execution(format!("cannot decode result: {e}"))),
        }
    }
}

pub trait ScriptExecutor: Send + Sync + Debug {
    fn execute(&self, script: &str, result_type: Option<&ResultType>) -> Result<ExecutionResponse, ScriptError>;
}

/// Literal que los servidores devuelven cuando no hay resultado.
pub const EMPTY_BODY: &str = "\"\"";

/// Convierte el payload crudo de un backend en `ExecutionResponse`.
///
/// Sin tipo pedido, payload ausente, en blanco, `""` o `null` ⇒ sin salida.
/// En otro caso el payload debe ser JSON válido.
pub fn materialize(raw: Option<&str>, result_type: Option<&ResultType>) -> Result<ExecutionResponse, ScriptError> {
    let Some(result_type) = result_type else {
        return Ok(ExecutionResponse::empty());
    };
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty() && *r != EMPTY_BODY) else {
        return Ok(ExecutionResponse::empty());
    };
    let value: Value =
        serde_json::from_str(raw).map_err(|e| ScriptError::execution(format!("invalid JSON for '{result_type}': {e}")))?;
    if value.is_null() {
        return Ok(ExecutionResponse::empty());
    }
    Ok(ExecutionResponse::with_body(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn no_result_type_means_no_output() {
        assert!(materialize(Some("4"), None).unwrap().is_empty());
    }

    #[test]
    fn blank_and_empty_literal_mean_no_output() {
        let rt = ResultType::of::<String>();
        assert!(materialize(None, Some(&rt)).unwrap().is_empty());
        assert!(materialize(Some("  \n"), Some(&rt)).unwrap().is_empty());
        assert!(materialize(Some("\"\""), Some(&rt)).unwrap().is_empty());
        assert!(materialize(Some("null"), Some(&rt)).unwrap().is_empty());
    }

    #[test]
    fn json_payload_is_parsed() {
        let rt = ResultType::of::<i64>();
        let resp = materialize(Some("4\n"), Some(&rt)).unwrap();
        assert_eq!(resp.body, Some(json!(4)));
        assert_eq!(resp.into_typed::<i64>().unwrap(), Some(4));
    }

    #[test]
    fn invalid_json_is_execution_error() {
        let rt = ResultType::named("json");
        assert!(matches!(materialize(Some("not json"), Some(&rt)), Err(ScriptError::Execution(_))));
    }

    #[test]
    fn typed_decode_mismatch_is_execution_error() {
        let resp = ExecutionResponse::with_body(json!("text"));
        assert!(matches!(resp.into_typed::<i64>(), Err(ScriptError::Execution(_))));
    }

    #[test]
    fn result_type_names() {
        assert_eq!(ResultType::of::<i64>().name(), "i64");
        assert_eq!(ResultType::named("json").to_string(), "json");
    }
}
