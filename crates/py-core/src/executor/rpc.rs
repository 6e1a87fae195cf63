//! Executor RPC: una única llamada JSON-RPC 2.0 unaria sobre HTTP.
//!
//! Request `{"jsonrpc":"2.0","id":N,"method":"SendCode","params":{"script":...}}`;
//! la respuesta trae el payload en `result` (normalmente un string con JSON).

use std::sync::atomic::{AtomicU64, Ordering};

use log::debug;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::config::RpcExecutorConfig;
use super::http::{ScriptRequest, TOKEN_HEADER};
use super::{materialize, ExecutionResponse, ResultType, ScriptExecutor};
use crate::errors::ScriptError;

const JSONRPC_VERSION: &str = "2.0";

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: ScriptRequest<'a>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcError>,
}

#[derive(Debug)]
pub struct RpcExecutor {
    config: RpcExecutorConfig,
    client: Client,
    next_id: AtomicU64,
}

impl RpcExecutor {
    pub fn new(config: RpcExecutorConfig) -> Result<Self, ScriptError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()
                            .map_err(|e| ScriptError::Config(format!("cannot build RPC client: {e}")))?;
        Ok(Self { config,
                  client,
                  next_id: AtomicU64::new(1) })
    }
}

impl ScriptExecutor for RpcExecutor {
    fn execute(&self, script: &str, result_type: Option<&ResultType>) -> Result<ExecutionResponse, ScriptError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let envelope = RpcRequest { jsonrpc: JSONRPC_VERSION,
                                    id,
                                    method: &self.config.method,
                                    params: ScriptRequest { script } };
        let mut request = self.client.post(&self.config.uri).json(&envelope);
        if let Some(token) = &self.config.token {
            request = request.header(TOKEN_HEADER, token);
        }
        let response = request.send().map_err(ScriptError::execution)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScriptError::execution(format!("rpc call failed with status code: {}", status.as_u16())));
        }
        let reply: RpcResponse = response.json().map_err(ScriptError::execution)?;
        if let Some(err) = reply.error {
            return Err(ScriptError::execution(format!("rpc error {}: {}", err.code, err.message)));
        }
        debug!("rpc call {id} to {} completed", self.config.uri);
        match reply.result {
            None | Some(Value::Null) => materialize(None, result_type),
            Some(Value::String(raw)) => materialize(Some(&raw), result_type),
            Some(other) => materialize(Some(&other.to_string()), result_type),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn executor(uri: String) -> RpcExecutor {
        RpcExecutor::new(RpcExecutorConfig { uri,
                                             token: Some("tkn".into()),
                                             ..RpcExecutorConfig::default() }).unwrap()
    }

    #[test]
    fn sends_code_and_reads_string_result() {
        let mut server = Server::new();
        let mock = server.mock("POST", "/")
                         .match_header("x-token", "tkn")
                         .match_body(Matcher::PartialJson(serde_json::json!({
                             "jsonrpc": "2.0",
                             "method": "SendCode",
                             "params": {"script": "r4java = [1, 2]"}
                         })))
                         .with_status(200)
                         .with_body(r#"{"jsonrpc":"2.0","id":1,"result":"[1, 2]"}"#)
                         .create();
        let resp = executor(server.url()).execute("r4java = [1, 2]", Some(&ResultType::of::<Vec<i32>>()))
                                         .unwrap();
        mock.assert();
        assert_eq!(resp.into_typed::<Vec<i32>>().unwrap(), Some(vec![1, 2]));
    }

    #[test]
    fn blank_result_is_no_output() {
        let mut server = Server::new();
        let _m = server.mock("POST", "/")
                       .with_status(200)
                       .with_body(r#"{"jsonrpc":"2.0","id":1,"result":""}"#)
                       .create();
        let resp = executor(server.url()).execute("x = 1", Some(&ResultType::named("json"))).unwrap();
        assert!(resp.is_empty());
    }

    #[test]
    fn rpc_error_object_is_execution_error() {
        let mut server = Server::new();
        let _m = server.mock("POST", "/")
                       .with_status(200)
                       .with_body(r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32000,"message":"Invalid credentials"}}"#)
                       .create();
        let err = executor(server.url()).execute("x = 1", None).unwrap_err();
        assert!(err.to_string().contains("Invalid credentials"));
    }

    #[test]
    fn non_success_status_is_execution_error() {
        let mut server = Server::new();
        let _m = server.mock("POST", "/").with_status(500).create();
        match executor(server.url()).execute("x = 1", None).unwrap_err() {
            ScriptError::Execution(msg) => assert!(msg.contains("500")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unreachable_endpoint_is_execution_error() {
        let port = std::net::TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
        let err = executor(format!("http://127.0.0.1:{port}")).execute("x = 1", None).unwrap_err();
        assert!(matches!(err, ScriptError::Execution(_)));
    }
}
