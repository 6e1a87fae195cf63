//! Configuración de executors (deserializable, con defaults).

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_RPC_METHOD, DEFAULT_START_COMMAND, RESULT_APPEARANCE};
use crate::errors::ScriptError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutorKind {
    #[default]
    Local,
    Http,
    Rpc,
}

impl ExecutorKind {
    pub fn parse(name: &str) -> Result<Self, ScriptError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "http" | "rest" => Ok(Self::Http),
            "rpc" | "grpc" => Ok(Self::Rpc),
            other => Err(ScriptError::Config(format!("unknown executor type '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    pub kind: ExecutorKind,
    pub local: LocalExecutorConfig,
    pub http: HttpExecutorConfig,
    pub rpc: RpcExecutorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalExecutorConfig {
    pub start_command: String,
    /// Loguea cada línea de stdout.
    pub loggable: bool,
    /// Prefijo de la línea de resultado en stdout.
    pub appearance: String,
    pub timeout_ms: Option<u64>,
    pub fail_on_non_zero_exit: bool,
}

impl LocalExecutorConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

impl Default for LocalExecutorConfig {
    fn default() -> Self {
        Self { start_command: DEFAULT_START_COMMAND.to_string(),
               loggable: true,
               appearance: RESULT_APPEARANCE.to_string(),
               timeout_ms: None,
               fail_on_non_zero_exit: false }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpExecutorConfig {
    pub uri: String,
    pub token: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout_ms: Option<u64>,
}

impl HttpExecutorConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

impl Default for HttpExecutorConfig {
    fn default() -> Self {
        Self { uri: "http://127.0.0.1:8000/script".to_string(),
               token: None,
               username: None,
               password: None,
               timeout_ms: None }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RpcExecutorConfig {
    pub uri: String,
    pub method: String,
    pub token: Option<String>,
    pub timeout_ms: Option<u64>,
}

impl RpcExecutorConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

impl Default for RpcExecutorConfig {
    fn default() -> Self {
        Self { uri: "http://127.0.0.1:50051".to_string(),
               method: DEFAULT_RPC_METHOD.to_string(),
               token: None,
               timeout_ms: None }
    }
}
