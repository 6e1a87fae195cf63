//! Executor HTTP: envía `{"script": ...}` a un servidor Python remoto.

use log::debug;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;

use super::config::HttpExecutorConfig;
use super::{materialize, ExecutionResponse, ResultType, ScriptExecutor};
use crate::errors::ScriptError;

pub const TOKEN_HEADER: &str = "X-Token";
pub const USERNAME_HEADER: &str = "X-Username";
pub const PASSWORD_HEADER: &str = "X-Password";

#[derive(Debug, Serialize)]
pub struct ScriptRequest<'a> {
    pub script: &'a str,
}

#[derive(Debug)]
pub struct HttpExecutor {
    config: HttpExecutorConfig,
    client: Client,
}

impl HttpExecutor {
    pub fn new(config: HttpExecutorConfig) -> Result<Self, ScriptError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()
                            .map_err(|e| ScriptError::Config(format!("cannot build HTTP client: {e}")))?;
        Ok(Self { config, client })
    }
}

impl ScriptExecutor for HttpExecutor {
    fn execute(&self, script: &str, result_type: Option<&ResultType>) -> Result<ExecutionResponse, ScriptError> {
        let mut request = self.client
                              .post(&self.config.uri)
                              .header(CONTENT_TYPE, "application/json")
                              .json(&ScriptRequest { script });
        if let Some(token) = &self.config.token {
            request = request.header(TOKEN_HEADER, token);
        }
        if let Some(username) = &self.config.username {
            request = request.header(USERNAME_HEADER, username);
        }
        if let Some(password) = &self.config.password {
            request = request.header(PASSWORD_HEADER, password);
        }

        let response = request.send().map_err(ScriptError::execution)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScriptError::execution(format!("request failed with status code: {}", status.as_u16())));
        }
        let body = response.text().map_err(ScriptError::execution)?;
        debug!("http executor got {} bytes from {}", body.len(), self.config.uri);
        materialize(Some(&body), result_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn executor(uri: String) -> HttpExecutor {
        HttpExecutor::new(HttpExecutorConfig { uri,
                                               token: Some("secret".into()),
                                               username: Some("user".into()),
                                               password: Some("pass".into()),
                                               timeout_ms: Some(5_000) }).unwrap()
    }

    #[test]
    fn posts_script_with_headers() {
        let mut server = Server::new();
        let mock = server.mock("POST", "/script")
                         .match_header("content-type", "application/json")
                         .match_header("x-token", "secret")
                         .match_header("x-username", "user")
                         .match_header("x-password", "pass")
                         .match_body(Matcher::Json(serde_json::json!({"script": "r4java = 4"})))
                         .with_status(200)
                         .with_body("4")
                         .create();
        let resp = executor(format!("{}/script", server.url())).execute("r4java = 4", Some(&ResultType::of::<i64>()))
                                                                .unwrap();
        mock.assert();
        assert_eq!(resp.into_typed::<i64>().unwrap(), Some(4));
    }

    #[test]
    fn empty_string_body_is_no_output() {
        let mut server = Server::new();
        let _m = server.mock("POST", "/script").with_status(200).with_body("\"\"").create();
        let resp = executor(format!("{}/script", server.url())).execute("x = 1", Some(&ResultType::named("json")))
                                                                .unwrap();
        assert!(resp.is_empty());
    }

    #[test]
    fn non_success_status_is_execution_error() {
        let mut server = Server::new();
        let _m = server.mock("POST", "/script").with_status(401).create();
        let err = executor(format!("{}/script", server.url())).execute("x = 1", None).unwrap_err();
        assert!(err.to_string().contains("401"));
    }

    #[test]
    fn unreachable_endpoint_is_execution_error() {
        let port = std::net::TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
        let err = executor(format!("http://127.0.0.1:{port}/script")).execute("x = 1", None).unwrap_err();
        assert!(matches!(err, ScriptError::Execution(_)));
    }
}
