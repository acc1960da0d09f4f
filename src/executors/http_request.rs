// SPDX-License-Identifier: MIT

//! `http_request`: a leaf executor whose actual network behavior is an
//! injected collaborator (§1: "the HTTP library itself" is a named
//! non-goal; SPEC_FULL §D has this depend on an `HttpClient` trait object).

use crate::executor::{Engine, ExecutionInputs, NodeExecutor};
use crate::errors::ExecutionError;
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// What an `http_request` node needs from its HTTP collaborator.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn request(
        &self,
        method: &str,
        url: &str,
        headers: Map<String, Value>,
        body: Option<Value>,
    ) -> Result<HttpResponse, String>;
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status_code: u16,
    pub headers: Map<String, Value>,
    pub body: Value,
}

/// Returns a fixed canned response regardless of the request made.
/// Intended for tests and the CLI demo — this crate carries no real HTTP
/// client implementation.
pub struct StubHttpClient {
    status_code: u16,
    body: Value,
}

impl StubHttpClient {
    pub fn new(status_code: u16, body: Value) -> Self {
        Self { status_code, body }
    }
}

impl Default for StubHttpClient {
    fn default() -> Self {
        Self::new(200, Value::Null)
    }
}

#[async_trait]
impl HttpClient for StubHttpClient {
    async fn request(&self, _method: &str, _url: &str, _headers: Map<String, Value>, _body: Option<Value>) -> Result<HttpResponse, String> {
        Ok(HttpResponse { status_code: self.status_code, headers: Map::new(), body: self.body.clone() })
    }
}

pub struct HttpRequestExecutor {
    client: Arc<dyn HttpClient>,
}

impl HttpRequestExecutor {
    pub fn new(client: Arc<dyn HttpClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl NodeExecutor for HttpRequestExecutor {
    async fn execute(&self, inputs: &ExecutionInputs, _engine: &Engine) -> Result<Value, ExecutionError> {
        let method = inputs.config_str("method").unwrap_or("GET").to_string();
        let url = inputs
            .config_str("url")
            .ok_or_else(|| ExecutionError::Internal { message: format!("http_request node '{}' has no 'url' in config", inputs.node_id) })?
            .to_string();
        let headers = inputs.config_get("headers").and_then(Value::as_object).cloned().unwrap_or_default();
        let body = inputs.config_get("body").cloned();

        let response = self
            .client
            .request(&method, &url, headers, body)
            .await
            .map_err(|message| ExecutionError::NodeExecutionFailed { node_id: inputs.node_id.clone(), message })?;

        Ok(json!({ "status_code": response.status_code, "headers": response.headers, "body": response.body }))
    }
}
