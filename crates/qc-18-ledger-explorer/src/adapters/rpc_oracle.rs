//! JSON-RPC balance oracle over HTTP.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

use crate::config::ExplorerConfig;
use crate::domain::{ExplorerError, OracleError};
use crate::ports::outbound::BalanceOracle;

/// JSON-RPC request structure.
#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    method: &'a str,
    params: Value,
    id: u64,
}

/// JSON-RPC response structure.
#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcError>,
}

/// JSON-RPC error structure.
#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

impl JsonRpcResponse {
    fn into_result(self) -> Result<Value, OracleError> {
        if let Some(error) = self.error {
            return Err(OracleError::Rpc {
                code: error.code,
                message: error.message,
            });
        }
        Ok(self.result.unwrap_or(Value::Null))
    }
}

/// Balance oracle talking to a node's JSON-RPC endpoint.
pub struct JsonRpcBalanceOracle {
    http_client: reqwest::Client,
    rpc_url: String,
    request_id: AtomicU64,
}

impl JsonRpcBalanceOracle {
    /// Create a client for `config.rpc_url` with the configured timeout.
    pub fn new(config: &ExplorerConfig) -> Result<Self, ExplorerError> {
        config.validate()?;

        let http_client = reqwest::Client::builder()
            .timeout(config.rpc_timeout())
            .build()
            .map_err(|e| ExplorerError::Misconfiguration(format!("HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            rpc_url: config.rpc_url.clone(),
            request_id: AtomicU64::new(1),
        })
    }

    /// Endpoint this oracle talks to.
    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }
}

#[async_trait]
impl BalanceOracle for JsonRpcBalanceOracle {
    async fn call(&self, method: &str, params: Value) -> Result<Value, OracleError> {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id,
        };

        debug!(id, method, "sending RPC request");

        let response = self
            .http_client
            .post(&self.rpc_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| OracleError::Transport(format!("Failed to send RPC request: {}", e)))?;

        let rpc_response: JsonRpcResponse = response
            .json()
            .await
            .map_err(|e| OracleError::Transport(format!("Failed to parse RPC response: {}", e)))?;

        rpc_response.into_result()
    }
}
