//! # API Gateway Handler
//!
//! Adapter for handling explorer queries routed from qc-16 (API Gateway).
//!
//! ## Architecture
//!
//! ```text
//! Explorer UI → qc-16 (API Gateway) → qc-18 handle_api_query → LedgerExplorerApi
//! ```
//!
//! Parameters are validated here; the service itself does not reject
//! malformed addresses or hashes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::ExplorerConfig;
use crate::domain::{is_valid_address, is_valid_transaction_hash, ExplorerError};
use crate::ports::LedgerExplorerApi;

/// Error from API query handling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiQueryError {
    pub code: i32,
    pub message: String,
}

impl ApiQueryError {
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
    pub const RESOURCE_NOT_FOUND: i32 = -32001;
    pub const RESOURCE_UNAVAILABLE: i32 = -32002;

    pub fn method_not_found(method: &str) -> Self {
        Self {
            code: Self::METHOD_NOT_FOUND,
            message: format!("Method not found: {}", method),
        }
    }

    pub fn invalid_params(msg: &str) -> Self {
        Self {
            code: Self::INVALID_PARAMS,
            message: msg.to_string(),
        }
    }

    fn internal(msg: impl Into<String>) -> Self {
        Self {
            code: Self::INTERNAL_ERROR,
            message: msg.into(),
        }
    }
}

impl std::fmt::Display for ApiQueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiQueryError {}

impl From<ExplorerError> for ApiQueryError {
    fn from(err: ExplorerError) -> Self {
        let code = match &err {
            ExplorerError::NotFound { .. } => Self::RESOURCE_NOT_FOUND,
            ExplorerError::CollaboratorUnavailable { .. } => Self::RESOURCE_UNAVAILABLE,
            ExplorerError::Misconfiguration(_)
            | ExplorerError::MalformedResponse(_)
            | ExplorerError::Serialization(_) => Self::INTERNAL_ERROR,
        };
        Self {
            code,
            message: err.to_string(),
        }
    }
}

/// API Gateway handler for qc-18.
pub struct ApiGatewayHandler<S> {
    service: S,
    config: ExplorerConfig,
}

impl<S: LedgerExplorerApi> ApiGatewayHandler<S> {
    /// Create a new API handler.
    pub fn new(service: S, config: ExplorerConfig) -> Self {
        Self { service, config }
    }

    /// Handle ping request (health check).
    pub fn handle_ping(&self) -> Value {
        serde_json::json!({
            "status": "ok",
            "subsystem": "qc-18-ledger-explorer"
        })
    }

    /// Handle get_address_details request.
    pub async fn handle_get_address_details(&self, address: &str) -> Result<Value, ApiQueryError> {
        let details = self.service.get_address_details(address).await?;
        to_json(&details)
    }

    /// Handle get_transaction_details request.
    pub async fn handle_get_transaction_details(&self, hash: &str) -> Result<Value, ApiQueryError> {
        let details = self.service.get_transaction_details(hash).await?;
        to_json(&details)
    }

    /// Handle get_balance request.
    pub async fn handle_get_balance(&self, address: &str) -> Result<Value, ApiQueryError> {
        let balance = self.service.get_balance(address).await?;
        Ok(serde_json::json!({
            "address": address,
            "balance": balance.to_string(),
        }))
    }

    /// Handle get_address_transfers request.
    pub async fn handle_get_address_transfers(
        &self,
        address: &str,
        limit: Option<usize>,
    ) -> Result<Value, ApiQueryError> {
        let limit = self.config.list_limit(limit);
        let transfers = self.service.get_address_transfers(address, limit).await?;
        to_json(&transfers)
    }

    /// Handle get_tokens request.
    pub async fn handle_get_tokens(&self, force_refresh: bool) -> Result<Value, ApiQueryError> {
        let catalog = self.service.get_tokens(force_refresh).await?;
        to_json(catalog.tokens())
    }

    /// Handle get_token request. Unknown tokens answer `null`.
    pub async fn handle_get_token(&self, address: &str) -> Result<Value, ApiQueryError> {
        let token = self.service.get_token(address).await?;
        to_json(&token)
    }

    /// Handle get_block_number request.
    pub async fn handle_get_block_number(&self, refresh: bool) -> Result<Value, ApiQueryError> {
        let number = if refresh {
            self.service.refresh_last_block().await?
        } else {
            self.service.get_last_block().await?
        };
        Ok(serde_json::json!({ "blockNumber": number }))
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<Value, ApiQueryError> {
    serde_json::to_value(value).map_err(|e| ApiQueryError::internal(e.to_string()))
}

/// Handle an API query from qc-16.
///
/// ## Supported Methods
///
/// - `ping`: Health check
/// - `get_address_details`: `{ "address" }`
/// - `get_transaction_details`: `{ "tx_hash" }`
/// - `get_balance`: `{ "address" }`
/// - `get_address_transfers`: `{ "address", "limit"? }`
/// - `get_tokens`: `{ "force_refresh"? }`
/// - `get_token`: `{ "address" }`
/// - `get_block_number`: `{ "refresh"? }`
pub async fn handle_api_query<S: LedgerExplorerApi>(
    handler: &ApiGatewayHandler<S>,
    method: &str,
    params: &Value,
) -> Result<Value, ApiQueryError> {
    match method {
        "ping" => Ok(handler.handle_ping()),
        "get_address_details" => {
            let address = parse_address_param(params, "address")?;
            handler.handle_get_address_details(address).await
        }
        "get_transaction_details" => {
            let hash = parse_hash_param(params, "tx_hash")?;
            handler.handle_get_transaction_details(hash).await
        }
        "get_balance" => {
            let address = parse_address_param(params, "address")?;
            handler.handle_get_balance(address).await
        }
        "get_address_transfers" => {
            let address = parse_address_param(params, "address")?;
            let limit = parse_limit_param(params, "limit")?;
            handler.handle_get_address_transfers(address, limit).await
        }
        "get_tokens" => {
            let force_refresh = parse_flag_param(params, "force_refresh")?;
            handler.handle_get_tokens(force_refresh).await
        }
        "get_token" => {
            let address = parse_address_param(params, "address")?;
            handler.handle_get_token(address).await
        }
        "get_block_number" => {
            let refresh = parse_flag_param(params, "refresh")?;
            handler.handle_get_block_number(refresh).await
        }
        _ => Err(ApiQueryError::method_not_found(method)),
    }
}

/// Parse a string parameter, rejecting missing and non-string values.
fn parse_str_param<'a>(params: &'a Value, name: &str) -> Result<&'a str, ApiQueryError> {
    params
        .get(name)
        .and_then(Value::as_str)
        .ok_or_else(|| ApiQueryError::invalid_params(&format!("Missing {} parameter", name)))
}

fn parse_address_param<'a>(params: &'a Value, name: &str) -> Result<&'a str, ApiQueryError> {
    let address = parse_str_param(params, name)?;
    if !is_valid_address(address) {
        return Err(ApiQueryError::invalid_params(
            "Address must be 0x followed by 40 lowercase hex digits",
        ));
    }
    Ok(address)
}

fn parse_hash_param<'a>(params: &'a Value, name: &str) -> Result<&'a str, ApiQueryError> {
    let hash = parse_str_param(params, name)?;
    if !is_valid_transaction_hash(hash) {
        return Err(ApiQueryError::invalid_params(
            "Hash must be 0x followed by 64 lowercase hex digits",
        ));
    }
    Ok(hash)
}

fn parse_limit_param(params: &Value, name: &str) -> Result<Option<usize>, ApiQueryError> {
    match params.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_u64()
            .filter(|&n| n > 0)
            .map(|n| Some(n as usize))
            .ok_or_else(|| ApiQueryError::invalid_params(&format!("{} must be a positive integer", name))),
    }
}

fn parse_flag_param(params: &Value, name: &str) -> Result<bool, ApiQueryError> {
    match params.get(name) {
        None | Some(Value::Null) => Ok(false),
        Some(value) => value
            .as_bool()
            .ok_or_else(|| ApiQueryError::invalid_params(&format!("{} must be a boolean", name))),
    }
}
