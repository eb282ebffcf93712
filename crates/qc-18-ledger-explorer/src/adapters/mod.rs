//! # Adapters Layer
//!
//! Adapters for qc-18 Ledger Explorer.
//!
//! ## Modules
//!
//! - `api_handler`: API Gateway integration (JSON method dispatch)
//! - `memory`: In-memory ledger index and fixed-table balance oracle
//! - `lru_cache`: Bounded in-process result cache
//! - `rpc_oracle`: JSON-RPC balance oracle over HTTP

pub mod api_handler;
pub mod lru_cache;
pub mod memory;
pub mod rpc_oracle;

pub use api_handler::{handle_api_query, ApiGatewayHandler, ApiQueryError};
pub use lru_cache::LruResultCache;
pub use memory::{InMemoryLedger, StaticBalanceOracle};
pub use rpc_oracle::JsonRpcBalanceOracle;
