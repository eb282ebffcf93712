//! # QC-18 Ledger Explorer
//!
//! Read-only query façade over the indexed ledger.
//!
//! **Subsystem ID:** 18
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! Given an address or a transaction hash, assemble a single de-normalized
//! view from several lookups against the ledger index (blocks, transactions,
//! contracts, tokens, token transfers and issuances, token balances) plus a
//! live native-balance call to a node:
//!
//! - **Address details**: is it a contract? a token? Token contracts show the
//!   activity they emitted; other addresses show their holdings and the
//!   transfers they took part in.
//! - **Transaction details**: contracts touched, and for token transactions
//!   the transfers/issuances and a representative operation. Cached; the
//!   confirmation count is recomputed on every call.
//!
//! ## Domain Rules
//!
//! | Rule | Enforcement | Location |
//! |------|-------------|----------|
//! | Contract record ⇔ contract address | `get_contract` | service/lookups.rs |
//! | Token catalog entry ⇔ token contract | `get_token` | service/lookups.rs |
//! | Transfers/issuances read as `success = true` | `Transfer::decorate` | domain/entities.rs |
//! | Storage identifiers never leave the service | `Stored::into_record` | domain/entities.rs |
//! | No receipt ⇒ success; else `gas_used < gas_limit` | `From<TransactionRecord>` | domain/entities.rs |
//!
//! ## Module Structure
//!
//! ```text
//! qc-18-ledger-explorer/
//! ├── domain/          # Records, composite views, EtherValue, errors
//! ├── ports/           # LedgerExplorerApi (inbound) + repository/oracle/cache (outbound)
//! ├── service/         # ExplorerService: lookups, address and transaction assembly
//! ├── adapters/        # API handler, in-memory ledger, LRU cache, JSON-RPC oracle
//! └── config.rs        # ExplorerConfig
//! ```

#![warn(clippy::all)]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::{
    handle_api_query, ApiGatewayHandler, ApiQueryError, InMemoryLedger, JsonRpcBalanceOracle,
    LruResultCache, StaticBalanceOracle,
};
pub use config::{ConfigError, ExplorerConfig};
pub use domain::{
    is_valid_address, is_valid_transaction_hash, AddressDetails, Balance, Block, CacheError,
    Contract, EtherValue, ExplorerError, OracleError, Receipt, RepositoryError, Stored, Token,
    TokenCatalog, Transaction, TransactionDetails, TransactionRecord, Transfer, TransferKind,
    TransferRecord, DEFAULT_LIST_LIMIT,
};
pub use ports::{
    BalanceOracle, LedgerExplorerApi, LedgerRepository, RecordQuery, ResultCache, SortDirection,
    TransferFilter,
};
pub use service::{ExplorerDependencies, ExplorerService};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
