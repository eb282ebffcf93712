//! # Outbound Ports (Driven Ports)
//!
//! SPIs required by the Ledger Explorer: the ledger index, the remote
//! balance oracle, and the composite result cache.

use async_trait::async_trait;

use crate::domain::{
    Balance, Block, CacheError, Contract, OracleError, RepositoryError, Stored, Token,
    TransactionRecord, TransferRecord,
};

/// Sort direction on a record set's ordering field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Which token movements to select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferFilter {
    /// Movements emitted by one transaction.
    Transaction(String),
    /// Movements of one token contract.
    Contract(String),
    /// Movements where the address is sender or receiver.
    Participant(String),
}

/// Filter, optional sort and optional limit for a record-set query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordQuery<F> {
    pub filter: F,
    pub sort: Option<SortDirection>,
    pub limit: Option<usize>,
}

impl<F> RecordQuery<F> {
    /// Unsorted, unlimited query.
    pub fn new(filter: F) -> Self {
        Self {
            filter,
            sort: None,
            limit: None,
        }
    }

    /// Sort on the record set's ordering field.
    pub fn sorted(mut self, direction: SortDirection) -> Self {
        self.sort = Some(direction);
        self
    }

    /// Cap the number of records returned.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

impl RecordQuery<()> {
    /// Every record in the set.
    pub fn all() -> Self {
        Self::new(())
    }
}

/// Read access to the pre-built ledger index.
///
/// Ordering fields: blocks by `number`, tokens by `transfers_count`,
/// transfers and issuances by `timestamp`.
#[async_trait]
pub trait LedgerRepository: Send + Sync {
    /// Transaction by hash.
    async fn find_transaction(
        &self,
        hash: &str,
    ) -> Result<Option<Stored<TransactionRecord>>, RepositoryError>;

    /// Block records.
    async fn find_blocks(&self, query: RecordQuery<()>) -> Result<Vec<Stored<Block>>, RepositoryError>;

    /// Contract by address.
    async fn find_contract(&self, address: &str)
        -> Result<Option<Stored<Contract>>, RepositoryError>;

    /// Token records.
    async fn find_tokens(&self, query: RecordQuery<()>) -> Result<Vec<Stored<Token>>, RepositoryError>;

    /// Token transfer records.
    async fn find_transfers(
        &self,
        query: RecordQuery<TransferFilter>,
    ) -> Result<Vec<Stored<TransferRecord>>, RepositoryError>;

    /// Token issuance records.
    async fn find_issuances(
        &self,
        query: RecordQuery<TransferFilter>,
    ) -> Result<Vec<Stored<TransferRecord>>, RepositoryError>;

    /// Token holdings of an address.
    async fn find_balances(&self, address: &str) -> Result<Vec<Stored<Balance>>, RepositoryError>;
}

/// Remote node reachable over JSON-RPC.
#[async_trait]
pub trait BalanceOracle: Send + Sync {
    /// Issue one call. `Ok(Value::Null)` means the node had no answer.
    async fn call(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, OracleError>;
}

/// Key/value store for assembled composites.
#[async_trait]
pub trait ResultCache: Send + Sync {
    async fn exists(&self, key: &str) -> Result<bool, CacheError>;

    async fn load(&self, key: &str) -> Result<Option<serde_json::Value>, CacheError>;

    async fn save(&self, key: &str, value: serde_json::Value) -> Result<(), CacheError>;
}
