//! # In-Memory Adapters
//!
//! `InMemoryLedger` implements [`LedgerRepository`] over plain vectors and is
//! what the tests and local tooling run against. `StaticBalanceOracle`
//! answers `eth_getBalance` from a fixed table.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::domain::{
    Balance, Block, Contract, OracleError, RepositoryError, Stored, Token, TransactionRecord,
    TransferRecord,
};
use crate::ports::outbound::{
    BalanceOracle, LedgerRepository, RecordQuery, SortDirection, TransferFilter,
};

#[derive(Default)]
struct LedgerData {
    transactions: Vec<Stored<TransactionRecord>>,
    blocks: Vec<Stored<Block>>,
    contracts: Vec<Stored<Contract>>,
    tokens: Vec<Stored<Token>>,
    transfers: Vec<Stored<TransferRecord>>,
    issuances: Vec<Stored<TransferRecord>>,
    balances: Vec<Stored<Balance>>,
}

/// Ledger index held in memory.
#[derive(Default)]
pub struct InMemoryLedger {
    data: RwLock<LedgerData>,
    next_id: AtomicU64,
    /// When set, every query fails with a connection error.
    offline: RwLock<bool>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn stored<T>(&self, record: T) -> Stored<T> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        Stored::new(format!("{:024x}", id), record)
    }

    pub fn insert_transaction(&self, record: TransactionRecord) {
        let stored = self.stored(record);
        self.data.write().transactions.push(stored);
    }

    pub fn insert_block(&self, record: Block) {
        let stored = self.stored(record);
        self.data.write().blocks.push(stored);
    }

    pub fn insert_contract(&self, record: Contract) {
        let stored = self.stored(record);
        self.data.write().contracts.push(stored);
    }

    pub fn insert_token(&self, record: Token) {
        let stored = self.stored(record);
        self.data.write().tokens.push(stored);
    }

    pub fn insert_transfer(&self, record: TransferRecord) {
        let stored = self.stored(record);
        self.data.write().transfers.push(stored);
    }

    pub fn insert_issuance(&self, record: TransferRecord) {
        let stored = self.stored(record);
        self.data.write().issuances.push(stored);
    }

    pub fn insert_balance(&self, record: Balance) {
        let stored = self.stored(record);
        self.data.write().balances.push(stored);
    }

    /// Simulate losing the connection to the index.
    pub fn set_offline(&self, offline: bool) {
        *self.offline.write() = offline;
    }

    fn check_online(&self) -> Result<(), RepositoryError> {
        if *self.offline.read() {
            return Err(RepositoryError::Connection(
                "in-memory ledger is offline".to_string(),
            ));
        }
        Ok(())
    }
}

/// Sort by `key` in the query's direction, then apply the limit.
fn apply_query<T, F, K>(mut records: Vec<Stored<T>>, query: &RecordQuery<F>, key: K) -> Vec<Stored<T>>
where
    K: Fn(&T) -> u64,
{
    match query.sort {
        Some(SortDirection::Ascending) => records.sort_by_key(|s| key(&s.record)),
        Some(SortDirection::Descending) => {
            records.sort_by(|a, b| key(&b.record).cmp(&key(&a.record)))
        }
        None => {}
    }
    if let Some(limit) = query.limit {
        records.truncate(limit);
    }
    records
}

fn matches_transfer(filter: &TransferFilter, record: &TransferRecord) -> bool {
    match filter {
        TransferFilter::Transaction(hash) => &record.transaction_hash == hash,
        TransferFilter::Contract(address) => &record.contract == address,
        TransferFilter::Participant(address) => &record.from == address || &record.to == address,
    }
}

fn select_transfers(
    records: &[Stored<TransferRecord>],
    query: &RecordQuery<TransferFilter>,
) -> Vec<Stored<TransferRecord>> {
    let selected = records
        .iter()
        .filter(|s| matches_transfer(&query.filter, &s.record))
        .cloned()
        .collect();
    apply_query(selected, query, |r| r.timestamp)
}

#[async_trait]
impl LedgerRepository for InMemoryLedger {
    async fn find_transaction(
        &self,
        hash: &str,
    ) -> Result<Option<Stored<TransactionRecord>>, RepositoryError> {
        self.check_online()?;
        let data = self.data.read();
        Ok(data
            .transactions
            .iter()
            .find(|s| s.record.hash == hash)
            .cloned())
    }

    async fn find_blocks(&self, query: RecordQuery<()>) -> Result<Vec<Stored<Block>>, RepositoryError> {
        self.check_online()?;
        let blocks = self.data.read().blocks.clone();
        Ok(apply_query(blocks, &query, |b| b.number))
    }

    async fn find_contract(
        &self,
        address: &str,
    ) -> Result<Option<Stored<Contract>>, RepositoryError> {
        self.check_online()?;
        let data = self.data.read();
        Ok(data
            .contracts
            .iter()
            .find(|s| s.record.address == address)
            .cloned())
    }

    async fn find_tokens(&self, query: RecordQuery<()>) -> Result<Vec<Stored<Token>>, RepositoryError> {
        self.check_online()?;
        let tokens = self.data.read().tokens.clone();
        Ok(apply_query(tokens, &query, |t| t.transfers_count))
    }

    async fn find_transfers(
        &self,
        query: RecordQuery<TransferFilter>,
    ) -> Result<Vec<Stored<TransferRecord>>, RepositoryError> {
        self.check_online()?;
        let data = self.data.read();
        Ok(select_transfers(&data.transfers, &query))
    }

    async fn find_issuances(
        &self,
        query: RecordQuery<TransferFilter>,
    ) -> Result<Vec<Stored<TransferRecord>>, RepositoryError> {
        self.check_online()?;
        let data = self.data.read();
        Ok(select_transfers(&data.issuances, &query))
    }

    async fn find_balances(&self, address: &str) -> Result<Vec<Stored<Balance>>, RepositoryError> {
        self.check_online()?;
        let data = self.data.read();
        Ok(data
            .balances
            .iter()
            .filter(|s| s.record.address == address)
            .cloned()
            .collect())
    }
}

/// Balance oracle answering from a fixed table of hex quantities.
///
/// Unknown addresses answer `null`, like a node with no state for them.
#[derive(Default)]
pub struct StaticBalanceOracle {
    balances: RwLock<HashMap<String, String>>,
    /// When set, every call fails with a transport error.
    unreachable: RwLock<bool>,
}

impl StaticBalanceOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the balance of `address` as a hex wei quantity.
    pub fn set_balance(&self, address: impl Into<String>, hex_quantity: impl Into<String>) {
        self.balances
            .write()
            .insert(address.into(), hex_quantity.into());
    }

    /// Simulate losing the connection to the node.
    pub fn set_unreachable(&self, unreachable: bool) {
        *self.unreachable.write() = unreachable;
    }
}

#[async_trait]
impl BalanceOracle for StaticBalanceOracle {
    async fn call(&self, method: &str, params: Value) -> Result<Value, OracleError> {
        if *self.unreachable.read() {
            return Err(OracleError::Transport("connection refused".to_string()));
        }
        if method != "eth_getBalance" {
            return Err(OracleError::Rpc {
                code: -32601,
                message: format!("Method not found: {}", method),
            });
        }

        let address = params
            .get(0)
            .and_then(Value::as_str)
            .ok_or_else(|| OracleError::Rpc {
                code: -32602,
                message: "missing address".to_string(),
            })?;

        Ok(self
            .balances
            .read()
            .get(address)
            .cloned()
            .map(Value::String)
            .unwrap_or(Value::Null))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transfer(contract: &str, from: &str, to: &str, timestamp: u64) -> TransferRecord {
        TransferRecord {
            transaction_hash: format!("0x{:064x}", timestamp),
            block_number: timestamp,
            contract: contract.into(),
            from: from.into(),
            to: to.into(),
            value: "1".into(),
            timestamp,
        }
    }

    #[tokio::test]
    async fn test_participant_filter_sort_and_limit() {
        let ledger = InMemoryLedger::new();
        ledger.insert_transfer(transfer("0xc1", "0xaa", "0xbb", 10));
        ledger.insert_transfer(transfer("0xc1", "0xbb", "0xaa", 30));
        ledger.insert_transfer(transfer("0xc2", "0xcc", "0xdd", 40));
        ledger.insert_transfer(transfer("0xc2", "0xaa", "0xdd", 20));

        let query = RecordQuery::new(TransferFilter::Participant("0xaa".into()))
            .sorted(SortDirection::Descending)
            .limit(2);
        let found = ledger.find_transfers(query).await.unwrap();

        let stamps: Vec<_> = found.iter().map(|s| s.record.timestamp).collect();
        assert_eq!(stamps, vec![30, 20]);
    }

    #[tokio::test]
    async fn test_records_get_distinct_ids() {
        let ledger = InMemoryLedger::new();
        ledger.insert_issuance(transfer("0xc1", "0x00", "0xaa", 1));
        ledger.insert_issuance(transfer("0xc1", "0x00", "0xbb", 2));

        let found = ledger
            .find_issuances(RecordQuery::new(TransferFilter::Contract("0xc1".into())))
            .await
            .unwrap();
        assert_eq!(found.len(), 2);
        assert_ne!(found[0].id, found[1].id);
    }

    #[tokio::test]
    async fn test_offline_ledger_fails() {
        let ledger = InMemoryLedger::new();
        ledger.set_offline(true);
        assert!(matches!(
            ledger.find_contract("0xaa").await,
            Err(RepositoryError::Connection(_))
        ));
    }

    #[tokio::test]
    async fn test_static_oracle() {
        let oracle = StaticBalanceOracle::new();
        oracle.set_balance("0xaa", "0x10");

        let known = oracle
            .call("eth_getBalance", serde_json::json!(["0xaa", "latest"]))
            .await
            .unwrap();
        assert_eq!(known, Value::String("0x10".into()));

        let unknown = oracle
            .call("eth_getBalance", serde_json::json!(["0xbb", "latest"]))
            .await
            .unwrap();
        assert!(unknown.is_null());

        oracle.set_unreachable(true);
        assert!(oracle
            .call("eth_getBalance", serde_json::json!(["0xaa", "latest"]))
            .await
            .is_err());
    }
}
