//! # Domain Entities
//!
//! Ledger records as read from the index, and the composite views the
//! explorer assembles from them.
//!
//! Records arrive from the repository wrapped in [`Stored`], which carries the
//! storage identifier. Everything handed to a caller is the bare record.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::value_objects::EtherValue;

/// Internal identifier assigned by the ledger index.
pub type RecordId = String;

/// A record together with its storage identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stored<T> {
    /// Storage identifier. Never leaves the service.
    pub id: RecordId,
    /// Domain fields.
    pub record: T,
}

impl<T> Stored<T> {
    /// Wrap a record.
    pub fn new(id: impl Into<RecordId>, record: T) -> Self {
        Self {
            id: id.into(),
            record,
        }
    }

    /// Drop the storage identifier.
    pub fn into_record(self) -> T {
        self.record
    }
}

/// Block header fields kept by the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub number: u64,
    pub hash: String,
    pub timestamp: u64,
    pub transaction_count: u64,
}

/// Receipt fields the explorer cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub gas_used: u64,
}

/// Transaction as stored by the ingestion pipeline.
///
/// `gas` is the gas limit; it is renamed on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub hash: String,
    pub block_number: u64,
    pub from: String,
    pub to: Option<String>,
    /// Contract created by this transaction, if any.
    pub creates: Option<String>,
    pub value: String,
    pub gas: u64,
    pub gas_price: String,
    pub nonce: u64,
    pub timestamp: u64,
    pub input: String,
    /// Absent for blocks before receipts were indexed.
    pub receipt: Option<Receipt>,
}

/// Transaction as returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub hash: String,
    pub block_number: u64,
    pub from: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creates: Option<String>,
    pub value: String,
    pub gas_limit: u64,
    pub gas_used: u64,
    pub gas_price: String,
    pub nonce: u64,
    pub timestamp: u64,
    pub input: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt: Option<Receipt>,
    pub success: bool,
    /// Chain height minus `block_number`; overlaid per request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmations: Option<u64>,
}

impl From<TransactionRecord> for Transaction {
    fn from(raw: TransactionRecord) -> Self {
        let gas_limit = raw.gas;
        let gas_used = raw.receipt.map(|r| r.gas_used).unwrap_or(0);
        // Without a receipt there is no way to tell a failure apart.
        let success = match raw.receipt {
            None => true,
            Some(receipt) => receipt.gas_used < gas_limit,
        };

        Self {
            hash: raw.hash,
            block_number: raw.block_number,
            from: raw.from,
            to: raw.to,
            creates: raw.creates,
            value: raw.value,
            gas_limit,
            gas_used,
            gas_price: raw.gas_price,
            nonce: raw.nonce,
            timestamp: raw.timestamp,
            input: raw.input,
            receipt: raw.receipt,
            success,
            confirmations: None,
        }
    }
}

/// A deployed contract. Its existence is what makes an address a contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    pub address: String,
    pub creator: String,
    pub transaction_hash: String,
    pub block_number: u64,
}

/// A contract that implements a token interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub address: String,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub total_supply: String,
    pub transfers_count: u64,
}

/// Token movement as stored. Shared by the transfer and issuance sets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRecord {
    pub transaction_hash: String,
    pub block_number: u64,
    pub contract: String,
    pub from: String,
    pub to: String,
    pub value: String,
    pub timestamp: u64,
}

/// Which record set a token movement came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferKind {
    Transfer,
    Issuance,
}

/// Token movement as returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transfer {
    pub transaction_hash: String,
    pub block_number: u64,
    pub contract: String,
    pub from: String,
    pub to: String,
    pub value: String,
    pub timestamp: u64,
    /// Always true: the transaction outcome is not consulted.
    pub success: bool,
    #[serde(rename = "type")]
    pub kind: TransferKind,
}

impl Transfer {
    /// Decorate a stored movement.
    pub fn decorate(raw: TransferRecord, kind: TransferKind) -> Self {
        Self {
            transaction_hash: raw.transaction_hash,
            block_number: raw.block_number,
            contract: raw.contract,
            from: raw.from,
            to: raw.to,
            value: raw.value,
            timestamp: raw.timestamp,
            success: true,
            kind,
        }
    }
}

/// One address holding one token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Balance {
    pub address: String,
    pub contract: String,
    pub value: String,
}

/// The known token contracts, busiest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenCatalog {
    tokens: Vec<Token>,
    by_address: BTreeMap<String, usize>,
}

impl TokenCatalog {
    /// Build a catalog. Tokens are ordered by descending `transfers_count`;
    /// ties keep their input order.
    pub fn new(mut tokens: Vec<Token>) -> Self {
        tokens.sort_by(|a, b| b.transfers_count.cmp(&a.transfers_count));
        let by_address = tokens
            .iter()
            .enumerate()
            .map(|(i, t)| (t.address.clone(), i))
            .collect();
        Self { tokens, by_address }
    }

    /// Look up a token by contract address.
    pub fn get(&self, address: &str) -> Option<&Token> {
        self.by_address
            .get(address)
            .and_then(|&i| self.tokens.get(i))
    }

    /// Tokens in catalog order.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Composite profile of an address.
///
/// `is_contract`, `balance` and `transfers` are always present. Token
/// contracts get `token` and `issuances`; everything else gets `tokens` and
/// `balances`. `contract` is set for any contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressDetails {
    pub is_contract: bool,
    pub balance: EtherValue,
    pub transfers: Vec<Transfer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract: Option<Contract>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<Token>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuances: Option<Vec<Transfer>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens: Option<BTreeMap<String, Token>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balances: Option<Vec<Balance>>,
}

/// Composite profile of a transaction.
///
/// `token`, `transfers` and `issuances` are present only when the recipient
/// is a token contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDetails {
    pub tx: Transaction,
    /// Contract addresses touched: created, sender, recipient (in that order).
    pub contracts: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<Token>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transfers: Option<Vec<Transfer>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuances: Option<Vec<Transfer>>,
    /// Representative movement: first issuance, else first transfer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<Transfer>,
}

impl TransactionDetails {
    /// Pick the representative operation from the attached movements.
    pub fn select_operation(issuances: &[Transfer], transfers: &[Transfer]) -> Option<Transfer> {
        issuances.first().or_else(|| transfers.first()).cloned()
    }
}
