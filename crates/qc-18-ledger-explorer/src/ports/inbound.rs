//! # Inbound Ports (Driving Ports)
//!
//! Public API exposed by the Ledger Explorer subsystem.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::{
    AddressDetails, EtherValue, ExplorerError, Token, TokenCatalog, TransactionDetails, Transfer,
};

/// Primary API for the Ledger Explorer subsystem.
#[async_trait]
pub trait LedgerExplorerApi: Send + Sync {
    /// Assemble the profile of an address.
    ///
    /// ## Returns
    ///
    /// - `Ok(AddressDetails)`: balance, contract/token classification and activity
    /// - `Err(NotFound)`: the balance oracle had no answer for the address
    /// - `Err(CollaboratorUnavailable)`: repository or oracle failure
    async fn get_address_details(&self, address: &str) -> Result<AddressDetails, ExplorerError>;

    /// Assemble the profile of a transaction, served from the result cache
    /// when possible. Confirmations are always recomputed.
    ///
    /// ## Returns
    ///
    /// - `Ok(TransactionDetails)`
    /// - `Err(NotFound)`: no such transaction (and nothing cached)
    async fn get_transaction_details(&self, hash: &str)
        -> Result<TransactionDetails, ExplorerError>;

    /// Native balance of an address, in ether.
    async fn get_balance(&self, address: &str) -> Result<EtherValue, ExplorerError>;

    /// Recent transfers where the address is sender or receiver.
    async fn get_address_transfers(
        &self,
        address: &str,
        limit: usize,
    ) -> Result<Vec<Transfer>, ExplorerError>;

    /// Token catalog, busiest first. `force_refresh` reloads it.
    async fn get_tokens(&self, force_refresh: bool) -> Result<Arc<TokenCatalog>, ExplorerError>;

    /// Single token from the catalog.
    async fn get_token(&self, address: &str) -> Result<Option<Token>, ExplorerError>;

    /// Highest indexed block number, memoized.
    async fn get_last_block(&self) -> Result<Option<u64>, ExplorerError>;

    /// Reload the memoized highest block number.
    async fn refresh_last_block(&self) -> Result<Option<u64>, ExplorerError>;
}
