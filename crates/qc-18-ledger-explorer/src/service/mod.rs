//! # Ledger Explorer Service
//!
//! The main service implementing the Ledger Explorer API.
//!
//! ## Architecture
//!
//! This service:
//! 1. Exposes typed lookup primitives over the ledger index (`lookups`)
//! 2. Assembles address profiles (`address`)
//! 3. Assembles and caches transaction profiles (`transaction`)
//! 4. Uses dependency injection for the repository, oracle and cache
//!
//! The token catalog and the highest block number are memoized per service
//! instance. Neither is refreshed implicitly: use `get_tokens(true)` and
//! `refresh_last_block()`.

mod address;
mod lookups;
#[cfg(test)]
mod tests;
mod transaction;

use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;

use crate::config::ExplorerConfig;
use crate::domain::{
    AddressDetails, EtherValue, ExplorerError, Token, TokenCatalog, TransactionDetails, Transfer,
};
use crate::ports::inbound::LedgerExplorerApi;
use crate::ports::outbound::{BalanceOracle, LedgerRepository, ResultCache};

/// The Ledger Explorer Service.
pub struct ExplorerService<R, O, C>
where
    R: LedgerRepository,
    O: BalanceOracle,
    C: ResultCache,
{
    /// Pre-built ledger index.
    pub(crate) repository: Arc<R>,
    /// Remote node answering balance queries.
    pub(crate) oracle: Arc<O>,
    /// Store for assembled transaction composites.
    pub(crate) cache: Arc<C>,
    /// Service configuration.
    pub(crate) config: ExplorerConfig,
    /// Memoized highest block number.
    pub(crate) last_block: RwLock<Option<u64>>,
    /// Memoized token catalog.
    pub(crate) token_catalog: RwLock<Option<Arc<TokenCatalog>>>,
}

/// Dependencies for ExplorerService
pub struct ExplorerDependencies<R, O, C> {
    pub repository: Arc<R>,
    pub oracle: Arc<O>,
    pub cache: Arc<C>,
}

impl<R, O, C> ExplorerService<R, O, C>
where
    R: LedgerRepository,
    O: BalanceOracle,
    C: ResultCache,
{
    /// Create a new service. Fails fast on invalid configuration.
    pub fn new(
        config: ExplorerConfig,
        deps: ExplorerDependencies<R, O, C>,
    ) -> Result<Self, ExplorerError> {
        config.validate()?;

        Ok(Self {
            repository: deps.repository,
            oracle: deps.oracle,
            cache: deps.cache,
            config,
            last_block: RwLock::new(None),
            token_catalog: RwLock::new(None),
        })
    }

    /// Service configuration.
    pub fn config(&self) -> &ExplorerConfig {
        &self.config
    }
}

#[async_trait]
impl<R, O, C> LedgerExplorerApi for ExplorerService<R, O, C>
where
    R: LedgerRepository + 'static,
    O: BalanceOracle + 'static,
    C: ResultCache + 'static,
{
    async fn get_address_details(&self, address: &str) -> Result<AddressDetails, ExplorerError> {
        ExplorerService::get_address_details(self, address).await
    }

    async fn get_transaction_details(
        &self,
        hash: &str,
    ) -> Result<TransactionDetails, ExplorerError> {
        ExplorerService::get_transaction_details(self, hash).await
    }

    async fn get_balance(&self, address: &str) -> Result<EtherValue, ExplorerError> {
        ExplorerService::get_balance(self, address).await
    }

    async fn get_address_transfers(
        &self,
        address: &str,
        limit: usize,
    ) -> Result<Vec<Transfer>, ExplorerError> {
        ExplorerService::get_address_transfers(self, address, limit).await
    }

    async fn get_tokens(&self, force_refresh: bool) -> Result<Arc<TokenCatalog>, ExplorerError> {
        ExplorerService::get_tokens(self, force_refresh).await
    }

    async fn get_token(&self, address: &str) -> Result<Option<Token>, ExplorerError> {
        ExplorerService::get_token(self, address).await
    }

    async fn get_last_block(&self) -> Result<Option<u64>, ExplorerError> {
        ExplorerService::get_last_block(self).await
    }

    async fn refresh_last_block(&self) -> Result<Option<u64>, ExplorerError> {
        ExplorerService::refresh_last_block(self).await
    }
}
