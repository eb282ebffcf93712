//! Lookup primitives: one repository or oracle round trip each.

use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use super::ExplorerService;
use crate::domain::{
    Balance, Contract, EtherValue, ExplorerError, Stored, Token, TokenCatalog, Transaction,
    Transfer, TransferKind, TransferRecord,
};
use crate::ports::outbound::{
    BalanceOracle, LedgerRepository, RecordQuery, ResultCache, SortDirection, TransferFilter,
};

fn decorate(records: Vec<Stored<TransferRecord>>, kind: TransferKind) -> Vec<Transfer> {
    records
        .into_iter()
        .map(|stored| Transfer::decorate(stored.into_record(), kind))
        .collect()
}

fn recent(filter: TransferFilter, limit: usize) -> RecordQuery<TransferFilter> {
    RecordQuery::new(filter)
        .sorted(SortDirection::Descending)
        .limit(limit)
}

impl<R, O, C> ExplorerService<R, O, C>
where
    R: LedgerRepository,
    O: BalanceOracle,
    C: ResultCache,
{
    /// Transaction by hash, with `gas_limit`, `gas_used` and `success` derived.
    #[instrument(skip(self))]
    pub async fn get_transaction(&self, hash: &str) -> Result<Option<Transaction>, ExplorerError> {
        let stored = self.repository.find_transaction(hash).await?;
        Ok(stored.map(|s| Transaction::from(s.into_record())))
    }

    /// Transfers emitted by a transaction.
    pub async fn get_transfers(&self, tx_hash: &str) -> Result<Vec<Transfer>, ExplorerError> {
        let query = RecordQuery::new(TransferFilter::Transaction(tx_hash.to_string()));
        let records = self.repository.find_transfers(query).await?;
        Ok(decorate(records, TransferKind::Transfer))
    }

    /// Issuances emitted by a transaction.
    pub async fn get_issuances(&self, tx_hash: &str) -> Result<Vec<Transfer>, ExplorerError> {
        let query = RecordQuery::new(TransferFilter::Transaction(tx_hash.to_string()));
        let records = self.repository.find_issuances(query).await?;
        Ok(decorate(records, TransferKind::Issuance))
    }

    pub async fn get_contract(&self, address: &str) -> Result<Option<Contract>, ExplorerError> {
        let stored = self.repository.find_contract(address).await?;
        Ok(stored.map(Stored::into_record))
    }

    /// Token catalog, busiest first.
    ///
    /// Loaded once and reused until `force_refresh` is set.
    #[instrument(skip(self))]
    pub async fn get_tokens(&self, force_refresh: bool) -> Result<Arc<TokenCatalog>, ExplorerError> {
        if !force_refresh {
            let memo = self.token_catalog.read().clone();
            if let Some(catalog) = memo {
                return Ok(catalog);
            }
        }

        let query = RecordQuery::all().sorted(SortDirection::Descending);
        let records = self.repository.find_tokens(query).await?;
        let catalog = Arc::new(TokenCatalog::new(
            records.into_iter().map(Stored::into_record).collect(),
        ));

        debug!(tokens = catalog.len(), "token catalog loaded");
        *self.token_catalog.write() = Some(Arc::clone(&catalog));
        Ok(catalog)
    }

    /// Token by contract address. Always answered from the catalog.
    pub async fn get_token(&self, address: &str) -> Result<Option<Token>, ExplorerError> {
        let catalog = self.get_tokens(false).await?;
        Ok(catalog.get(address).cloned())
    }

    /// Token holdings of an address, in no particular order.
    pub async fn get_address_balances(&self, address: &str) -> Result<Vec<Balance>, ExplorerError> {
        let records = self.repository.find_balances(address).await?;
        Ok(records.into_iter().map(Stored::into_record).collect())
    }

    /// Newest transfers where `address` is sender or receiver.
    pub async fn get_address_transfers(
        &self,
        address: &str,
        limit: usize,
    ) -> Result<Vec<Transfer>, ExplorerError> {
        let query = recent(TransferFilter::Participant(address.to_string()), limit);
        let records = self.repository.find_transfers(query).await?;
        Ok(decorate(records, TransferKind::Transfer))
    }

    /// Newest transfers of a token contract.
    pub async fn get_contract_transfers(
        &self,
        address: &str,
        limit: usize,
    ) -> Result<Vec<Transfer>, ExplorerError> {
        let query = recent(TransferFilter::Contract(address.to_string()), limit);
        let records = self.repository.find_transfers(query).await?;
        Ok(decorate(records, TransferKind::Transfer))
    }

    /// Newest issuances of a token contract.
    pub async fn get_contract_issuances(
        &self,
        address: &str,
        limit: usize,
    ) -> Result<Vec<Transfer>, ExplorerError> {
        let query = recent(TransferFilter::Contract(address.to_string()), limit);
        let records = self.repository.find_issuances(query).await?;
        Ok(decorate(records, TransferKind::Issuance))
    }

    /// Highest indexed block number.
    ///
    /// Memoized on first success; later calls may lag the chain until
    /// [`refresh_last_block`](Self::refresh_last_block) is called.
    pub async fn get_last_block(&self) -> Result<Option<u64>, ExplorerError> {
        let memo = *self.last_block.read();
        if memo.is_some() {
            return Ok(memo);
        }
        self.refresh_last_block().await
    }

    /// Reload the highest indexed block number.
    #[instrument(skip(self))]
    pub async fn refresh_last_block(&self) -> Result<Option<u64>, ExplorerError> {
        let query = RecordQuery::all().sorted(SortDirection::Descending).limit(1);
        let blocks = self.repository.find_blocks(query).await?;
        let number = blocks.into_iter().map(|b| b.record.number).max();

        match number {
            Some(n) => {
                debug!(last_block = n, "last block loaded");
                *self.last_block.write() = Some(n);
            }
            None => debug!("ledger index has no blocks"),
        }
        Ok(number)
    }

    /// Native balance of `address` from the remote node, in ether.
    ///
    /// A node that answers `null` yields `NotFound`; a node that cannot be
    /// reached yields `CollaboratorUnavailable`. Neither becomes zero.
    #[instrument(skip(self))]
    pub async fn get_balance(&self, address: &str) -> Result<EtherValue, ExplorerError> {
        let result = self
            .oracle
            .call("eth_getBalance", json!([address, "latest"]))
            .await
            .map_err(|e| {
                warn!("balance oracle failed for {}: {}", address, e);
                ExplorerError::from(e)
            })?;

        match result {
            Value::String(quantity) => EtherValue::from_hex_quantity(&quantity),
            Value::Null => Err(ExplorerError::not_found("balance", address)),
            other => Err(ExplorerError::MalformedResponse(other.to_string())),
        }
    }
}
