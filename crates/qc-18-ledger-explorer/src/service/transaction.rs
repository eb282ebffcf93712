//! Transaction profile assembly, backed by the result cache.

use tracing::{debug, instrument};

use super::ExplorerService;
use crate::domain::{transaction_cache_key, ExplorerError, TransactionDetails};
use crate::ports::outbound::{BalanceOracle, LedgerRepository, ResultCache};

impl<R, O, C> ExplorerService<R, O, C>
where
    R: LedgerRepository,
    O: BalanceOracle,
    C: ResultCache,
{
    /// Assemble the profile of a transaction.
    ///
    /// A cached composite is returned as-is; it is never re-validated or
    /// expired. On a miss the composite is built and saved unconditionally.
    /// Confirmations are not cached: they are overlaid from the current last
    /// block on every call.
    #[instrument(skip(self))]
    pub async fn get_transaction_details(
        &self,
        hash: &str,
    ) -> Result<TransactionDetails, ExplorerError> {
        let key = transaction_cache_key(hash);

        let mut details = match self.load_cached_details(&key).await? {
            Some(cached) => {
                debug!("cache hit for {}", key);
                cached
            }
            None => {
                debug!("cache miss for {}", key);
                let built = self.build_transaction_details(hash).await?;
                self.cache.save(&key, serde_json::to_value(&built)?).await?;
                built
            }
        };

        if let Some(last_block) = self.get_last_block().await? {
            details.tx.confirmations = Some(last_block.saturating_sub(details.tx.block_number));
        }

        Ok(details)
    }

    async fn load_cached_details(
        &self,
        key: &str,
    ) -> Result<Option<TransactionDetails>, ExplorerError> {
        if !self.cache.exists(key).await? {
            return Ok(None);
        }

        // An entry can be evicted between exists and load.
        match self.cache.load(key).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    async fn build_transaction_details(
        &self,
        hash: &str,
    ) -> Result<TransactionDetails, ExplorerError> {
        let tx = self
            .get_transaction(hash)
            .await?
            .ok_or_else(|| ExplorerError::not_found("transaction", hash))?;

        let mut contracts = Vec::new();
        if let Some(created) = &tx.creates {
            contracts.push(created.clone());
        }
        if self.get_contract(&tx.from).await?.is_some() {
            contracts.push(tx.from.clone());
        }

        let mut token = None;
        let mut transfers = None;
        let mut issuances = None;
        let mut operation = None;

        if let Some(to) = &tx.to {
            // The catalog is consulted only for a recipient with a contract record.
            if self.get_contract(to).await?.is_some() {
                contracts.push(to.clone());

                if let Some(found) = self.get_token(to).await? {
                    let tx_transfers = self.get_transfers(hash).await?;
                    let tx_issuances = self.get_issuances(hash).await?;
                    operation =
                        TransactionDetails::select_operation(&tx_issuances, &tx_transfers);

                    token = Some(found);
                    transfers = Some(tx_transfers);
                    issuances = Some(tx_issuances);
                }
            }
        }

        Ok(TransactionDetails {
            tx,
            contracts,
            token,
            transfers,
            issuances,
            operation,
        })
    }
}
