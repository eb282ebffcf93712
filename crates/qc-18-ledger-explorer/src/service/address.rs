//! Address profile assembly.

use std::collections::BTreeMap;
use tracing::{debug, instrument};

use super::ExplorerService;
use crate::domain::{AddressDetails, ExplorerError, Token};
use crate::ports::outbound::{BalanceOracle, LedgerRepository, ResultCache};

impl<R, O, C> ExplorerService<R, O, C>
where
    R: LedgerRepository,
    O: BalanceOracle,
    C: ResultCache,
{
    /// Assemble the profile of an address.
    ///
    /// ## Algorithm
    ///
    /// 1. Fetch the native balance (always)
    /// 2. Contract lookup: absent means an externally-owned account
    /// 3. Token contracts get their own emitted transfers and issuances
    /// 4. Everything else gets its holdings, the tokens behind them, and the
    ///    transfers it took part in
    #[instrument(skip(self))]
    pub async fn get_address_details(&self, address: &str) -> Result<AddressDetails, ExplorerError> {
        let limit = self.config.default_list_limit;
        let balance = self.get_balance(address).await?;
        let contract = self.get_contract(address).await?;
        let is_contract = contract.is_some();

        if is_contract {
            if let Some(token) = self.get_token(address).await? {
                debug!("{} is a token contract", address);
                let transfers = self.get_contract_transfers(address, limit).await?;
                let issuances = self.get_contract_issuances(address, limit).await?;

                return Ok(AddressDetails {
                    is_contract,
                    balance,
                    transfers,
                    contract,
                    token: Some(token),
                    issuances: Some(issuances),
                    tokens: None,
                    balances: None,
                });
            }
        }

        let balances = self.get_address_balances(address).await?;
        let catalog = self.get_tokens(false).await?;
        let tokens: BTreeMap<String, Token> = balances
            .iter()
            .filter_map(|b| catalog.get(&b.contract).map(|t| (b.contract.clone(), t.clone())))
            .collect();
        let transfers = self.get_address_transfers(address, limit).await?;

        debug!(
            is_contract,
            holdings = balances.len(),
            tokens = tokens.len(),
            "address profile assembled"
        );

        Ok(AddressDetails {
            is_contract,
            balance,
            transfers,
            contract,
            token: None,
            issuances: None,
            tokens: Some(tokens),
            balances: Some(balances),
        })
    }
}
