//! # Ledger Explorer Service Tests

use super::*;
use crate::adapters::{InMemoryLedger, LruResultCache, StaticBalanceOracle};
use crate::domain::{
    Balance, Block, Contract, Receipt, Token, TransactionRecord, TransferKind, TransferRecord,
};

const EOA: &str = "0x1111111111111111111111111111111111111111";
const TOKEN: &str = "0x2222222222222222222222222222222222222222";
const PLAIN_CONTRACT: &str = "0x3333333333333333333333333333333333333333";
const QUIET_TOKEN: &str = "0x4444444444444444444444444444444444444444";
const CREATED: &str = "0x5555555555555555555555555555555555555555";
const PEER: &str = "0x6666666666666666666666666666666666666666";

/// 1.5 ether
const ONE_AND_HALF: &str = "0x14d1120d7b160000";

type TestService = ExplorerService<InMemoryLedger, StaticBalanceOracle, LruResultCache>;

struct Fixture {
    service: TestService,
    ledger: Arc<InMemoryLedger>,
    oracle: Arc<StaticBalanceOracle>,
    cache: Arc<LruResultCache>,
}

fn make_fixture() -> Fixture {
    let ledger = Arc::new(InMemoryLedger::new());
    let oracle = Arc::new(StaticBalanceOracle::new());
    let cache = Arc::new(LruResultCache::new(16));

    let deps = ExplorerDependencies {
        repository: Arc::clone(&ledger),
        oracle: Arc::clone(&oracle),
        cache: Arc::clone(&cache),
    };
    let service = ExplorerService::new(ExplorerConfig::for_testing(), deps).unwrap();

    for address in [EOA, TOKEN, PLAIN_CONTRACT, QUIET_TOKEN, PEER] {
        oracle.set_balance(address, ONE_AND_HALF);
    }

    Fixture {
        service,
        ledger,
        oracle,
        cache,
    }
}

fn tx_hash(n: u8) -> String {
    format!("0x{}", format!("{:02x}", n).repeat(32))
}

fn contract(address: &str) -> Contract {
    Contract {
        address: address.into(),
        creator: PEER.into(),
        transaction_hash: tx_hash(0xee),
        block_number: 1,
    }
}

fn token(address: &str, transfers_count: u64) -> Token {
    Token {
        address: address.into(),
        name: "Test Token".into(),
        symbol: "TST".into(),
        decimals: 18,
        total_supply: "1000000".into(),
        transfers_count,
    }
}

fn movement(hash: &str, contract: &str, from: &str, to: &str, timestamp: u64) -> TransferRecord {
    TransferRecord {
        transaction_hash: hash.into(),
        block_number: timestamp / 10,
        contract: contract.into(),
        from: from.into(),
        to: to.into(),
        value: "100".into(),
        timestamp,
    }
}

fn raw_tx(hash: &str, from: &str, to: Option<&str>, block_number: u64) -> TransactionRecord {
    TransactionRecord {
        hash: hash.into(),
        block_number,
        from: from.into(),
        to: to.map(Into::into),
        creates: None,
        value: "0".into(),
        gas: 60_000,
        gas_price: "20000000000".into(),
        nonce: 3,
        timestamp: 1_600_000_000,
        input: "0xa9059cbb".into(),
        receipt: Some(Receipt { gas_used: 51_000 }),
    }
}

fn block(number: u64) -> Block {
    Block {
        number,
        hash: format!("0x{:064x}", number),
        timestamp: 1_600_000_000 + number,
        transaction_count: 1,
    }
}

fn seed_token_contract(ledger: &InMemoryLedger) {
    ledger.insert_contract(contract(TOKEN));
    ledger.insert_token(token(TOKEN, 500));
}

// =============================================================================
// Address details
// =============================================================================

#[tokio::test]
async fn test_eoa_address_details() {
    let f = make_fixture();
    seed_token_contract(&f.ledger);
    f.ledger.insert_balance(Balance {
        address: EOA.into(),
        contract: TOKEN.into(),
        value: "42".into(),
    });
    // Holding of a contract that is not in the token catalog
    f.ledger.insert_balance(Balance {
        address: EOA.into(),
        contract: PLAIN_CONTRACT.into(),
        value: "7".into(),
    });
    f.ledger
        .insert_transfer(movement(&tx_hash(1), TOKEN, EOA, PEER, 100));
    f.ledger
        .insert_transfer(movement(&tx_hash(2), TOKEN, PEER, PEER, 200));

    let details = f.service.get_address_details(EOA).await.unwrap();

    assert!(!details.is_contract);
    assert!(details.contract.is_none());
    assert!(details.token.is_none());
    assert!(details.issuances.is_none());
    assert_eq!(details.balance.to_string(), "1.5");

    let balances = details.balances.unwrap();
    assert_eq!(balances.len(), 2);

    let tokens = details.tokens.unwrap();
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[TOKEN].symbol, "TST");

    assert_eq!(details.transfers.len(), 1);
    assert_eq!(details.transfers[0].from, EOA);
}

#[tokio::test]
async fn test_eoa_without_activity_still_has_lists() {
    let f = make_fixture();

    let details = f.service.get_address_details(PEER).await.unwrap();

    assert!(!details.is_contract);
    assert_eq!(details.tokens, Some(Default::default()));
    assert_eq!(details.balances, Some(vec![]));
    assert!(details.transfers.is_empty());

    let json = serde_json::to_value(&details).unwrap();
    assert!(json.get("contract").is_none());
    assert!(json.get("token").is_none());
    assert!(json.get("issuances").is_none());
    assert_eq!(json["isContract"], false);
}

#[tokio::test]
async fn test_token_contract_address_details() {
    let f = make_fixture();
    seed_token_contract(&f.ledger);
    f.ledger
        .insert_transfer(movement(&tx_hash(1), TOKEN, EOA, PEER, 100));
    f.ledger
        .insert_transfer(movement(&tx_hash(2), TOKEN, PEER, EOA, 300));
    // Transfer of some other token that merely involves the token address
    f.ledger
        .insert_transfer(movement(&tx_hash(3), QUIET_TOKEN, TOKEN, PEER, 400));
    f.ledger
        .insert_issuance(movement(&tx_hash(4), TOKEN, TOKEN, EOA, 50));
    f.ledger.insert_balance(Balance {
        address: TOKEN.into(),
        contract: TOKEN.into(),
        value: "1".into(),
    });

    let details = f.service.get_address_details(TOKEN).await.unwrap();

    assert!(details.is_contract);
    assert_eq!(details.contract.as_ref().map(|c| c.address.as_str()), Some(TOKEN));
    assert_eq!(details.token.as_ref().map(|t| t.transfers_count), Some(500));
    assert!(details.balances.is_none());
    assert!(details.tokens.is_none());

    // Emitted by the contract, newest first
    let stamps: Vec<_> = details.transfers.iter().map(|t| t.timestamp).collect();
    assert_eq!(stamps, vec![300, 100]);
    assert!(details.transfers.iter().all(|t| t.contract == TOKEN));

    let issuances = details.issuances.unwrap();
    assert_eq!(issuances.len(), 1);
    assert_eq!(issuances[0].kind, TransferKind::Issuance);
    assert!(issuances[0].success);
}

#[tokio::test]
async fn test_plain_contract_address_details() {
    let f = make_fixture();
    seed_token_contract(&f.ledger);
    f.ledger.insert_contract(contract(PLAIN_CONTRACT));
    f.ledger.insert_balance(Balance {
        address: PLAIN_CONTRACT.into(),
        contract: TOKEN.into(),
        value: "9".into(),
    });
    f.ledger
        .insert_transfer(movement(&tx_hash(1), TOKEN, EOA, PLAIN_CONTRACT, 100));

    let details = f.service.get_address_details(PLAIN_CONTRACT).await.unwrap();

    assert!(details.is_contract);
    assert!(details.contract.is_some());
    assert!(details.token.is_none());
    assert!(details.issuances.is_none());
    assert_eq!(details.balances.map(|b| b.len()), Some(1));
    assert!(details.tokens.unwrap().contains_key(TOKEN));
    assert_eq!(details.transfers.len(), 1);
}

#[tokio::test]
async fn test_catalog_token_without_contract_record_reads_as_account() {
    let f = make_fixture();
    f.ledger.insert_token(token(TOKEN, 5));
    f.ledger
        .insert_issuance(movement(&tx_hash(1), TOKEN, TOKEN, EOA, 50));

    let details = f.service.get_address_details(TOKEN).await.unwrap();

    assert!(!details.is_contract);
    assert!(details.contract.is_none());
    assert!(details.token.is_none());
    assert!(details.issuances.is_none());
    assert!(details.tokens.is_some());
    assert!(details.balances.is_some());
}

#[tokio::test]
async fn test_address_details_fail_when_oracle_unreachable() {
    let f = make_fixture();
    f.oracle.set_unreachable(true);

    let err = f.service.get_address_details(EOA).await.unwrap_err();
    assert!(matches!(
        err,
        ExplorerError::CollaboratorUnavailable {
            collaborator: "balance oracle",
            ..
        }
    ));
}

#[tokio::test]
async fn test_balance_null_is_not_found_not_zero() {
    let f = make_fixture();
    let unknown = "0x7777777777777777777777777777777777777777";

    let err = f.service.get_balance(unknown).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_balance_malformed_quantity() {
    let f = make_fixture();
    f.oracle.set_balance(EOA, "not-hex");

    assert!(matches!(
        f.service.get_balance(EOA).await,
        Err(ExplorerError::MalformedResponse(_))
    ));
}

#[tokio::test]
async fn test_repository_outage_is_distinct_from_not_found() {
    let f = make_fixture();
    f.ledger.set_offline(true);

    let err = f.service.get_address_details(EOA).await.unwrap_err();
    assert!(!err.is_not_found());
    assert!(matches!(
        err,
        ExplorerError::CollaboratorUnavailable {
            collaborator: "repository",
            ..
        }
    ));
}

// =============================================================================
// Lookup primitives
// =============================================================================

#[tokio::test]
async fn test_address_transfers_limit_and_order() {
    let f = make_fixture();
    for (i, ts) in [500u64, 100, 400, 200, 300].into_iter().enumerate() {
        let (from, to) = if i % 2 == 0 { (EOA, PEER) } else { (PEER, EOA) };
        f.ledger
            .insert_transfer(movement(&tx_hash(i as u8), TOKEN, from, to, ts));
    }

    let transfers = f.service.get_address_transfers(EOA, 3).await.unwrap();

    assert_eq!(transfers.len(), 3);
    assert!(transfers
        .windows(2)
        .all(|w| w[0].timestamp >= w[1].timestamp));
    assert_eq!(transfers[0].timestamp, 500);
    assert!(transfers
        .iter()
        .all(|t| t.success && t.kind == TransferKind::Transfer));
}

#[tokio::test]
async fn test_token_catalog_memoized_until_refresh() {
    let f = make_fixture();
    f.ledger.insert_token(token(TOKEN, 10));

    let catalog = f.service.get_tokens(false).await.unwrap();
    assert_eq!(catalog.len(), 1);

    f.ledger.insert_token(token(QUIET_TOKEN, 99));
    assert!(f.service.get_token(QUIET_TOKEN).await.unwrap().is_none());

    let catalog = f.service.get_tokens(true).await.unwrap();
    assert_eq!(catalog.len(), 2);
    assert_eq!(catalog.tokens()[0].address, QUIET_TOKEN);
    assert!(f.service.get_token(QUIET_TOKEN).await.unwrap().is_some());
}

#[tokio::test]
async fn test_last_block_memoized_until_refresh() {
    let f = make_fixture();
    assert_eq!(f.service.get_last_block().await.unwrap(), None);

    f.ledger.insert_block(block(100));
    f.ledger.insert_block(block(99));
    assert_eq!(f.service.get_last_block().await.unwrap(), Some(100));

    f.ledger.insert_block(block(105));
    assert_eq!(f.service.get_last_block().await.unwrap(), Some(100));
    assert_eq!(f.service.refresh_last_block().await.unwrap(), Some(105));
    assert_eq!(f.service.get_last_block().await.unwrap(), Some(105));
}

#[tokio::test]
async fn test_get_transaction_missing() {
    let f = make_fixture();
    assert!(f.service.get_transaction(&tx_hash(9)).await.unwrap().is_none());
    assert!(f.service.get_contract(EOA).await.unwrap().is_none());
}

#[tokio::test]
async fn test_returned_records_carry_no_storage_id() {
    let f = make_fixture();
    f.ledger.insert_transaction(raw_tx(&tx_hash(1), EOA, Some(PEER), 10));
    f.ledger
        .insert_transfer(movement(&tx_hash(1), TOKEN, EOA, PEER, 100));

    let tx = f.service.get_transaction(&tx_hash(1)).await.unwrap().unwrap();
    let json = serde_json::to_value(&tx).unwrap();
    assert!(json.get("id").is_none());

    let transfers = f.service.get_transfers(&tx_hash(1)).await.unwrap();
    let json = serde_json::to_value(&transfers).unwrap();
    assert!(json[0].get("id").is_none());
}

// =============================================================================
// Transaction details
// =============================================================================

#[tokio::test]
async fn test_token_transaction_prefers_issuance_operation() {
    let f = make_fixture();
    seed_token_contract(&f.ledger);
    f.ledger.insert_contract(contract(PLAIN_CONTRACT));
    f.ledger.insert_block(block(100));

    let hash = tx_hash(1);
    let mut raw = raw_tx(&hash, PLAIN_CONTRACT, Some(TOKEN), 90);
    raw.creates = Some(CREATED.into());
    f.ledger.insert_transaction(raw);
    f.ledger.insert_transfer(movement(&hash, TOKEN, EOA, PEER, 10));
    f.ledger.insert_transfer(movement(&hash, TOKEN, PEER, EOA, 11));
    f.ledger.insert_issuance(movement(&hash, TOKEN, TOKEN, EOA, 12));

    let details = f.service.get_transaction_details(&hash).await.unwrap();

    assert_eq!(details.contracts, vec![CREATED, PLAIN_CONTRACT, TOKEN]);
    assert_eq!(details.token.as_ref().map(|t| t.address.as_str()), Some(TOKEN));
    assert_eq!(details.transfers.as_ref().map(Vec::len), Some(2));
    assert_eq!(details.issuances.as_ref().map(Vec::len), Some(1));

    let operation = details.operation.unwrap();
    assert_eq!(operation.kind, TransferKind::Issuance);
    assert_eq!(operation.timestamp, 12);

    assert_eq!(details.tx.confirmations, Some(10));
    assert!(details.tx.success);
    assert_eq!(details.tx.gas_used, 51_000);
}

#[tokio::test]
async fn test_token_transaction_falls_back_to_transfer_operation() {
    let f = make_fixture();
    seed_token_contract(&f.ledger);

    let hash = tx_hash(2);
    f.ledger.insert_transaction(raw_tx(&hash, EOA, Some(TOKEN), 5));
    f.ledger.insert_transfer(movement(&hash, TOKEN, EOA, PEER, 10));

    let details = f.service.get_transaction_details(&hash).await.unwrap();

    assert_eq!(details.issuances, Some(vec![]));
    let operation = details.operation.unwrap();
    assert_eq!(operation.kind, TransferKind::Transfer);
    assert_eq!(operation.from, EOA);
}

#[tokio::test]
async fn test_token_transaction_without_movements_has_no_operation() {
    let f = make_fixture();
    seed_token_contract(&f.ledger);

    let hash = tx_hash(3);
    f.ledger.insert_transaction(raw_tx(&hash, EOA, Some(TOKEN), 5));

    let details = f.service.get_transaction_details(&hash).await.unwrap();

    assert!(details.token.is_some());
    assert_eq!(details.transfers, Some(vec![]));
    assert!(details.operation.is_none());
    // No blocks indexed: confirmations cannot be derived
    assert!(details.tx.confirmations.is_none());
}

#[tokio::test]
async fn test_plain_transaction_has_no_token_fields() {
    let f = make_fixture();
    seed_token_contract(&f.ledger);

    let hash = tx_hash(4);
    f.ledger.insert_transaction(raw_tx(&hash, EOA, Some(PEER), 5));
    f.ledger.insert_transfer(movement(&hash, TOKEN, EOA, PEER, 10));

    let details = f.service.get_transaction_details(&hash).await.unwrap();

    assert!(details.contracts.is_empty());
    assert!(details.token.is_none());
    assert!(details.transfers.is_none());
    assert!(details.issuances.is_none());
    assert!(details.operation.is_none());

    let json = serde_json::to_value(&details).unwrap();
    assert!(json.get("operation").is_none());
    assert_eq!(json["contracts"], serde_json::json!([]));
}

#[tokio::test]
async fn test_catalog_token_without_contract_record_is_not_a_token_recipient() {
    let f = make_fixture();
    f.ledger.insert_token(token(TOKEN, 5));

    let hash = tx_hash(9);
    f.ledger.insert_transaction(raw_tx(&hash, EOA, Some(TOKEN), 5));
    f.ledger.insert_transfer(movement(&hash, TOKEN, EOA, PEER, 10));

    let details = f.service.get_transaction_details(&hash).await.unwrap();

    assert!(details.contracts.is_empty());
    assert!(details.token.is_none());
    assert!(details.transfers.is_none());
    assert!(details.issuances.is_none());
    assert!(details.operation.is_none());
}

#[tokio::test]
async fn test_contract_creation_transaction() {
    let f = make_fixture();

    let hash = tx_hash(5);
    let mut raw = raw_tx(&hash, EOA, None, 5);
    raw.creates = Some(CREATED.into());
    raw.receipt = Some(Receipt { gas_used: 60_000 });
    f.ledger.insert_transaction(raw);

    let details = f.service.get_transaction_details(&hash).await.unwrap();

    assert_eq!(details.contracts, vec![CREATED]);
    assert!(details.tx.to.is_none());
    // Every unit of gas consumed reads as a failure
    assert!(!details.tx.success);
}

#[tokio::test]
async fn test_transaction_details_cache_round_trip() {
    let f = make_fixture();
    seed_token_contract(&f.ledger);
    f.ledger.insert_block(block(100));

    let hash = tx_hash(6);
    f.ledger.insert_transaction(raw_tx(&hash, EOA, Some(TOKEN), 90));
    f.ledger.insert_transfer(movement(&hash, TOKEN, EOA, PEER, 10));

    let first = f.service.get_transaction_details(&hash).await.unwrap();
    assert_eq!(first.tx.confirmations, Some(10));
    assert!(f.cache.exists(&format!("tx-{}", hash)).await.unwrap());

    f.ledger.insert_block(block(105));
    f.service.refresh_last_block().await.unwrap();

    let second = f.service.get_transaction_details(&hash).await.unwrap();
    assert_eq!(second.tx.confirmations, Some(15));
    assert_eq!(second.contracts, first.contracts);
    assert_eq!(second.token, first.token);
    assert_eq!(second.transfers, first.transfers);
    assert_eq!(second.issuances, first.issuances);
    assert_eq!(second.operation, first.operation);
}

#[tokio::test]
async fn test_cached_composite_is_not_refreshed_or_stored_with_confirmations() {
    let f = make_fixture();
    seed_token_contract(&f.ledger);
    f.ledger.insert_block(block(100));

    let hash = tx_hash(7);
    f.ledger.insert_transaction(raw_tx(&hash, EOA, Some(TOKEN), 90));

    let first = f.service.get_transaction_details(&hash).await.unwrap();
    assert_eq!(first.transfers, Some(vec![]));

    let cached = f.cache.load(&format!("tx-{}", hash)).await.unwrap().unwrap();
    assert!(cached["tx"].get("confirmations").is_none());

    // A transfer indexed later is not picked up: the cache is stale-accepting
    f.ledger.insert_transfer(movement(&hash, TOKEN, EOA, PEER, 10));
    let second = f.service.get_transaction_details(&hash).await.unwrap();
    assert_eq!(second.transfers, Some(vec![]));

    // Served from cache even when the index is unreachable
    f.ledger.set_offline(true);
    let third = f.service.get_transaction_details(&hash).await.unwrap();
    assert_eq!(third.tx.confirmations, Some(10));
}

#[tokio::test]
async fn test_missing_transaction_is_not_found_and_not_cached() {
    let f = make_fixture();
    let hash = tx_hash(8);

    let err = f.service.get_transaction_details(&hash).await.unwrap_err();
    assert_eq!(err, ExplorerError::not_found("transaction", hash.clone()));
    assert!(f.cache.is_empty());
}

// =============================================================================
// Construction and trait surface
// =============================================================================

#[test]
fn test_new_rejects_misconfiguration() {
    let deps = ExplorerDependencies {
        repository: Arc::new(InMemoryLedger::new()),
        oracle: Arc::new(StaticBalanceOracle::new()),
        cache: Arc::new(LruResultCache::new(4)),
    };
    let config = ExplorerConfig {
        default_list_limit: 0,
        ..ExplorerConfig::for_testing()
    };

    let result = ExplorerService::new(config, deps);
    assert!(matches!(result, Err(ExplorerError::Misconfiguration(_))));
}

#[tokio::test]
async fn test_api_trait_delegates_to_service() {
    let f = make_fixture();
    f.ledger.insert_block(block(42));

    let api: &dyn LedgerExplorerApi = &f.service;
    assert_eq!(api.get_last_block().await.unwrap(), Some(42));
    assert_eq!(api.get_balance(EOA).await.unwrap().to_string(), "1.5");
    assert!(api.get_token(TOKEN).await.unwrap().is_none());
}
