//! # Value Objects
//!
//! Immutable value objects and input validation for the Ledger Explorer.

use primitive_types::U256;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use super::errors::ExplorerError;

/// Default number of records returned by list lookups.
pub const DEFAULT_LIST_LIMIT: usize = 10;

/// Decimal places between wei and ether.
pub const ETHER_DECIMALS: usize = 18;

/// Prefix of the result-cache key for transaction composites.
pub const TX_CACHE_PREFIX: &str = "tx-";

/// Cache key for a transaction composite.
pub fn transaction_cache_key(hash: &str) -> String {
    format!("{}{}", TX_CACHE_PREFIX, hash)
}

/// True iff `candidate` is `0x` followed by exactly 40 lowercase hex digits.
pub fn is_valid_address(candidate: &str) -> bool {
    is_prefixed_lower_hex(candidate, 40)
}

/// True iff `candidate` is `0x` followed by exactly 64 lowercase hex digits.
pub fn is_valid_transaction_hash(candidate: &str) -> bool {
    is_prefixed_lower_hex(candidate, 64)
}

fn is_prefixed_lower_hex(candidate: &str, digits: usize) -> bool {
    match candidate.strip_prefix("0x") {
        Some(body) => {
            body.len() == digits
                && body
                    .bytes()
                    .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
        }
        None => false,
    }
}

/// A native-currency amount, held in wei and rendered in ether.
///
/// Serializes as an exact decimal string (`"1.5"`), never as a float.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct EtherValue {
    wei: U256,
}

impl EtherValue {
    /// Wrap an amount in wei.
    pub fn from_wei(wei: U256) -> Self {
        Self { wei }
    }

    /// Parse a JSON-RPC hex quantity (`"0x1bc16d674ec80000"`).
    pub fn from_hex_quantity(quantity: &str) -> Result<Self, ExplorerError> {
        let digits = quantity
            .strip_prefix("0x")
            .or_else(|| quantity.strip_prefix("0X"))
            .ok_or_else(|| ExplorerError::MalformedResponse(format!("missing 0x: {}", quantity)))?;

        if digits.is_empty() {
            return Err(ExplorerError::MalformedResponse(
                "empty hex quantity".to_string(),
            ));
        }

        // Leading zeros do not count against the 64-digit width.
        let significant = digits.trim_start_matches('0');
        if significant.is_empty() {
            return Ok(Self::default());
        }

        U256::from_str_radix(significant, 16)
            .map(Self::from_wei)
            .map_err(|_| ExplorerError::MalformedResponse(format!("not a hex quantity: {}", quantity)))
    }

    /// Parse a decimal ether string (`"1.5"`).
    pub fn from_ether_str(text: &str) -> Result<Self, ExplorerError> {
        let (whole, fraction) = text.split_once('.').unwrap_or((text, ""));
        if whole.is_empty() || fraction.len() > ETHER_DECIMALS {
            return Err(ExplorerError::Serialization(format!(
                "invalid ether amount: {}",
                text
            )));
        }

        let parse = |digits: &str| {
            U256::from_dec_str(digits).map_err(|_| {
                ExplorerError::Serialization(format!("invalid ether amount: {}", text))
            })
        };

        let whole = parse(whole)?;
        let fraction = if fraction.is_empty() {
            U256::zero()
        } else {
            let padded = format!("{:0<width$}", fraction, width = ETHER_DECIMALS);
            parse(&padded)?
        };

        let wei = whole
            .checked_mul(Self::wei_per_ether())
            .and_then(|w| w.checked_add(fraction))
            .ok_or_else(|| ExplorerError::Serialization(format!("ether amount overflows: {}", text)))?;

        Ok(Self::from_wei(wei))
    }

    fn wei_per_ether() -> U256 {
        U256::exp10(ETHER_DECIMALS)
    }
}

impl fmt::Display for EtherValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (whole, fraction) = self.wei.div_mod(Self::wei_per_ether());
        if fraction.is_zero() {
            return write!(f, "{}", whole);
        }

        let fraction = format!("{:0>width$}", fraction.to_string(), width = ETHER_DECIMALS);
        write!(f, "{}.{}", whole, fraction.trim_end_matches('0'))
    }
}

impl Serialize for EtherValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EtherValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::from_ether_str(&text).map_err(serde::de::Error::custom)
    }
}
