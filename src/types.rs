//! Pool model and fixed-point balance scaling

use ethereum_types::{Address, H256, U256};
use serde::{Deserialize, Serialize};

use crate::error::{MigrationError, Result};

/// Wrapped-stable placeholder token excluded from migration balance lists
pub const EXCLUDED_TOKEN_SYMBOL: &str = "bb-a-USD";

/// Pool tokens are scaled to 18-decimal fixed point before migration
pub const BPT_DECIMALS: u32 = 18;

/// A token held by a pool, with its balance as the decimal string the
/// upstream data source provides
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolToken {
    pub address: Address,
    pub symbol: String,
    pub balance: String,
}

/// Source pool for a migration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pool {
    pub id: String,
    pub address: Address,
    pub tokens: Vec<PoolToken>,
}

/// A transaction request handed to the provider, for both static calls
/// and real submissions
#[derive(Debug, Clone)]
pub struct TransactionRequest {
    pub to: Address,
    pub data: Vec<u8>,
    pub gas_limit: u64,
}

/// Handle to a submitted transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingTransaction {
    pub hash: H256,
    pub description: String,
}

/// Scale a decimal string to fixed point with the given number of decimals
///
/// `"1.5"` at 18 decimals becomes `1_500_000_000_000_000_000`. Rejects
/// malformed strings, negative values, and fractions longer than the
/// decimal width.
pub fn scale_to_fixed(value: &str, decimals: u32) -> Result<U256> {
    let value = value.trim();
    if value.is_empty() {
        return Err(MigrationError::InvalidAmount("empty amount".to_string()));
    }

    let (int_part, frac_part) = match value.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (value, ""),
    };
    let int_part = if int_part.is_empty() { "0" } else { int_part };

    if !int_part.bytes().all(|b| b.is_ascii_digit())
        || !frac_part.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(MigrationError::InvalidAmount(format!(
            "not a decimal number: {value}"
        )));
    }

    if frac_part.len() as u32 > decimals {
        return Err(MigrationError::InvalidAmount(format!(
            "fraction exceeds {decimals} decimals: {value}"
        )));
    }

    let int = U256::from_dec_str(int_part)
        .map_err(|_| MigrationError::InvalidAmount(format!("integer overflow: {value}")))?;
    let scale = U256::from(10u64).pow(U256::from(decimals));
    let mut result = int
        .checked_mul(scale)
        .ok_or_else(|| MigrationError::InvalidAmount(format!("amount overflow: {value}")))?;

    if !frac_part.is_empty() {
        let frac = U256::from_dec_str(frac_part)
            .map_err(|_| MigrationError::InvalidAmount(format!("fraction overflow: {value}")))?;
        let frac_scale = U256::from(10u64).pow(U256::from(decimals - frac_part.len() as u32));
        result = result
            .checked_add(frac * frac_scale)
            .ok_or_else(|| MigrationError::InvalidAmount(format!("amount overflow: {value}")))?;
    }

    Ok(result)
}

/// Token balances passed downstream to the migration call: the
/// wrapped-stable placeholder is excluded, every remaining balance is
/// scaled to 18 decimals, and the filtered token order is preserved
pub fn scaled_migration_balances(pool: &Pool) -> Result<Vec<U256>> {
    pool.tokens
        .iter()
        .filter(|token| token.symbol != EXCLUDED_TOKEN_SYMBOL)
        .map(|token| scale_to_fixed(&token.balance, BPT_DECIMALS))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(symbol: &str, balance: &str) -> PoolToken {
        PoolToken {
            address: Address::repeat_byte(0x11),
            symbol: symbol.to_string(),
            balance: balance.to_string(),
        }
    }

    #[test]
    fn test_scale_whole_numbers() {
        assert_eq!(
            scale_to_fixed("1", 18).unwrap(),
            U256::from_dec_str("1000000000000000000").unwrap()
        );
        assert_eq!(scale_to_fixed("0", 18).unwrap(), U256::zero());
        assert_eq!(
            scale_to_fixed("1000000", 18).unwrap(),
            U256::from_dec_str("1000000000000000000000000").unwrap()
        );
    }

    #[test]
    fn test_scale_fractions() {
        assert_eq!(
            scale_to_fixed("1.5", 18).unwrap(),
            U256::from_dec_str("1500000000000000000").unwrap()
        );
        assert_eq!(
            scale_to_fixed("0.000000000000000001", 18).unwrap(),
            U256::from(1)
        );
        assert_eq!(scale_to_fixed(".5", 18).unwrap(), scale_to_fixed("0.5", 18).unwrap());
    }

    #[test]
    fn test_scale_rejects_malformed() {
        assert!(scale_to_fixed("", 18).is_err());
        assert!(scale_to_fixed("-1", 18).is_err());
        assert!(scale_to_fixed("1.2.3", 18).is_err());
        assert!(scale_to_fixed("abc", 18).is_err());
        // 19 fractional digits at 18 decimals
        assert!(scale_to_fixed("0.0000000000000000001", 18).is_err());
    }

    #[test]
    fn test_excluded_token_filtered_in_order() {
        let pool = Pool {
            id: "0x01".to_string(),
            address: Address::repeat_byte(0x11),
            tokens: vec![
                token("DAI", "100"),
                token(EXCLUDED_TOKEN_SYMBOL, "999"),
                token("USDC", "200"),
            ],
        };

        let balances = scaled_migration_balances(&pool).unwrap();
        assert_eq!(balances.len(), 2);
        assert_eq!(balances[0], scale_to_fixed("100", 18).unwrap());
        assert_eq!(balances[1], scale_to_fixed("200", 18).unwrap());
    }

    #[test]
    fn test_bad_balance_propagates() {
        let pool = Pool {
            id: "0x01".to_string(),
            address: Address::repeat_byte(0x11),
            tokens: vec![token("DAI", "not-a-number")],
        };
        assert!(scaled_migration_balances(&pool).is_err());
    }
}
