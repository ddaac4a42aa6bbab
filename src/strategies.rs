//! Migration strategy registry and calldata builders
//!
//! Each supported source pool maps to a [`MigrationKind`] selecting how the
//! batch-relayer call is built and how its simulated output is decoded.

use ethereum_types::{Address, U256};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::abi::{self, Param};
use crate::error::{MigrationError, Result};

/// Strategy tag for a source pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MigrationKind {
    /// Composite boosted-stable pool migrating to its successor; the
    /// relayer batch needs the pool's scaled token balances
    BoostedUsd,
    /// Legacy three-token stable pool migrating into a boosted pool
    LegacyStable,
}

/// Registry entry mapping a source pool to its strategy
#[derive(Debug, Clone)]
pub struct PoolMigration {
    pub from_pool_id: &'static str,
    pub kind: MigrationKind,
}

lazy_static! {
    /// Known migrations, keyed by source-pool identifier
    pub static ref POOL_MIGRATIONS: Vec<PoolMigration> = vec![
        PoolMigration {
            from_pool_id: "0x7b50775383d3d6f0215a8f290f2c9e2eebbeceb20000000000000000000000fe",
            kind: MigrationKind::BoostedUsd,
        },
        PoolMigration {
            from_pool_id: "0x06df3b2bbb68adc8b0e302443692037ed9f91b42000000000000000000000063",
            kind: MigrationKind::LegacyStable,
        },
    ];
}

/// Look up the migration strategy for a source pool, if any
pub fn find_migration(from_pool_id: &str) -> Option<MigrationKind> {
    POOL_MIGRATIONS
        .iter()
        .find(|migration| migration.from_pool_id == from_pool_id)
        .map(|migration| migration.kind)
}

/// A built migration call: target contract and calldata
#[derive(Debug, Clone)]
pub struct MigrationQuery {
    pub to: Address,
    pub data: Vec<u8>,
}

impl MigrationKind {
    /// Build the relayer calldata for this migration
    ///
    /// `expected_out` is zero on the first pass; after simulation the call
    /// is rebuilt with the decoded output in its place. `authorization` is
    /// attached only while the relayer is not yet approved.
    pub fn build_query(
        &self,
        relayer: Address,
        account: Address,
        amount: U256,
        expected_out: U256,
        staked: bool,
        token_balances: &[U256],
        authorization: Option<&[u8]>,
    ) -> MigrationQuery {
        let authorization = authorization.map(<[u8]>::to_vec).unwrap_or_default();

        let data = match self {
            MigrationKind::BoostedUsd => abi::encode_call(
                abi::selector("migrateBoostedPool(address,uint256,uint256,bool,uint256[],bytes)"),
                &[
                    Param::Address(account),
                    Param::Uint(amount),
                    Param::Uint(expected_out),
                    Param::Bool(staked),
                    Param::UintArray(token_balances.to_vec()),
                    Param::Bytes(authorization),
                ],
            ),
            MigrationKind::LegacyStable => abi::encode_call(
                abi::selector("migrateLegacyStable(address,uint256,uint256,bool,bytes)"),
                &[
                    Param::Address(account),
                    Param::Uint(amount),
                    Param::Uint(expected_out),
                    Param::Bool(staked),
                    Param::Bytes(authorization),
                ],
            ),
        };

        MigrationQuery { to: relayer, data }
    }

    /// Decode the expected output amount from simulated return data
    ///
    /// The relayer returns one uint256 per batched step. For a staked
    /// migration the batch ends with the gauge deposit, so the pool output
    /// sits one element earlier.
    pub fn decode_expected_output(&self, return_data: &[u8], staked: bool) -> Result<U256> {
        let outputs = abi::decode_u256_array(return_data)?;

        match self {
            MigrationKind::BoostedUsd => {
                if staked {
                    if outputs.len() < 2 {
                        return Err(MigrationError::Decode(
                            "staked migration output missing gauge step".to_string(),
                        ));
                    }
                    Ok(outputs[outputs.len() - 2])
                } else {
                    outputs.last().copied().ok_or_else(|| {
                        MigrationError::Decode("empty migration output".to_string())
                    })
                }
            }
            // the legacy batch is a single swap; staking only changes the
            // recipient, not the output position
            MigrationKind::LegacyStable => outputs
                .first()
                .copied()
                .ok_or_else(|| MigrationError::Decode("empty migration output".to_string())),
        }
    }
}
