//! Pool Migration Orchestrator
//!
//! Sequences the wallet-signed steps that move liquidity-pool balances
//! into their successor pools: an optional one-time relayer-approval
//! signature, then one or two batch-relayer migration transactions, each
//! simulated first to learn its expected output before the real call.

pub mod abi;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod provider;
pub mod relayer;
pub mod strategies;
pub mod tracker;
pub mod types;
pub mod vault;

// Re-export commonly used types
pub use config::{ConfigError, NetworkConfig};
pub use error::{MigrationError, Result};
pub use orchestrator::{
    MigrationOrchestrator, MigrationParams, MigrationStep, StepKind, StepOutcome, HALF_HOUR_MS,
    MAX_GAS_LIMIT,
};
pub use provider::{EthereumProvider, LocalWallet, WalletSigner};
pub use strategies::{find_migration, MigrationKind, MigrationQuery, POOL_MIGRATIONS};
pub use tracker::{ConfirmationWatcher, TransactionLog, TransactionState};
pub use types::{Pool, PoolToken, EXCLUDED_TOKEN_SYMBOL};
pub use vault::VaultContract;
