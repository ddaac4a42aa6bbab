//! Network configuration with validation

use ethereum_types::Address;
use serde::{Deserialize, Serialize};
use std::env;

/// Well-known vault address, shared across networks
const DEFAULT_VAULT: &str = "0xBA12222222228d8Ba445958a75a0704d566BF2C8";

/// Batch relayer deployed alongside the boosted pools
const DEFAULT_BATCH_RELAYER: &str = "0xfeA793Aa415061C483D2390414275AD314B3F621";

/// Network addresses and chain parameters the orchestrator depends on
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub chain_id: u64,
    pub rpc_url: String,
    /// Vault contract: nonce source and relayer-approval target
    pub vault: Address,
    /// Batch relayer: target of every migration call
    pub batch_relayer: Address,
}

impl NetworkConfig {
    /// Load configuration from environment
    pub fn from_env() -> Result<Self, ConfigError> {
        let chain_id = env::var("CHAIN_ID")
            .unwrap_or_else(|_| "1".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidConfig("CHAIN_ID must be a number".to_string()))?;

        let rpc_url = env::var("RPC_URL").unwrap_or_else(|_| "http://localhost:8545".to_string());

        let vault = parse_address(
            &env::var("VAULT_ADDRESS").unwrap_or_else(|_| DEFAULT_VAULT.to_string()),
            "VAULT_ADDRESS",
        )?;

        let batch_relayer = parse_address(
            &env::var("BATCH_RELAYER_ADDRESS")
                .unwrap_or_else(|_| DEFAULT_BATCH_RELAYER.to_string()),
            "BATCH_RELAYER_ADDRESS",
        )?;

        let config = Self {
            chain_id,
            rpc_url,
            vault,
            batch_relayer,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chain_id == 0 {
            return Err(ConfigError::InvalidConfig(
                "chain_id must be non-zero".to_string(),
            ));
        }

        if self.rpc_url.is_empty() {
            return Err(ConfigError::MissingRequired("rpc_url".to_string()));
        }

        if self.vault.is_zero() {
            return Err(ConfigError::InvalidAddress("vault".to_string()));
        }

        if self.batch_relayer.is_zero() {
            return Err(ConfigError::InvalidAddress("batch_relayer".to_string()));
        }

        Ok(())
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            chain_id: 1,
            rpc_url: "http://localhost:8545".to_string(),
            vault: DEFAULT_VAULT.parse().expect("valid default vault address"),
            batch_relayer: DEFAULT_BATCH_RELAYER
                .parse()
                .expect("valid default relayer address"),
        }
    }
}

fn parse_address(value: &str, name: &str) -> Result<Address, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::InvalidAddress(name.to_string()))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid address for {0}")]
    InvalidAddress(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
