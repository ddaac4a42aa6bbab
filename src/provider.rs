//! Wallet and node collaborator seams
//!
//! The orchestrator talks to the chain through two narrow traits: an
//! [`EthereumProvider`] for static calls and submissions, and a
//! [`WalletSigner`] for the connected account and raw hash signing.
//! [`LocalWallet`] is the in-process secp256k1 implementation.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use ethereum_types::{Address, H256};
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};
use web3::signing::keccak256;

use crate::types::{PendingTransaction, TransactionRequest};

/// Read and write access to the chain
#[async_trait]
pub trait EthereumProvider: Send + Sync {
    /// Simulated call: returns would-be output without mutating state
    async fn call(&self, request: &TransactionRequest) -> Result<Vec<u8>>;

    /// Submit a real transaction
    async fn send_transaction(&self, request: &TransactionRequest) -> Result<PendingTransaction>;
}

/// The connected account and its signing capability
pub trait WalletSigner: Send + Sync {
    /// Current account address
    fn address(&self) -> Address;

    /// Produce a recoverable ECDSA signature (r ‖ s ‖ v) over a 32-byte hash
    fn sign_hash(&self, hash: H256) -> Result<[u8; 65]>;
}

/// In-process wallet backed by a secp256k1 private key
pub struct LocalWallet {
    secret_key: SecretKey,
    address: Address,
}

impl LocalWallet {
    /// Create a wallet from a hex-encoded private key
    pub fn new(private_key: &str) -> Result<Self> {
        let private_key_bytes = hex::decode(private_key.trim_start_matches("0x"))
            .context("Invalid hex private key")?;
        let secret_key = SecretKey::from_slice(&private_key_bytes)
            .map_err(|e| anyhow!("Invalid private key: {}", e))?;

        let address = derive_address(&secret_key);

        Ok(Self {
            secret_key,
            address,
        })
    }
}

impl WalletSigner for LocalWallet {
    fn address(&self) -> Address {
        self.address
    }

    fn sign_hash(&self, hash: H256) -> Result<[u8; 65]> {
        let secp = Secp256k1::new();
        let message = Message::from_slice(hash.as_bytes())
            .context("Failed to create message")?;
        let (recovery_id, signature_bytes) = secp
            .sign_ecdsa_recoverable(&message, &self.secret_key)
            .serialize_compact();

        let mut sig_with_recovery = [0u8; 65];
        sig_with_recovery[..64].copy_from_slice(&signature_bytes);
        sig_with_recovery[64] = 27 + recovery_id.to_i32() as u8;

        Ok(sig_with_recovery)
    }
}

/// Derive the account address: keccak of the uncompressed public key,
/// last 20 bytes
fn derive_address(secret_key: &SecretKey) -> Address {
    let secp = Secp256k1::new();
    let public_key = PublicKey::from_secret_key(&secp, secret_key);
    let public_key_bytes = public_key.serialize_uncompressed();

    // skip the 0x04 prefix before hashing
    let hash = keccak256(&public_key_bytes[1..]);
    let mut address_bytes = [0u8; 20];
    address_bytes.copy_from_slice(&hash[12..]);
    Address::from(address_bytes)
}
