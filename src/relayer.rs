//! Relayer-approval authorization signing and encoding
//!
//! Produces the one-time signature that lets the batch relayer act on the
//! user's behalf: an EIP-712 signature over the `setRelayerApproval`
//! calldata, nonce, and deadline, wrapped into the calldata-authorization
//! blob the relayer expects.

use ethereum_types::{Address, H256, U256};
use web3::signing::keccak256;

use crate::abi;
use crate::error::{MigrationError, Result};
use crate::provider::WalletSigner;

const DOMAIN_NAME: &[u8] = b"Balancer V2 Vault";
const DOMAIN_VERSION: &[u8] = b"1";

/// EIP-712 domain separator for the vault contract
pub fn domain_separator(chain_id: u64, vault: Address) -> [u8; 32] {
    let domain_type_hash = keccak256(
        b"EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)",
    );

    let mut encoded = Vec::with_capacity(5 * 32);
    encoded.extend_from_slice(&domain_type_hash);
    encoded.extend_from_slice(&keccak256(DOMAIN_NAME));
    encoded.extend_from_slice(&keccak256(DOMAIN_VERSION));
    encoded.extend_from_slice(&abi::encode_u256(U256::from(chain_id)));
    encoded.extend_from_slice(&abi::encode_address(vault));

    keccak256(&encoded)
}

/// Struct hash for a relayer-approval authorization
fn approval_struct_hash(calldata: &[u8], sender: Address, nonce: U256, deadline: U256) -> [u8; 32] {
    let type_hash = keccak256(
        b"SetRelayerApproval(bytes calldata,address sender,uint256 nonce,uint256 deadline)",
    );

    let mut encoded = Vec::with_capacity(5 * 32);
    encoded.extend_from_slice(&type_hash);
    encoded.extend_from_slice(&keccak256(calldata));
    encoded.extend_from_slice(&abi::encode_address(sender));
    encoded.extend_from_slice(&abi::encode_u256(nonce));
    encoded.extend_from_slice(&abi::encode_u256(deadline));

    keccak256(&encoded)
}

/// Sign a `setRelayerApproval` authorization with the connected wallet
///
/// The signature covers the exact calldata plus the account's next vault
/// nonce and an expiry deadline, under the vault's EIP-712 domain.
pub fn sign_set_relayer_approval_authorization(
    wallet: &dyn WalletSigner,
    chain_id: u64,
    vault: Address,
    calldata: &[u8],
    deadline: U256,
    nonce: U256,
) -> Result<[u8; 65]> {
    let domain = domain_separator(chain_id, vault);
    let struct_hash = approval_struct_hash(calldata, wallet.address(), nonce, deadline);

    let mut message = Vec::with_capacity(2 + 64);
    message.push(0x19);
    message.push(0x01);
    message.extend_from_slice(&domain);
    message.extend_from_slice(&struct_hash);

    let digest = H256::from(keccak256(&message));
    wallet
        .sign_hash(digest)
        .map_err(|e| MigrationError::Signing(e.to_string()))
}

/// Wrap a signature into the calldata-authorization blob consumed by the
/// relayer: `calldata ‖ deadline ‖ signature`
pub fn encode_calldata_authorization(
    calldata: &[u8],
    deadline: U256,
    signature: &[u8; 65],
) -> Vec<u8> {
    let mut encoded = Vec::with_capacity(calldata.len() + 32 + 65);
    encoded.extend_from_slice(calldata);
    encoded.extend_from_slice(&abi::encode_u256(deadline));
    encoded.extend_from_slice(signature);
    encoded
}

/// Deadline encoded into an authorization blob produced with empty calldata
pub fn authorization_deadline(blob: &[u8]) -> Result<U256> {
    if blob.len() < 32 + 65 {
        return Err(MigrationError::Decode(
            "authorization blob too short".to_string(),
        ));
    }
    Ok(U256::from_big_endian(&blob[..32]))
}
