//! Vault contract handle: relayer-approval nonces and calldata

use std::sync::Arc;

use ethereum_types::{Address, U256};

use crate::abi::{self, Param};
use crate::error::{MigrationError, Result};
use crate::provider::EthereumProvider;
use crate::types::TransactionRequest;

/// Gas ceiling for read-only vault calls
const READ_GAS_LIMIT: u64 = 100_000;

/// Thin handle over the deployed vault contract
#[derive(Clone)]
pub struct VaultContract {
    address: Address,
    provider: Arc<dyn EthereumProvider>,
}

impl VaultContract {
    pub fn new(address: Address, provider: Arc<dyn EthereumProvider>) -> Self {
        Self { address, provider }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Next relayer-approval nonce for an account
    pub async fn next_nonce(&self, account: Address) -> Result<U256> {
        let data = abi::encode_call(
            abi::selector("getNextNonce(address)"),
            &[Param::Address(account)],
        );
        let request = TransactionRequest {
            to: self.address,
            data,
            gas_limit: READ_GAS_LIMIT,
        };

        let raw = self
            .provider
            .call(&request)
            .await
            .map_err(|e| MigrationError::NonceFetch(e.to_string()))?;
        abi::decode_u256(&raw).map_err(|e| MigrationError::NonceFetch(e.to_string()))
    }

    /// Calldata for `setRelayerApproval(sender, relayer, approved)`
    pub fn encode_set_relayer_approval(
        &self,
        sender: Address,
        relayer: Address,
        approved: bool,
    ) -> Vec<u8> {
        abi::encode_call(
            abi::selector("setRelayerApproval(address,address,bool)"),
            &[
                Param::Address(sender),
                Param::Address(relayer),
                Param::Bool(approved),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Result as AnyResult};
    use async_trait::async_trait;
    use std::sync::Mutex;

    use crate::types::PendingTransaction;

    struct RecordingProvider {
        response: Vec<u8>,
        calls: Mutex<Vec<TransactionRequest>>,
    }

    #[async_trait]
    impl EthereumProvider for RecordingProvider {
        async fn call(&self, request: &TransactionRequest) -> AnyResult<Vec<u8>> {
            self.calls.lock().unwrap().push(request.clone());
            Ok(self.response.clone())
        }

        async fn send_transaction(
            &self,
            _request: &TransactionRequest,
        ) -> AnyResult<PendingTransaction> {
            Err(anyhow!("not used"))
        }
    }

    #[tokio::test]
    async fn test_next_nonce_decodes_word() {
        let provider = Arc::new(RecordingProvider {
            response: abi::encode_u256(U256::from(7)).to_vec(),
            calls: Mutex::new(Vec::new()),
        });
        let vault = VaultContract::new(Address::repeat_byte(0xba), provider.clone());

        let nonce = vault.next_nonce(Address::repeat_byte(0x01)).await.unwrap();
        assert_eq!(nonce, U256::from(7));

        let calls = provider.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].to, Address::repeat_byte(0xba));
        assert_eq!(&calls[0].data[..4], &abi::selector("getNextNonce(address)"));
    }

    #[tokio::test]
    async fn test_next_nonce_maps_provider_error() {
        struct FailingProvider;

        #[async_trait]
        impl EthereumProvider for FailingProvider {
            async fn call(&self, _request: &TransactionRequest) -> AnyResult<Vec<u8>> {
                Err(anyhow!("node unreachable"))
            }

            async fn send_transaction(
                &self,
                _request: &TransactionRequest,
            ) -> AnyResult<PendingTransaction> {
                Err(anyhow!("not used"))
            }
        }

        let vault = VaultContract::new(Address::repeat_byte(0xba), Arc::new(FailingProvider));
        let err = vault.next_nonce(Address::zero()).await.unwrap_err();
        assert!(matches!(err, MigrationError::NonceFetch(_)));
    }

    #[test]
    fn test_set_relayer_approval_calldata() {
        let provider = Arc::new(RecordingProvider {
            response: Vec::new(),
            calls: Mutex::new(Vec::new()),
        });
        let vault = VaultContract::new(Address::repeat_byte(0xba), provider);

        let sender = Address::repeat_byte(0x01);
        let relayer = Address::repeat_byte(0x02);
        let data = vault.encode_set_relayer_approval(sender, relayer, true);

        assert_eq!(data.len(), 4 + 3 * 32);
        assert_eq!(
            &data[..4],
            &abi::selector("setRelayerApproval(address,address,bool)")
        );
        assert_eq!(&data[4 + 12..4 + 32], sender.as_bytes());
        assert_eq!(&data[4 + 32 + 12..4 + 64], relayer.as_bytes());
        assert_eq!(data[4 + 95], 1);
    }
}
