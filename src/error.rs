//! Error taxonomy for the migration orchestrator

use thiserror::Error;

/// Errors surfaced by migration orchestration
///
/// Every variant propagates to the caller; there is no internal retry.
/// Confirmation failure of a mined transaction is not an error — it is
/// reported through [`crate::tracker::TransactionState`] instead.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// Wallet rejected the signature request or signature production failed
    #[error("signing failed: {0}")]
    Signing(String),

    /// Relayer-approval nonce could not be fetched from the vault
    #[error("nonce fetch failed: {0}")]
    NonceFetch(String),

    /// Static call reverted; no real transaction was sent
    #[error("migration simulation reverted: {0}")]
    Simulation(String),

    /// sendTransaction reverted or was rejected
    #[error("transaction submission failed: {0}")]
    Submission(String),

    /// The source pool has no migration strategy configured
    #[error("no migration is configured for pool {pool_id}")]
    UnsupportedPool { pool_id: String },

    /// A transaction step that needs relayer authorization ran before the
    /// sign step populated the session signature
    #[error("relayer approval signature has not been produced yet")]
    MissingSignature,

    /// Simulated return data did not decode to an expected output amount
    #[error("failed to decode simulated output: {0}")]
    Decode(String),

    /// A token balance could not be scaled to fixed point
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
}

pub type Result<T> = std::result::Result<T, MigrationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MigrationError::UnsupportedPool {
            pool_id: "0xdeadbeef".to_string(),
        };
        assert!(err.to_string().contains("0xdeadbeef"));

        let err = MigrationError::MissingSignature;
        assert!(err.to_string().contains("signature"));
    }
}
