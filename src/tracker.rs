//! Transaction log and confirmation tracking glue

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ethereum_types::{Address, H256};
use serde::Serialize;
use tokio::sync::RwLock;

/// A submitted transaction as recorded in the process-wide log
#[derive(Debug, Clone, Serialize)]
pub struct TransactionRecord {
    pub hash: H256,
    pub action: String,
    pub summary: String,
    pub contract_address: Address,
    pub submitted_at: DateTime<Utc>,
}

/// Process-wide transaction recorder
#[derive(Clone, Default)]
pub struct TransactionLog {
    records: Arc<RwLock<Vec<TransactionRecord>>>,
}

impl TransactionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record(&self, record: TransactionRecord) {
        self.records.write().await.push(record);
    }

    pub async fn records(&self) -> Vec<TransactionRecord> {
        self.records.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

/// External confirmation watcher
///
/// Resolves `true` when the transaction confirmed and `false` when it was
/// mined but failed. Confirmation failure is terminal and never an error.
#[async_trait]
pub trait ConfirmationWatcher: Send + Sync {
    async fn wait_for_confirmation(&self, hash: H256) -> bool;
}

/// Transient approval state observed by the caller
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct TransactionState {
    pub approved: bool,
    pub approving: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_records_in_order() {
        let log = TransactionLog::new();
        assert!(log.is_empty().await);

        for i in 0..3u8 {
            log.record(TransactionRecord {
                hash: H256::repeat_byte(i),
                action: "approve".to_string(),
                summary: format!("tx {i}"),
                contract_address: Address::repeat_byte(0xba),
                submitted_at: Utc::now(),
            })
            .await;
        }

        let records = log.records().await;
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].hash, H256::repeat_byte(0));
        assert_eq!(records[2].hash, H256::repeat_byte(2));
    }

    #[tokio::test]
    async fn test_log_is_shared_across_clones() {
        let log = TransactionLog::new();
        let clone = log.clone();

        clone
            .record(TransactionRecord {
                hash: H256::repeat_byte(0xaa),
                action: "approve".to_string(),
                summary: "shared".to_string(),
                contract_address: Address::zero(),
                submitted_at: Utc::now(),
            })
            .await;

        assert_eq!(log.len().await, 1);
    }
}
