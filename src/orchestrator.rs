//! Migration orchestration: ordered wallet-signed steps over the batch relayer
//!
//! Given a source pool, balances, and enable flags, the orchestrator
//! produces the ordered step list the caller drives one entry at a time,
//! and executes each step: an optional relayer-approval signature followed
//! by one or two migration transactions. Calldata is built twice per
//! transaction: once with a zero expected-output placeholder for the
//! static call, then again with the simulated output before submission.

use std::sync::Arc;

use chrono::Utc;
use ethereum_types::U256;
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

use crate::config::NetworkConfig;
use crate::error::{MigrationError, Result};
use crate::provider::{EthereumProvider, WalletSigner};
use crate::relayer;
use crate::strategies::find_migration;
use crate::tracker::{ConfirmationWatcher, TransactionLog, TransactionRecord, TransactionState};
use crate::types::{scaled_migration_balances, PendingTransaction, Pool, TransactionRequest};
use crate::vault::VaultContract;

/// Gas ceiling for migration simulation and submission
pub const MAX_GAS_LIMIT: u64 = 8_000_000;

/// Authorization signatures expire half an hour after signing
pub const HALF_HOUR_MS: u64 = 30 * 60 * 1000;

/// One user-facing step in the migration flow
#[derive(Debug, Clone, Serialize)]
pub struct MigrationStep {
    pub label: &'static str,
    pub loading_label: &'static str,
    pub confirming_label: &'static str,
    pub step_tooltip: &'static str,
    pub kind: StepKind,
}

/// What a step does when executed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StepKind {
    /// Produce the relayer-approval signature
    Sign,
    /// Submit a migration transaction for the staked or unstaked balance
    Migrate { staked: bool, amount: U256 },
}

impl MigrationStep {
    fn sign() -> Self {
        Self {
            label: "Approve relayer",
            loading_label: "Check wallet",
            confirming_label: "Approving...",
            step_tooltip: "Sign a one-time approval letting the batch relayer migrate on your behalf",
            kind: StepKind::Sign,
        }
    }

    fn migrate(staked: bool, amount: U256) -> Self {
        Self {
            label: if staked {
                "Migrate staked balance"
            } else {
                "Migrate unstaked balance"
            },
            loading_label: "Confirm migration in wallet",
            confirming_label: "Confirming...",
            step_tooltip: "Move this balance into the new pool in a single transaction",
            kind: StepKind::Migrate { staked, amount },
        }
    }

    pub fn is_sign_action(&self) -> bool {
        self.kind == StepKind::Sign
    }
}

/// Result of executing a single step
#[derive(Debug, Clone)]
pub enum StepOutcome {
    /// The authorization blob now held in session state
    Signed(Vec<u8>),
    /// The submitted migration transaction
    Submitted(PendingTransaction),
}

/// Balances and flags the migration is parameterized on
#[derive(Debug, Clone)]
pub struct MigrationParams {
    /// Scaled BPT balance bound to every migration step
    pub bpt_balance_scaled: U256,
    pub unstaked_amount: U256,
    pub unstaked_enabled: bool,
    pub staked_amount: U256,
    pub staked_enabled: bool,
    pub from_pool: Pool,
}

/// Sequences and executes pool-migration steps
#[derive(Clone)]
pub struct MigrationOrchestrator {
    params: MigrationParams,
    config: NetworkConfig,
    provider: Arc<dyn EthereumProvider>,
    wallet: Arc<dyn WalletSigner>,
    vault: VaultContract,
    tx_log: TransactionLog,
    watcher: Arc<dyn ConfirmationWatcher>,
    /// Live relayer-approval status, externally mutable; `None` while unknown
    relayer_approval: Arc<RwLock<Option<bool>>>,
    /// Session signature: written once by the sign step, read by every
    /// subsequent migration call
    signature: Arc<RwLock<Option<Vec<u8>>>>,
    /// Serializes signature production so a re-entrant call cannot burn
    /// two vault nonces
    signing_guard: Arc<Mutex<()>>,
    state: Arc<RwLock<TransactionState>>,
}

impl MigrationOrchestrator {
    pub fn new(
        params: MigrationParams,
        config: NetworkConfig,
        provider: Arc<dyn EthereumProvider>,
        wallet: Arc<dyn WalletSigner>,
        watcher: Arc<dyn ConfirmationWatcher>,
        tx_log: TransactionLog,
        relayer_approval: Arc<RwLock<Option<bool>>>,
    ) -> Self {
        let vault = VaultContract::new(config.vault, provider.clone());
        Self {
            params,
            config,
            provider,
            wallet,
            vault,
            tx_log,
            watcher,
            relayer_approval,
            signature: Arc::new(RwLock::new(None)),
            signing_guard: Arc::new(Mutex::new(())),
            state: Arc::new(RwLock::new(TransactionState::default())),
        }
    }

    /// Ordered step list for the current inputs
    ///
    /// Recompute-on-read: call again whenever the relayer-approval status
    /// or the enable flags change. The staked step is queued first; the
    /// unstaked step moves ahead of it only when the unstaked amount is
    /// strictly larger. The sign step, when needed, is always first.
    pub async fn compute_actions(&self) -> Vec<MigrationStep> {
        let mut steps = Vec::new();

        if self.params.staked_enabled {
            steps.push(MigrationStep::migrate(true, self.params.bpt_balance_scaled));
        }

        if self.params.unstaked_enabled {
            let step = MigrationStep::migrate(false, self.params.bpt_balance_scaled);
            // the biggest one is migrated first
            if self.params.unstaked_amount > self.params.staked_amount {
                steps.insert(0, step);
            } else {
                steps.push(step);
            }
        }

        if !matches!(*self.relayer_approval.read().await, Some(true)) {
            steps.insert(0, MigrationStep::sign());
        }

        steps
    }

    /// Execute one step from [`compute_actions`](Self::compute_actions)
    pub async fn execute_step(&self, step: &MigrationStep) -> Result<StepOutcome> {
        match step.kind {
            StepKind::Sign => self.get_user_signature().await.map(StepOutcome::Signed),
            StepKind::Migrate { staked, amount } => self
                .approve_migration(staked, amount)
                .await
                .map(StepOutcome::Submitted),
        }
    }

    /// Produce the relayer-approval authorization signature
    ///
    /// Computes a fresh deadline, fetches the account's next vault nonce,
    /// signs the `setRelayerApproval` calldata, and stores the encoded
    /// blob in session state. Errors propagate; the caller re-invokes.
    pub async fn get_user_signature(&self) -> Result<Vec<u8>> {
        let _guard = self.signing_guard.lock().await;

        match self.sign_relayer_approval().await {
            Ok(encoded) => {
                info!("relayer approval signature produced");
                Ok(encoded)
            }
            Err(e) => {
                error!("relayer approval signing failed: {e}");
                Err(e)
            }
        }
    }

    async fn sign_relayer_approval(&self) -> Result<Vec<u8>> {
        let deadline_ms = Utc::now().timestamp_millis() as u64 + HALF_HOUR_MS;
        let deadline = U256::from(deadline_ms);
        let account = self.wallet.address();

        let nonce = self.vault.next_nonce(account).await?;
        let calldata =
            self.vault
                .encode_set_relayer_approval(account, self.config.batch_relayer, true);

        let signature = relayer::sign_set_relayer_approval_authorization(
            self.wallet.as_ref(),
            self.config.chain_id,
            self.vault.address(),
            &calldata,
            deadline,
            nonce,
        )?;
        let encoded = relayer::encode_calldata_authorization(&[], deadline, &signature);

        *self.signature.write().await = Some(encoded.clone());
        debug!(nonce = %nonce, deadline_ms, "stored relayer approval signature");
        Ok(encoded)
    }

    /// Build, simulate, and submit one migration transaction
    pub async fn approve_migration(
        &self,
        staked: bool,
        amount: U256,
    ) -> Result<PendingTransaction> {
        let account = self.wallet.address();

        let authorization = if matches!(*self.relayer_approval.read().await, Some(true)) {
            None
        } else {
            Some(
                self.signature
                    .read()
                    .await
                    .clone()
                    .ok_or(MigrationError::MissingSignature)?,
            )
        };

        let token_balances = scaled_migration_balances(&self.params.from_pool)?;

        let kind = find_migration(&self.params.from_pool.id).ok_or_else(|| {
            MigrationError::UnsupportedPool {
                pool_id: self.params.from_pool.id.clone(),
            }
        })?;

        // first pass with a zero expected-output placeholder, simulated only
        let query = kind.build_query(
            self.config.batch_relayer,
            account,
            amount,
            U256::zero(),
            staked,
            &token_balances,
            authorization.as_deref(),
        );
        let static_result = self
            .provider
            .call(&TransactionRequest {
                to: query.to,
                data: query.data,
                gas_limit: MAX_GAS_LIMIT,
            })
            .await
            .map_err(|e| MigrationError::Simulation(e.to_string()))?;

        let expected_out = kind.decode_expected_output(&static_result, staked)?;
        debug!(%expected_out, staked, "simulated migration output");

        // rebuild with the amount just observed from simulation
        let query = kind.build_query(
            self.config.batch_relayer,
            account,
            amount,
            expected_out,
            staked,
            &token_balances,
            authorization.as_deref(),
        );
        let pending = self
            .provider
            .send_transaction(&TransactionRequest {
                to: query.to,
                data: query.data,
                gas_limit: MAX_GAS_LIMIT,
            })
            .await
            .map_err(|e| MigrationError::Submission(e.to_string()))?;

        info!(hash = %pending.hash, staked, "migration transaction submitted");
        self.handle_transaction(&pending).await;

        Ok(pending)
    }

    /// Record the submitted transaction and watch it to a terminal state
    ///
    /// Confirmation failure clears the approving flag without erroring;
    /// the final watcher outcome lands in [`TransactionState::approved`].
    async fn handle_transaction(&self, pending: &PendingTransaction) {
        self.tx_log
            .record(TransactionRecord {
                hash: pending.hash,
                action: "approve".to_string(),
                summary: "Approve pool migration".to_string(),
                contract_address: self.config.vault,
                submitted_at: Utc::now(),
            })
            .await;

        self.state.write().await.approving = true;

        let watcher = self.watcher.clone();
        let state = self.state.clone();
        let hash = pending.hash;
        tokio::spawn(async move {
            let confirmed = watcher.wait_for_confirmation(hash).await;
            let mut state = state.write().await;
            state.approving = false;
            state.approved = confirmed;
            if confirmed {
                info!(%hash, "migration transaction confirmed");
            } else {
                warn!(%hash, "migration transaction failed");
            }
        });
    }

    /// Current approval flags
    pub async fn transaction_state(&self) -> TransactionState {
        *self.state.read().await
    }

    /// The session authorization blob, if the sign step has run
    pub async fn session_signature(&self) -> Option<Vec<u8>> {
        self.signature.read().await.clone()
    }
}
