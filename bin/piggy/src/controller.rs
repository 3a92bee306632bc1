//! Session controller.
//!
//! The controller owns everything the front end shows: the connected
//! account, the ledger handle, the network state, the busy flag and the
//! deposit snapshot. Readers get the state through [`Controller::subscribe`];
//! only the controller writes it.
//!
//! The deposit snapshot is refreshed by a full reconciliation against the
//! ledger whenever the account or the ledger handle changes, and after every
//! confirmed action.

use crate::metrics::Metrics;
use action::Action;
use alloy_primitives::Address;
use client::{Wallet, WalletError};
use config::NetworkConfig;
use deposit::{get_deposits, select_matured, Deposit, LedgerError, LedgerReader};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Connection state of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkState {
    /// No account connected
    Disconnected,
    /// Connected, but the wallet is on another chain
    WrongNetwork { chain_id: u64 },
    /// Connected to the vault's chain
    Ready,
}

/// Everything the render layer needs, replaced as a whole on every change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub account: Option<Address>,
    pub network: NetworkState,
    /// An action is in flight; further actions are rejected
    pub busy: bool,
    pub deposits: Arc<Vec<Deposit>>,
}

#[derive(Error, Debug)]
pub enum ControllerError {
    #[error("Wallet not connected")]
    Disconnected,

    #[error("Wrong network: wallet is on chain {actual}, expected {expected}")]
    WrongNetwork { expected: u64, actual: u64 },

    #[error("No ledger configured")]
    NoLedger,

    #[error("Another action is in progress")]
    Busy,

    #[error("Action not ready: {0}")]
    NotReady(String),

    #[error("Already done: {0}")]
    AlreadyCompleted(String),

    #[error("No matured deposits")]
    NoMaturedDeposits,

    #[error(transparent)]
    Wallet(#[from] WalletError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// The ledger or wallet rejected a write
    #[error("{message}")]
    ActionFailed { action: &'static str, message: String },
}

/// A confirmed action.
#[derive(Debug, Clone)]
pub struct ActionOutcome {
    pub description: String,
    pub result: action::Result,
    /// The write confirmed but the deposit list could not be re-read, so the
    /// snapshot predates it
    pub stale: bool,
}

pub struct Controller<R> {
    network: NetworkConfig,
    account: Option<Address>,
    ledger: Option<Arc<R>>,
    state: NetworkState,
    busy: bool,
    deposits: Arc<Vec<Deposit>>,
    snapshot: watch::Sender<Snapshot>,
    metrics: Metrics,
}

impl<R> Controller<R>
where
    R: LedgerReader,
{
    pub fn new(network: NetworkConfig, metrics: Metrics) -> Self {
        let deposits = Arc::new(Vec::new());
        let (snapshot, _) = watch::channel(Snapshot {
            account: None,
            network: NetworkState::Disconnected,
            busy: false,
            deposits: deposits.clone(),
        });

        Self {
            network,
            account: None,
            ledger: None,
            state: NetworkState::Disconnected,
            busy: false,
            deposits,
            snapshot,
            metrics,
        }
    }

    /// Receive every new snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshot.subscribe()
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.snapshot.borrow().clone()
    }

    pub fn deposits(&self) -> &[Deposit] {
        &self.deposits
    }

    pub const fn account(&self) -> Option<Address> {
        self.account
    }

    pub const fn network_state(&self) -> NetworkState {
        self.state
    }

    pub const fn is_busy(&self) -> bool {
        self.busy
    }

    pub const fn network(&self) -> &NetworkConfig {
        &self.network
    }

    fn publish(&self) {
        self.snapshot.send_replace(Snapshot {
            account: self.account,
            network: self.state,
            busy: self.busy,
            deposits: self.deposits.clone(),
        });
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Connection
    // ─────────────────────────────────────────────────────────────────────────────

    /// Run the wallet handshake: request accounts, bring the wallet to the
    /// vault's chain, then make the first account active.
    ///
    /// Ends in [`NetworkState::WrongNetwork`] when the wallet cannot or will
    /// not switch.
    pub async fn connect<W>(&mut self, wallet: &W) -> Result<Address, ControllerError>
    where
        W: Wallet,
    {
        let accounts = wallet.request_accounts().await?;
        let account = *accounts.first().ok_or(WalletError::NoAccounts)?;

        info!(account = %account, "Wallet connected");

        // A failed deposit read must not stop the handshake.
        if let Err(e) = self.set_account(Some(account)).await {
            warn!(account = %account, error = %e, "Deposits unavailable after connect");
        }
        self.ensure_network(wallet).await?;

        Ok(account)
    }

    /// Ask the wallet to switch to the vault's chain, registering the chain
    /// first when the wallet does not know it.
    pub async fn ensure_network<W>(&mut self, wallet: &W) -> Result<NetworkState, ControllerError>
    where
        W: Wallet,
    {
        let expected = self.network.chain_id;
        let chain_id = wallet.chain_id().await?;

        if chain_id != expected {
            info!(chain_id, expected, "Wallet on wrong network, requesting switch");

            match wallet.switch_chain(expected).await {
                Ok(()) => {}
                Err(WalletError::UnrecognizedChain(_)) => {
                    info!(chain = %self.network.chain_name, "Adding chain to wallet");
                    if let Err(e) = wallet.add_chain(&self.network.add_chain_params()).await {
                        warn!(error = %e, "Failed to add chain");
                    }
                }
                Err(e) => warn!(error = %e, "Failed to switch chain"),
            }
        }

        let chain_id = wallet.chain_id().await?;
        self.on_chain_changed(chain_id);

        Ok(self.state)
    }

    /// Chain-change notification from the wallet.
    pub fn on_chain_changed(&mut self, chain_id: u64) {
        self.metrics.set_chain_id(chain_id);

        let state = if self.account.is_none() {
            NetworkState::Disconnected
        } else if chain_id == self.network.chain_id {
            NetworkState::Ready
        } else {
            NetworkState::WrongNetwork { chain_id }
        };

        if state != self.state {
            debug!(?state, chain_id, "Network state changed");
            self.state = state;
            self.publish();
        }
    }

    /// Forget the account and its deposits.
    pub fn disconnect(&mut self) {
        self.account = None;
        self.state = NetworkState::Disconnected;
        self.deposits = Arc::new(Vec::new());
        self.publish();
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Reconciliation
    // ─────────────────────────────────────────────────────────────────────────────

    /// Change the active account.
    ///
    /// Returns whether a reconciliation ran. Setting the current account
    /// again is a no-op.
    pub async fn set_account(&mut self, account: Option<Address>) -> Result<bool, ControllerError> {
        if self.account == account {
            return Ok(false);
        }

        debug!(?account, "Active account changed");
        self.account = account;
        if account.is_none() {
            self.state = NetworkState::Disconnected;
        }
        self.deposits = Arc::new(Vec::new());
        self.publish();

        self.on_identity_change().await
    }

    /// Change the ledger handle.
    ///
    /// Returns whether a reconciliation ran. Setting the same handle again
    /// is a no-op.
    pub async fn set_ledger(&mut self, ledger: Option<Arc<R>>) -> Result<bool, ControllerError> {
        let same = match (&self.ledger, &ledger) {
            (Some(current), Some(new)) => Arc::ptr_eq(current, new),
            (None, None) => true,
            _ => false,
        };
        if same {
            return Ok(false);
        }

        debug!(present = ledger.is_some(), "Ledger handle changed");
        self.ledger = ledger;
        self.deposits = Arc::new(Vec::new());
        self.publish();

        self.on_identity_change().await
    }

    async fn on_identity_change(&mut self) -> Result<bool, ControllerError> {
        if self.account.is_none() || self.ledger.is_none() {
            return Ok(false);
        }

        self.reconcile().await?;
        Ok(true)
    }

    /// Re-read the full deposit list and replace the snapshot.
    ///
    /// On error the previous snapshot stays in place.
    pub async fn reconcile(&mut self) -> Result<usize, ControllerError> {
        let account = self.account.ok_or(ControllerError::Disconnected)?;
        let ledger = self.ledger.clone().ok_or(ControllerError::NoLedger)?;
        let native_symbol = self.network.native_currency.symbol.clone();

        match get_deposits(ledger.as_ref(), account, &native_symbol).await {
            Ok(deposits) => {
                let count = deposits.len();
                let matured = select_matured(&deposits, deposit::unix_now()).len();

                debug!(account = %account, count, matured, "Deposits reconciled");
                self.metrics.record_reconciliation(count, matured);

                self.deposits = Arc::new(deposits);
                self.publish();
                Ok(count)
            }
            Err(e) => {
                warn!(account = %account, error = %e, "Failed to load deposits");
                self.metrics.record_reconciliation_failure();
                Err(e.into())
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Actions
    // ─────────────────────────────────────────────────────────────────────────────

    fn ensure_ready(&self) -> Result<(), ControllerError> {
        if self.account.is_none() {
            return Err(ControllerError::Disconnected);
        }

        match self.state {
            NetworkState::Disconnected => return Err(ControllerError::Disconnected),
            NetworkState::WrongNetwork { chain_id } => {
                return Err(ControllerError::WrongNetwork {
                    expected: self.network.chain_id,
                    actual: chain_id,
                })
            }
            NetworkState::Ready => {}
        }

        if self.ledger.is_none() {
            return Err(ControllerError::NoLedger);
        }

        Ok(())
    }

    fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
        self.publish();
    }

    /// Run a mutating action and reconcile once it is confirmed.
    ///
    /// Only one action runs at a time; while one is in flight every other
    /// request fails with [`ControllerError::Busy`]. A confirmed action
    /// succeeds even when the follow-up read fails, with
    /// [`ActionOutcome::stale`] set.
    pub async fn execute<A>(&mut self, action: &mut A) -> Result<ActionOutcome, ControllerError>
    where
        A: Action,
    {
        if let Err(e) = self.ensure_ready() {
            self.metrics.record_action_rejected("not_connected");
            return Err(e);
        }

        if self.busy {
            self.metrics.record_action_rejected("busy");
            return Err(ControllerError::Busy);
        }

        self.set_busy(true);
        let outcome = self.run(action).await;
        self.set_busy(false);

        match &outcome {
            Ok(outcome) => {
                self.metrics.record_action_success(action.name());
                info!(
                    tx_hash = %outcome.result.tx_hash,
                    block_number = outcome.result.block_number,
                    "{} succeeded",
                    outcome.description
                );
            }
            Err(e) => {
                self.metrics.record_action_failure(action.name());
                warn!(action = action.name(), error = %e, "Action failed");
            }
        }

        outcome
    }

    async fn run<A>(&mut self, action: &mut A) -> Result<ActionOutcome, ControllerError>
    where
        A: Action,
    {
        let description = action.description();

        let ready = action
            .is_ready()
            .await
            .map_err(|e| ControllerError::NotReady(format!("{description}: {e}")))?;
        if !ready {
            return Err(ControllerError::NotReady(description));
        }

        let completed = action
            .is_completed()
            .await
            .map_err(|e| action_failed(action, &e))?;
        if completed {
            return Err(ControllerError::AlreadyCompleted(description));
        }

        let result = action
            .execute()
            .await
            .map_err(|e| action_failed(action, &e))?;

        // The write is final at this point; a failed read only leaves the
        // snapshot behind.
        let stale = match self.reconcile().await {
            Ok(_) => false,
            Err(e) => {
                warn!(
                    tx_hash = %result.tx_hash,
                    error = %e,
                    "Action confirmed, deposit list not refreshed"
                );
                true
            }
        };

        Ok(ActionOutcome {
            description: action.description(),
            result,
            stale,
        })
    }

    /// Withdraw every matured deposit in one batch.
    ///
    /// `build` receives the matured indices in ascending order. Nothing is
    /// sent when no deposit has matured.
    pub async fn withdraw_matured<A, F>(
        &mut self,
        now: u64,
        build: F,
    ) -> Result<ActionOutcome, ControllerError>
    where
        A: Action,
        F: FnOnce(Vec<u64>) -> A,
    {
        self.ensure_ready()?;

        let indices = select_matured(&self.deposits, now);
        if indices.is_empty() {
            self.metrics.record_action_rejected("no_matured_deposits");
            return Err(ControllerError::NoMaturedDeposits);
        }

        let mut action = build(indices);
        self.execute(&mut action).await
    }
}

/// Most specific message in the error chain, or the action's generic one.
fn action_failed<A>(action: &A, err: &eyre::Report) -> ControllerError
where
    A: Action,
{
    let specific = err.root_cause().to_string();
    let message = if specific.trim().is_empty() {
        action.failure_message().to_string()
    } else {
        specific
    };

    ControllerError::ActionFailed {
        action: action.name(),
        message,
    }
}
