pub mod deposit;
pub mod duration;
pub mod withdraw;

use alloy_primitives::{TxHash, U256};
use std::future::Future;

pub use duration::{LockDuration, LockDurationError, LockUnit};

/// Trait for executable onchain actions.
pub trait Action: Send + Sync {
    /// Check to see if the action is ready to be executed.
    ///
    /// Returns true if all preconditions are met. An error carries the
    /// reason the input is unusable. Either way, an action that is not ready
    /// must not be sent to the ledger.
    fn is_ready(&self) -> impl Future<Output = eyre::Result<bool>> + Send;

    /// Check if the action has already been completed.
    ///
    /// Returns true if the action was already executed successfully.
    fn is_completed(&self) -> impl Future<Output = eyre::Result<bool>> + Send;

    /// Execute the action.
    ///
    /// Resolves once the transaction is confirmed.
    fn execute(&mut self) -> impl Future<Output = eyre::Result<Result>> + Send;

    /// Get a human-readable description of this action.
    fn description(&self) -> String;

    /// Short stable name, used as a metrics label.
    fn name(&self) -> &'static str;

    /// Message reported when execution fails without a more specific reason.
    fn failure_message(&self) -> &'static str;
}

/// Result of an action.
#[derive(Debug, Clone)]
pub struct Result {
    /// Transaction hash
    pub tx_hash: TxHash,
    /// Block number where transaction was included
    pub block_number: Option<u64>,
    /// Gas used
    pub gas_used: Option<U256>,
}
