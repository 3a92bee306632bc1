use alloy_primitives::{Address, U256};
use alloy_provider::Provider;
use binding::piggy::IPiggyBank;
use tracing::info;

/// Input for a single withdrawal.
#[derive(Debug, Clone)]
pub struct Withdraw {
    /// PiggyBank contract address
    pub piggy_bank: Address,
    /// Owner of the deposit
    pub account: Address,
    /// Deposit index
    pub index: u64,
}

/// Withdraw one matured deposit.
pub struct WithdrawAction<P> {
    provider: P,
    withdraw: Withdraw,
}

impl<P> WithdrawAction<P>
where
    P: Provider + Clone,
{
    pub const fn new(provider: P, withdraw: Withdraw) -> Self {
        Self { provider, withdraw }
    }
}

impl<P> crate::Action for WithdrawAction<P>
where
    P: Provider + Clone,
{
    async fn is_ready(&self) -> eyre::Result<bool> {
        Ok(self.withdraw.piggy_bank != Address::ZERO)
    }

    async fn is_completed(&self) -> eyre::Result<bool> {
        let contract = IPiggyBank::new(self.withdraw.piggy_bank, &self.provider);
        let deposit = contract
            .getDeposit(self.withdraw.account, U256::from(self.withdraw.index))
            .call()
            .await?;

        Ok(deposit.withdrawn)
    }

    async fn execute(&mut self) -> eyre::Result<crate::Result> {
        let contract = IPiggyBank::new(self.withdraw.piggy_bank, &self.provider);
        let tx = contract
            .withdraw(U256::from(self.withdraw.index))
            .from(self.withdraw.account)
            .send()
            .await?;

        let tx_hash = *tx.tx_hash();
        let receipt = tx.get_receipt().await?;
        if !receipt.status() {
            eyre::bail!("Transaction reverted");
        }

        info!(
            tx_hash = %tx_hash,
            block_number = receipt.block_number,
            index = self.withdraw.index,
            "Withdrawal confirmed."
        );

        Ok(crate::Result {
            tx_hash,
            block_number: receipt.block_number,
            gas_used: Some(U256::from(receipt.gas_used)),
        })
    }

    fn description(&self) -> String {
        format!(
            "Withdraw deposit #{} of {}",
            self.withdraw.index, self.withdraw.account
        )
    }

    fn name(&self) -> &'static str {
        "withdraw"
    }

    fn failure_message(&self) -> &'static str {
        "Withdraw failed"
    }
}

/// Input for a batch withdrawal.
#[derive(Debug, Clone)]
pub struct WithdrawBatch {
    /// PiggyBank contract address
    pub piggy_bank: Address,
    /// Owner of the deposits
    pub account: Address,
    /// Deposit indices, ascending
    pub indices: Vec<u64>,
}

/// Withdraw several matured deposits in one transaction.
pub struct WithdrawBatchAction<P> {
    provider: P,
    batch: WithdrawBatch,
}

impl<P> WithdrawBatchAction<P>
where
    P: Provider + Clone,
{
    pub const fn new(provider: P, batch: WithdrawBatch) -> Self {
        Self { provider, batch }
    }
}

impl<P> crate::Action for WithdrawBatchAction<P>
where
    P: Provider + Clone,
{
    async fn is_ready(&self) -> eyre::Result<bool> {
        Ok(self.batch.piggy_bank != Address::ZERO && !self.batch.indices.is_empty())
    }

    async fn is_completed(&self) -> eyre::Result<bool> {
        Ok(false)
    }

    async fn execute(&mut self) -> eyre::Result<crate::Result> {
        let indices: Vec<U256> = self.batch.indices.iter().copied().map(U256::from).collect();

        let contract = IPiggyBank::new(self.batch.piggy_bank, &self.provider);
        let tx = contract
            .withdrawBatch(indices)
            .from(self.batch.account)
            .send()
            .await?;

        let tx_hash = *tx.tx_hash();
        let receipt = tx.get_receipt().await?;
        if !receipt.status() {
            eyre::bail!("Transaction reverted");
        }

        info!(
            tx_hash = %tx_hash,
            block_number = receipt.block_number,
            indices = ?self.batch.indices,
            "Batch withdrawal confirmed."
        );

        Ok(crate::Result {
            tx_hash,
            block_number: receipt.block_number,
            gas_used: Some(U256::from(receipt.gas_used)),
        })
    }

    fn description(&self) -> String {
        format!(
            "Withdraw {} matured deposits {:?} of {}",
            self.batch.indices.len(),
            self.batch.indices,
            self.batch.account
        )
    }

    fn name(&self) -> &'static str {
        "withdraw_batch"
    }

    fn failure_message(&self) -> &'static str {
        "Batch withdraw failed"
    }
}
