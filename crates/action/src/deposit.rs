use ::deposit::{parse_amount, NATIVE_DECIMALS, NATIVE_TOKEN};
use crate::duration::LockDuration;
use alloy_primitives::{Address, U256};
use alloy_provider::Provider;
use binding::{piggy::IPiggyBank, token::IERC20};
use tracing::info;

/// Input for a native coin deposit.
#[derive(Debug, Clone)]
pub struct DepositNative {
    /// PiggyBank contract address
    pub piggy_bank: Address,
    /// Account that sends the deposit
    pub depositor: Address,
    /// Amount as entered by the user, in whole coins ("0.05")
    pub amount: String,
    /// Lock duration
    pub lock: LockDuration,
}

/// Lock native coin in the vault.
pub struct DepositNativeAction<P> {
    provider: P,
    deposit: DepositNative,
}

impl<P> DepositNativeAction<P>
where
    P: Provider + Clone,
{
    pub const fn new(provider: P, deposit: DepositNative) -> Self {
        Self { provider, deposit }
    }

    /// Validate the deposit and return the amount in wei.
    fn validate_config(&self) -> eyre::Result<U256> {
        if self.deposit.piggy_bank == Address::ZERO {
            eyre::bail!("PiggyBank address is zero");
        }

        let value = parse_amount(&self.deposit.amount, NATIVE_DECIMALS)?;
        if value == U256::ZERO {
            eyre::bail!("Amount is zero");
        }

        Ok(value)
    }
}

impl<P> crate::Action for DepositNativeAction<P>
where
    P: Provider + Clone,
{
    async fn is_ready(&self) -> eyre::Result<bool> {
        self.validate_config()?;
        Ok(true)
    }

    async fn is_completed(&self) -> eyre::Result<bool> {
        // Every deposit creates a new record.
        Ok(false)
    }

    async fn execute(&mut self) -> eyre::Result<crate::Result> {
        let value = self.validate_config()?;

        let contract = IPiggyBank::new(self.deposit.piggy_bank, &self.provider);
        let tx = contract
            .depositETH(U256::from(self.deposit.lock.seconds()))
            .from(self.deposit.depositor)
            .value(value)
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
            amount = %self.deposit.amount,
            lock_secs = self.deposit.lock.seconds(),
            "Native deposit confirmed."
        );

        Ok(crate::Result {
            tx_hash,
            block_number: receipt.block_number,
            gas_used: Some(U256::from(receipt.gas_used)),
        })
    }

    fn description(&self) -> String {
        format!(
            "Deposit {} native coin from {} locked for {}",
            self.deposit.amount, self.deposit.depositor, self.deposit.lock
        )
    }

    fn name(&self) -> &'static str {
        "deposit_native"
    }

    fn failure_message(&self) -> &'static str {
        "Deposit failed"
    }
}

/// Input for an ERC20 deposit.
#[derive(Debug, Clone)]
pub struct DepositToken {
    /// PiggyBank contract address
    pub piggy_bank: Address,
    /// Account that sends the deposit
    pub depositor: Address,
    /// ERC20 token to lock
    pub token: Address,
    /// Amount as entered by the user, in whole tokens
    pub amount: String,
    /// Lock duration
    pub lock: LockDuration,
}

/// Approve the vault for the deposit amount, then lock the tokens.
pub struct DepositTokenAction<P> {
    provider: P,
    deposit: DepositToken,
    /// Token symbol, known once the action ran
    symbol: Option<String>,
}

impl<P> DepositTokenAction<P>
where
    P: Provider + Clone,
{
    pub const fn new(provider: P, deposit: DepositToken) -> Self {
        Self {
            provider,
            deposit,
            symbol: None,
        }
    }

    fn validate_config(&self) -> eyre::Result<()> {
        if self.deposit.piggy_bank == Address::ZERO {
            eyre::bail!("PiggyBank address is zero");
        }

        if self.deposit.token == NATIVE_TOKEN {
            eyre::bail!("Token address is zero, use a native deposit instead");
        }

        if self.deposit.amount.trim().is_empty() {
            eyre::bail!("Amount is empty");
        }

        Ok(())
    }

    /// Resolve the token's decimals and convert the amount to base units.
    async fn token_amount(&self) -> eyre::Result<(U256, String)> {
        let token = IERC20::new(self.deposit.token, &self.provider);
        let decimals = token.decimals().call().await?;
        let symbol = token.symbol().call().await?;

        let amount = parse_amount(&self.deposit.amount, decimals)?;
        if amount == U256::ZERO {
            eyre::bail!("Amount is zero");
        }

        Ok((amount, symbol))
    }
}

impl<P> crate::Action for DepositTokenAction<P>
where
    P: Provider + Clone,
{
    async fn is_ready(&self) -> eyre::Result<bool> {
        self.validate_config()?;
        self.token_amount().await?;
        Ok(true)
    }

    async fn is_completed(&self) -> eyre::Result<bool> {
        Ok(false)
    }

    async fn execute(&mut self) -> eyre::Result<crate::Result> {
        self.validate_config()?;

        let (amount, symbol) = self.token_amount().await?;
        self.symbol = Some(symbol);

        let token = IERC20::new(self.deposit.token, &self.provider);
        let approve = token
            .approve(self.deposit.piggy_bank, amount)
            .from(self.deposit.depositor)
            .send()
            .await?;

        let approve_receipt = approve.get_receipt().await?;
        if !approve_receipt.status() {
            eyre::bail!("Approval reverted");
        }

        info!(
            tx_hash = %approve_receipt.transaction_hash,
            token = %self.deposit.token,
            amount = %amount,
            "Vault approved for token deposit."
        );

        let contract = IPiggyBank::new(self.deposit.piggy_bank, &self.provider);
        let tx = contract
            .depositToken(
                self.deposit.token,
                amount,
                U256::from(self.deposit.lock.seconds()),
            )
            .from(self.deposit.depositor)
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
            "Token deposit confirmed."
        );

        Ok(crate::Result {
            tx_hash,
            block_number: receipt.block_number,
            gas_used: Some(U256::from(receipt.gas_used)),
        })
    }

    fn description(&self) -> String {
        let symbol = self
            .symbol
            .clone()
            .unwrap_or_else(|| self.deposit.token.to_string());
        format!(
            "Deposit {} {} from {} locked for {}",
            self.deposit.amount, symbol, self.deposit.depositor, self.deposit.lock
        )
    }

    fn name(&self) -> &'static str {
        "deposit_token"
    }

    fn failure_message(&self) -> &'static str {
        "ERC20 deposit failed"
    }
}
