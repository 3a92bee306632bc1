//! Read access to the vault.
//!
//! [`LedgerReader`] is the seam between the decoder and the chain; the
//! production implementation is [`PiggyBankReader`], which talks to the
//! vault and token contracts through an alloy provider.

use crate::types::{RawDeposit, TokenMetadata};
use alloy_contract::private::Provider;
use alloy_primitives::Address;
use binding::{piggy::IPiggyBank, token::IERC20};
use std::future::Future;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// The call returned `0x` instead of ABI encoded data
    #[error("Ledger returned empty data")]
    EmptyData,

    /// Any other failed call
    #[error("Ledger call failed: {0}")]
    Call(String),

    /// An amount could not be formatted for display
    #[error("Cannot format amount: {0}")]
    Format(String),
}

impl From<alloy_contract::Error> for LedgerError {
    fn from(err: alloy_contract::Error) -> Self {
        match err {
            alloy_contract::Error::ZeroData(..) => Self::EmptyData,
            other => Self::Call(other.to_string()),
        }
    }
}

/// Trait for reading deposits and token metadata from the ledger.
pub trait LedgerReader: Send + Sync {
    /// Number of deposits `account` has ever made.
    fn deposits_length(
        &self,
        account: Address,
    ) -> impl Future<Output = Result<u64, LedgerError>> + Send;

    /// Deposit of `account` at `index`.
    fn get_deposit(
        &self,
        account: Address,
        index: u64,
    ) -> impl Future<Output = Result<RawDeposit, LedgerError>> + Send;

    /// Decimals and symbol of an ERC20 token.
    fn token_metadata(
        &self,
        token: Address,
    ) -> impl Future<Output = Result<TokenMetadata, LedgerError>> + Send;
}

/// Ledger reader backed by the PiggyBank contract.
#[derive(Clone)]
pub struct PiggyBankReader<P> {
    provider: P,
    piggy_bank: Address,
}

impl<P> PiggyBankReader<P>
where
    P: Provider + Clone,
{
    pub const fn new(provider: P, piggy_bank: Address) -> Self {
        Self {
            provider,
            piggy_bank,
        }
    }
}

impl<P> LedgerReader for PiggyBankReader<P>
where
    P: Provider + Clone,
{
    async fn deposits_length(&self, account: Address) -> Result<u64, LedgerError> {
        let contract = IPiggyBank::new(self.piggy_bank, &self.provider);
        let length = contract.depositsLength(account).call().await?;

        u64::try_from(length)
            .map_err(|_| LedgerError::Call(format!("deposit count {} out of range", length)))
    }

    async fn get_deposit(&self, account: Address, index: u64) -> Result<RawDeposit, LedgerError> {
        let contract = IPiggyBank::new(self.piggy_bank, &self.provider);
        let deposit = contract
            .getDeposit(account, alloy_primitives::U256::from(index))
            .call()
            .await?;

        Ok(RawDeposit {
            token: deposit.token,
            amount: deposit.amount,
            unlock_time: deposit.unlockTime.saturating_to::<u64>(),
            withdrawn: deposit.withdrawn,
        })
    }

    async fn token_metadata(&self, token: Address) -> Result<TokenMetadata, LedgerError> {
        debug!(token = %token, "Querying token metadata");

        let contract = IERC20::new(token, &self.provider);
        let decimals = contract.decimals().call().await?;
        let symbol = contract.symbol().call().await?;

        Ok(TokenMetadata { decimals, symbol })
    }
}
