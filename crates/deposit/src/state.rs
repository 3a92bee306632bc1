//! Deposit list decoding.
//!
//! Reads every deposit of an account from the ledger, index ascending, and
//! turns each into a display record with a token-aware amount string.

use crate::{
    amount::format_amount,
    ledger::{LedgerError, LedgerReader},
    types::{Deposit, RawDeposit, TokenMetadata, NATIVE_DECIMALS, NATIVE_TOKEN},
};
use alloy_primitives::Address;
use std::collections::HashMap;
use tracing::debug;

/// Decodes the deposit list of an account.
pub struct DepositStateProvider<'a, R> {
    reader: &'a R,
    native_symbol: &'a str,
}

impl<'a, R> DepositStateProvider<'a, R>
where
    R: LedgerReader,
{
    pub const fn new(reader: &'a R, native_symbol: &'a str) -> Self {
        Self {
            reader,
            native_symbol,
        }
    }

    /// Read and decode every deposit of `account`.
    ///
    /// A ledger that answers with empty data is treated as an account without
    /// deposits. Every other error is returned unchanged.
    pub async fn get_deposits(&self, account: Address) -> Result<Vec<Deposit>, LedgerError> {
        match self.read_deposits(account).await {
            Err(LedgerError::EmptyData) => {
                debug!(account = %account, "Ledger returned empty data, no deposits");
                Ok(vec![])
            }
            other => other,
        }
    }

    async fn read_deposits(&self, account: Address) -> Result<Vec<Deposit>, LedgerError> {
        let length = self.reader.deposits_length(account).await?;

        debug!(account = %account, length, "Loading deposits");

        let mut tokens: HashMap<Address, TokenMetadata> = HashMap::new();
        let mut deposits = Vec::new();

        for index in 0..length {
            let raw = self.reader.get_deposit(account, index).await?;
            let metadata = self.metadata(&mut tokens, raw.token).await?;
            deposits.push(decode(index, raw, &metadata)?);
        }

        Ok(deposits)
    }

    /// Metadata for `token`, queried once per pass.
    async fn metadata(
        &self,
        tokens: &mut HashMap<Address, TokenMetadata>,
        token: Address,
    ) -> Result<TokenMetadata, LedgerError> {
        if token == NATIVE_TOKEN {
            return Ok(TokenMetadata {
                decimals: NATIVE_DECIMALS,
                symbol: self.native_symbol.to_string(),
            });
        }

        if let Some(metadata) = tokens.get(&token) {
            return Ok(metadata.clone());
        }

        let metadata = self.reader.token_metadata(token).await?;
        tokens.insert(token, metadata.clone());
        Ok(metadata)
    }
}

fn decode(index: u64, raw: RawDeposit, metadata: &TokenMetadata) -> Result<Deposit, LedgerError> {
    let amount = format_amount(raw.amount, metadata.decimals)
        .map_err(|e| LedgerError::Format(e.to_string()))?;

    Ok(Deposit {
        index,
        token: raw.token,
        symbol: metadata.symbol.clone(),
        amount_raw: raw.amount,
        amount,
        unlock_time: raw.unlock_time,
        withdrawn: raw.withdrawn,
    })
}

/// Convenience function to decode deposits without creating a provider struct.
pub async fn get_deposits<R>(
    reader: &R,
    account: Address,
    native_symbol: &str,
) -> Result<Vec<Deposit>, LedgerError>
where
    R: LedgerReader,
{
    DepositStateProvider::new(reader, native_symbol)
        .get_deposits(account)
        .await
}
