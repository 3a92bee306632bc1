use alloy_primitives::{Address, U256};

/// Token address the vault uses for the chain's native coin.
pub const NATIVE_TOKEN: Address = Address::ZERO;

/// Decimals of the native coin.
pub const NATIVE_DECIMALS: u8 = 18;

/// A deposit exactly as the vault returns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDeposit {
    pub token: Address,
    pub amount: U256,
    pub unlock_time: u64,
    pub withdrawn: bool,
}

/// Display metadata of an ERC20 token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMetadata {
    pub decimals: u8,
    pub symbol: String,
}

/// A decoded deposit, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deposit {
    /// Position of the deposit in the account's deposit list
    pub index: u64,
    /// Asset address ([`NATIVE_TOKEN`] for the native coin)
    pub token: Address,
    /// Asset symbol
    pub symbol: String,
    /// Amount in the asset's smallest unit
    pub amount_raw: U256,
    /// Amount formatted with the asset's decimals
    pub amount: String,
    /// Unix timestamp (seconds) before which the vault rejects withdrawal
    pub unlock_time: u64,
    /// Whether the deposit has been withdrawn
    pub withdrawn: bool,
}

impl Deposit {
    pub fn is_native(&self) -> bool {
        self.token == NATIVE_TOKEN
    }

    /// Unlocked and not yet withdrawn.
    pub const fn is_matured(&self, now: u64) -> bool {
        !self.withdrawn && self.unlock_time <= now
    }
}
