//! Deposit state for the piggy bank vault.
//!
//! This crate reads an account's deposits from the vault and turns them into
//! display records. It also holds the pure helpers that work on those
//! records: unlock countdowns and the selection of matured deposits for a
//! batch withdrawal.

pub mod amount;
pub mod countdown;
pub mod ledger;
pub mod maturity;
pub mod state;
pub mod types;

pub use amount::{format_amount, parse_amount, AmountError};
pub use countdown::{format_unlock_time, time_left, unix_now, UNLOCKED};
pub use ledger::{LedgerError, LedgerReader, PiggyBankReader};
pub use maturity::select_matured;
pub use state::{get_deposits, DepositStateProvider};
pub use types::{Deposit, RawDeposit, TokenMetadata, NATIVE_DECIMALS, NATIVE_TOKEN};
