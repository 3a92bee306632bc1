use crate::types::Deposit;

/// Indices of deposits that can be withdrawn at `now`, ascending.
pub fn select_matured(deposits: &[Deposit], now: u64) -> Vec<u64> {
    deposits
        .iter()
        .filter(|d| d.is_matured(now))
        .map(|d| d.index)
        .collect()
}
