//! Plain-text rendering of controller snapshots.

use crate::controller::{NetworkState, Snapshot};
use config::NetworkConfig;
use deposit::{format_unlock_time, time_left, Deposit};
use std::fmt::Write;

/// Status column of a deposit.
pub fn status(deposit: &Deposit, now: u64) -> &'static str {
    if deposit.withdrawn {
        "Withdrawn"
    } else if deposit.is_matured(now) {
        "Unlocked"
    } else {
        "Locked"
    }
}

/// One table row per deposit, with a live countdown.
pub fn deposits_table(deposits: &[Deposit], now: u64) -> String {
    if deposits.is_empty() {
        return "No deposits yet.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>5}  {:<8}  {:>24}  {:<23}  {:<12}  {}",
        "#", "ASSET", "AMOUNT", "UNLOCKS AT", "TIME LEFT", "STATUS"
    );

    for deposit in deposits {
        let countdown = if deposit.withdrawn {
            "-".to_string()
        } else {
            time_left(deposit.unlock_time, now)
        };

        let _ = writeln!(
            out,
            "{:>5}  {:<8}  {:>24}  {:<23}  {:<12}  {}",
            deposit.index,
            deposit.symbol,
            deposit.amount,
            format_unlock_time(deposit.unlock_time),
            countdown,
            status(deposit, now)
        );
    }

    out
}

/// Header line describing the session.
pub fn session_line(snapshot: &Snapshot, network: &NetworkConfig) -> String {
    let account = snapshot
        .account
        .map_or_else(|| "not connected".to_string(), |a| a.to_string());

    let network_state = match snapshot.network {
        NetworkState::Disconnected => "disconnected".to_string(),
        NetworkState::WrongNetwork { chain_id } => {
            format!("wrong network (chain {chain_id}), switch to {}", network.chain_name)
        }
        NetworkState::Ready => network.chain_name.to_string(),
    };

    let busy = if snapshot.busy { " [busy]" } else { "" };

    format!("{account} on {network_state}{busy}")
}

/// Full screen: session line followed by the deposit table.
pub fn screen(snapshot: &Snapshot, network: &NetworkConfig, now: u64) -> String {
    format!(
        "{}\n\n{}",
        session_line(snapshot, network),
        deposits_table(&snapshot.deposits, now)
    )
}
