//! Mutating actions run through the controller.

use crate::setup::{
    controller, native, ready_controller, InMemoryLedger, MockWallet, Op, VaultAction,
};
use action::{LockDuration, LockUnit};
use alloy_primitives::U256;
use deposit::unix_now;
use piggy::controller::ControllerError;
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

#[path = "setup.rs"]
mod setup;

const FIVE_CENTS: u64 = 50_000_000_000_000_000;

fn one_minute() -> LockDuration {
    LockDuration::new(1, LockUnit::Minutes).unwrap()
}

#[tokio::test]
async fn test_native_deposit_shows_up_locked() {
    let ledger = InMemoryLedger::new();
    let mut controller = ready_controller(ledger.clone()).await;

    let before = unix_now();
    let mut action = VaultAction::new(
        ledger.clone(),
        Op::DepositNative {
            amount: "0.05".to_string(),
            lock: one_minute(),
        },
    );
    let outcome = controller.execute(&mut action).await.unwrap();
    let after = unix_now();

    assert_eq!(outcome.description, "Deposit 0.05 locked for 1 minute");
    assert_eq!(outcome.result.block_number, Some(1));
    assert!(!outcome.stale);

    // Reconciled after confirmation.
    let deposits = controller.deposits();
    assert_eq!(deposits.len(), 1);
    assert_eq!(deposits[0].amount, "0.05");
    assert_eq!(deposits[0].amount_raw, U256::from(FIVE_CENTS));
    assert!(deposits[0].unlock_time >= before + 60);
    assert!(deposits[0].unlock_time <= after + 60);
    assert!(!deposits[0].withdrawn);
    assert!(!deposits[0].is_matured(after));

    assert!(!controller.snapshot().busy);
    assert_eq!(ledger.reads(), 2);
}

#[tokio::test]
async fn test_confirmed_deposit_survives_failed_refresh() {
    let ledger = InMemoryLedger::new();
    let mut controller = ready_controller(ledger.clone()).await;
    ledger.set_failing(true);

    let mut action = VaultAction::new(
        ledger.clone(),
        Op::DepositNative {
            amount: "0.05".to_string(),
            lock: one_minute(),
        },
    );
    let outcome = controller.execute(&mut action).await.unwrap();

    // The write landed; only the follow-up read failed.
    assert!(outcome.stale);
    assert_eq!(outcome.result.block_number, Some(1));
    assert_eq!(ledger.raw().len(), 1);
    assert!(controller.deposits().is_empty());
    assert!(!controller.is_busy());

    ledger.set_failing(false);
    assert_eq!(controller.reconcile().await.unwrap(), 1);
    assert_eq!(controller.deposits()[0].amount, "0.05");
}

#[tokio::test]
async fn test_rejects_action_while_busy() {
    let ledger = InMemoryLedger::new();
    let mut controller = ready_controller(ledger.clone()).await;
    let mut rx = controller.subscribe();

    let mut hanging = VaultAction::new(ledger.clone(), Op::Hang);
    let timed_out =
        tokio::time::timeout(Duration::from_millis(50), controller.execute(&mut hanging)).await;
    assert!(timed_out.is_err());
    assert!(rx.borrow_and_update().busy);

    let mut second = VaultAction::new(
        ledger.clone(),
        Op::DepositNative {
            amount: "1".to_string(),
            lock: one_minute(),
        },
    );
    let executions = second.executions();
    let err = controller.execute(&mut second).await.unwrap_err();

    assert!(matches!(err, ControllerError::Busy));
    assert_eq!(executions.load(Ordering::SeqCst), 0);
    assert!(ledger.raw().is_empty());
}

#[tokio::test]
async fn test_failure_reports_specific_message() {
    let ledger = InMemoryLedger::new();
    let mut controller = ready_controller(ledger.clone()).await;

    let mut action = VaultAction::new(ledger.clone(), Op::Fail("insufficient funds for gas"));
    let err = controller.execute(&mut action).await.unwrap_err();

    assert!(matches!(err, ControllerError::ActionFailed { action: "vault", .. }));
    assert_eq!(err.to_string(), "insufficient funds for gas");
    assert!(!controller.is_busy());
    // No reconciliation after a failed action.
    assert_eq!(ledger.reads(), 1);
}

#[tokio::test]
async fn test_failure_without_message_uses_fallback() {
    let ledger = InMemoryLedger::new();
    let mut controller = ready_controller(ledger.clone()).await;

    let mut action = VaultAction::new(ledger, Op::Fail(""));
    let err = controller.execute(&mut action).await.unwrap_err();

    assert_eq!(err.to_string(), "Deposit failed");
}

#[tokio::test]
async fn test_not_ready_action_is_not_sent() {
    let ledger = InMemoryLedger::new();
    let mut controller = ready_controller(ledger.clone()).await;

    let mut action = VaultAction::new(ledger, Op::Fail("sent")).not_ready();
    let executions = action.executions();
    let err = controller.execute(&mut action).await.unwrap_err();

    assert!(matches!(err, ControllerError::NotReady(_)));
    assert_eq!(executions.load(Ordering::SeqCst), 0);
    assert!(!controller.is_busy());
}

#[tokio::test]
async fn test_invalid_input_reports_reason() {
    let ledger = InMemoryLedger::new();
    let mut controller = ready_controller(ledger.clone()).await;

    let mut action =
        VaultAction::new(ledger, Op::Fail("sent")).invalid("invalid digit found in string");
    let executions = action.executions();
    let err = controller.execute(&mut action).await.unwrap_err();

    match &err {
        ControllerError::NotReady(reason) => {
            assert!(reason.starts_with("Failing action: "));
            assert!(reason.contains("invalid digit found in string"));
        }
        other => panic!("expected NotReady, got {other:?}"),
    }
    assert!(err.to_string().contains("invalid digit found in string"));
    assert_eq!(executions.load(Ordering::SeqCst), 0);
    assert!(!controller.is_busy());
}

#[tokio::test]
async fn test_completed_action_is_not_sent() {
    let ledger = InMemoryLedger::new();
    let mut controller = ready_controller(ledger.clone()).await;

    let mut action = VaultAction::new(ledger, Op::Fail("sent")).completed();
    let executions = action.executions();
    let err = controller.execute(&mut action).await.unwrap_err();

    assert!(matches!(err, ControllerError::AlreadyCompleted(_)));
    assert_eq!(executions.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_actions_need_connection() {
    let ledger = InMemoryLedger::new();
    let mut controller = controller();

    let mut action = VaultAction::new(ledger.clone(), Op::Fail("sent"));
    let executions = action.executions();
    assert!(matches!(
        controller.execute(&mut action).await,
        Err(ControllerError::Disconnected)
    ));

    // Connected, but the wallet refuses to leave mainnet.
    let wallet = MockWallet::on_chain(1);
    wallet.reject_switch();
    controller.connect(wallet.as_ref()).await.unwrap();
    controller.set_ledger(Some(ledger)).await.unwrap();

    assert!(matches!(
        controller.execute(&mut action).await,
        Err(ControllerError::WrongNetwork {
            expected: 545,
            actual: 1
        })
    ));
    assert_eq!(executions.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_withdraw_matured_without_matured_deposits() {
    let now = unix_now();
    let ledger = InMemoryLedger::with_deposits(vec![
        native(U256::from(FIVE_CENTS), now + 600, false),
        native(U256::from(FIVE_CENTS), now - 600, true),
    ]);
    let mut controller = ready_controller(ledger.clone()).await;

    let built = Arc::new(AtomicBool::new(false));
    let flag = built.clone();
    let err = controller
        .withdraw_matured(now, |indices| {
            flag.store(true, Ordering::SeqCst);
            VaultAction::new(ledger.clone(), Op::WithdrawBatch(indices))
        })
        .await
        .unwrap_err();

    assert!(matches!(err, ControllerError::NoMaturedDeposits));
    assert_eq!(err.to_string(), "No matured deposits");
    assert!(!built.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_withdraw_matured_sends_matured_indices() {
    let now = unix_now();
    let ledger = InMemoryLedger::with_deposits(vec![
        native(U256::from(FIVE_CENTS), now - 60, false),
        native(U256::from(FIVE_CENTS), now + 600, false),
        native(U256::from(FIVE_CENTS), now, false),
        native(U256::from(FIVE_CENTS), now - 600, true),
    ]);
    let mut controller = ready_controller(ledger.clone()).await;

    let outcome = controller
        .withdraw_matured(now, |indices| {
            assert_eq!(indices, vec![0, 2]);
            VaultAction::new(ledger.clone(), Op::WithdrawBatch(indices))
        })
        .await
        .unwrap();
    assert_eq!(outcome.description, "Withdraw deposits [0, 2]");

    let withdrawn: Vec<bool> = controller.deposits().iter().map(|d| d.withdrawn).collect();
    assert_eq!(withdrawn, vec![true, false, true, true]);
}
