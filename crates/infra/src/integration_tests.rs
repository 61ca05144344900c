//! End-to-end ledger service tests against the in-memory store.

use std::sync::Barrier;
use std::time::Duration;

use storefront_core::{LedgerError, UserId};
use storefront_wallet::TransactionStatus;

use crate::ledger_store::{LedgerStore, SettlementUnit};
use crate::memory::InMemoryLedgerStore;
use crate::service::LedgerService;

fn service() -> LedgerService<InMemoryLedgerStore> {
    LedgerService::new(InMemoryLedgerStore::new())
}

#[test]
fn topup_lifecycle_submit_approve_double_approve() {
    let service = service();
    let user = UserId::new();
    let admin = UserId::new();

    // Submit: transaction pending, balance untouched.
    let (txn, account) = service.submit_topup(user, 100_000, None, None).unwrap();
    assert_eq!(txn.status, TransactionStatus::Pending);
    assert_eq!(account.balance, 0);
    assert_eq!(service.open_account(user).unwrap().balance, 0);

    // Approve: balance credited, terminal fields recorded.
    let (approved, account) = service.approve(txn.transaction_id, admin).unwrap();
    assert_eq!(approved.status, TransactionStatus::Approved);
    assert_eq!(approved.approved_by, Some(admin));
    assert!(approved.approved_at.is_some());
    assert_eq!(account.balance, 100_000);

    // Second approval attempt: guard trips, balance unchanged.
    assert_eq!(
        service.approve(txn.transaction_id, admin).unwrap_err(),
        LedgerError::AlreadyProcessed
    );
    assert_eq!(service.open_account(user).unwrap().balance, 100_000);
}

#[test]
fn invalid_amount_creates_nothing() {
    let service = service();
    let user = UserId::new();

    let err = service.submit_topup(user, -5, None, None).unwrap_err();
    assert!(matches!(err, LedgerError::InvalidAmount(_)));

    assert!(service.history(user).unwrap().is_empty());
    assert_eq!(service.open_account(user).unwrap().balance, 0);
}

#[test]
fn rejection_keeps_balance_and_records_reason() {
    let service = service();
    let user = UserId::new();
    let admin = UserId::new();

    let (txn, _) = service.submit_topup(user, 50_000, None, None).unwrap();
    let rejected = service
        .reject(txn.transaction_id, admin, Some("invalid proof"))
        .unwrap();

    assert_eq!(rejected.status, TransactionStatus::Rejected);
    assert!(rejected.note.as_deref().unwrap().contains("invalid proof"));
    assert_eq!(rejected.approved_by, Some(admin));
    assert_eq!(service.open_account(user).unwrap().balance, 0);

    // A rejected transaction is just as terminal as an approved one.
    assert_eq!(
        service.approve(txn.transaction_id, admin).unwrap_err(),
        LedgerError::AlreadyProcessed
    );
}

#[test]
fn racing_approvals_credit_exactly_once() {
    let service = service();
    let user = UserId::new();

    let (txn, _) = service.submit_topup(user, 75_000, None, None).unwrap();
    let transaction_id = txn.transaction_id;
    let barrier = Barrier::new(2);

    let outcomes: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..2)
            .map(|_| {
                let service = &service;
                let barrier = &barrier;
                scope.spawn(move || {
                    barrier.wait();
                    service.approve(transaction_id, UserId::new())
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let credits = outcomes.iter().filter(|r| r.is_ok()).count();
    let guarded = outcomes
        .iter()
        .filter(|r| matches!(r, Err(LedgerError::AlreadyProcessed)))
        .count();
    assert_eq!((credits, guarded), (1, 1));
    assert_eq!(service.open_account(user).unwrap().balance, 75_000);
}

#[test]
fn contended_lock_times_out_instead_of_hanging() {
    let store = InMemoryLedgerStore::with_lock_timeout(Duration::from_millis(50));
    let service = LedgerService::new(store.clone());
    let user = UserId::new();

    let (txn, _) = service.submit_topup(user, 10_000, None, None).unwrap();

    // Park a settlement on the row; the next locker must give up in bounded
    // time rather than wait forever.
    let parked = store.begin_settlement(txn.transaction_id).unwrap();
    assert_eq!(parked.transaction().status, TransactionStatus::Pending);

    assert_eq!(
        service.approve(txn.transaction_id, UserId::new()).unwrap_err(),
        LedgerError::LockTimeout
    );

    // Releasing the parked unit makes the row approvable again.
    drop(parked);
    assert!(service.approve(txn.transaction_id, UserId::new()).is_ok());
}

#[test]
fn pending_queue_is_fifo_and_settled_rows_leave_it() {
    let service = service();
    let alice = UserId::new();
    let bob = UserId::new();
    let admin = UserId::new();

    let (first, _) = service.submit_topup(alice, 1_000, None, None).unwrap();
    let (second, _) = service.submit_topup(bob, 2_000, None, None).unwrap();
    let (third, _) = service.submit_topup(alice, 3_000, None, None).unwrap();

    let pending = service.list_pending(None).unwrap();
    assert_eq!(
        pending.iter().map(|t| t.transaction_id).collect::<Vec<_>>(),
        vec![first.transaction_id, second.transaction_id, third.transaction_id]
    );

    // Account-scoped view.
    let alice_account = service.open_account(alice).unwrap();
    let scoped = service.list_pending(Some(alice_account.account_id)).unwrap();
    assert_eq!(scoped.len(), 2);

    // Once settled, a row no longer shows up in the queue.
    service.approve(second.transaction_id, admin).unwrap();
    let pending = service.list_pending(None).unwrap();
    assert_eq!(pending.len(), 2);
    assert!(pending.iter().all(|t| t.transaction_id != second.transaction_id));
}

#[test]
fn history_is_newest_first_and_owner_scoped() {
    let service = service();
    let user = UserId::new();
    let other = UserId::new();
    let admin = UserId::new();

    let (a, _) = service.submit_topup(user, 1_000, None, None).unwrap();
    let (b, _) = service.submit_topup(user, 2_000, None, None).unwrap();
    service.submit_topup(other, 9_000, None, None).unwrap();
    service.approve(a.transaction_id, admin).unwrap();

    let history = service.history(user).unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].transaction_id, b.transaction_id);
    assert_eq!(history[1].transaction_id, a.transaction_id);
    assert_eq!(history[1].status, TransactionStatus::Approved);
}

#[test]
fn reconcile_matches_settled_history_and_flags_drift() {
    let store = InMemoryLedgerStore::new();
    let service = LedgerService::new(store.clone());
    let user = UserId::new();
    let admin = UserId::new();

    let account = service.open_account(user).unwrap();
    let (a, _) = service.submit_topup(user, 40_000, None, None).unwrap();
    let (b, _) = service.submit_topup(user, 25_000, None, None).unwrap();
    let (c, _) = service.submit_topup(user, 7_000, None, None).unwrap();

    service.approve(a.transaction_id, admin).unwrap();
    service.reject(b.transaction_id, admin, None).unwrap();
    service.approve(c.transaction_id, admin).unwrap();

    let report = service.reconcile(account.account_id).unwrap();
    assert!(report.is_consistent());
    assert_eq!(report.stored_balance, 47_000);
    assert_eq!(report.derived_balance, 47_000);

    store.nudge_balance(account.account_id, -500);
    let report = service.reconcile(account.account_id).unwrap();
    assert!(!report.is_consistent());
    assert_eq!(report.drift(), -500);
}
