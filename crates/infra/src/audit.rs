//! Balance reconciliation.
//!
//! The stored balance and the transaction log are two independently written
//! representations of the same fact (the store updates balances by relative
//! increment). This routine recomputes the balance from the approved history
//! and reports any drift.

use serde::Serialize;

use storefront_core::{AccountId, LedgerResult};
use storefront_wallet::{TransactionStatus, WalletTransaction};

use crate::ledger_store::{LedgerStore, TransactionFilter};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciliationReport {
    pub account_id: AccountId,
    pub stored_balance: i64,
    pub derived_balance: i64,
}

impl ReconciliationReport {
    pub fn is_consistent(&self) -> bool {
        self.stored_balance == self.derived_balance
    }

    /// Stored minus derived; non-zero means the ledger needs attention.
    pub fn drift(&self) -> i64 {
        self.stored_balance - self.derived_balance
    }
}

/// Recompute `account_id`'s balance from approved transactions and compare
/// to the stored balance.
///
/// Reads race with concurrent settlements, so run this against a quiescent
/// account (or treat a transient drift as a signal to re-run) before alarming.
pub fn reconcile_account<S: LedgerStore>(
    store: &S,
    account_id: AccountId,
) -> LedgerResult<ReconciliationReport> {
    let account = store.account(account_id)?;
    let transactions = store.list_transactions(&TransactionFilter::for_account(account_id))?;

    let derived_balance = transactions
        .iter()
        .filter(|txn| txn.status == TransactionStatus::Approved)
        .map(WalletTransaction::signed_amount)
        .sum();

    let report = ReconciliationReport {
        account_id,
        stored_balance: account.balance,
        derived_balance,
    };

    if !report.is_consistent() {
        tracing::warn!(
            account_id = %account_id,
            stored = report.stored_balance,
            derived = report.derived_balance,
            "balance drift detected"
        );
    }

    Ok(report)
}
