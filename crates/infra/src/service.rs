//! Ledger service: the operation surface composing store + state machine.
//!
//! All side effects are confined to the [`LedgerStore`]; no other subsystem
//! is touched. Balance writes are reachable only through the settlement
//! commit driven by `approve`/`reject`.

use chrono::Utc;

use storefront_core::{AccountId, LedgerResult, TransactionId, UserId};
use storefront_wallet::{Account, WalletTransaction};

use crate::audit::{self, ReconciliationReport};
use crate::ledger_store::{LedgerStore, SettlementUnit, TransactionFilter};

pub struct LedgerService<S> {
    store: S,
}

impl<S: LedgerStore> LedgerService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Get-or-create the caller's wallet account.
    pub fn open_account(&self, owner: UserId) -> LedgerResult<Account> {
        self.store.open_account(owner)
    }

    /// Submit a top-up request for the caller's own account.
    ///
    /// Creates a `pending` transaction with no balance effect; validation
    /// happens before any lock is taken. Returns the created transaction and
    /// a current account snapshot.
    pub fn submit_topup(
        &self,
        owner: UserId,
        amount: i64,
        method: Option<String>,
        note: Option<String>,
    ) -> LedgerResult<(WalletTransaction, Account)> {
        let account = self.store.open_account(owner)?;
        let txn = WalletTransaction::topup(account.account_id, amount, method, note, Utc::now())?;
        let txn = self.store.insert_transaction(txn)?;

        tracing::info!(
            transaction_id = %txn.transaction_id,
            account_id = %account.account_id,
            amount = txn.amount,
            "top-up submitted"
        );
        Ok((txn, account))
    }

    /// The caller's transaction history, newest first.
    pub fn history(&self, owner: UserId) -> LedgerResult<Vec<WalletTransaction>> {
        let account = self.store.open_account(owner)?;
        self.store
            .list_transactions(&TransactionFilter::for_account(account.account_id).newest_first())
    }

    /// Pending transactions awaiting an administrator, oldest first (FIFO
    /// fairness to the earliest requester), optionally scoped to one account.
    pub fn list_pending(
        &self,
        account_id: Option<AccountId>,
    ) -> LedgerResult<Vec<WalletTransaction>> {
        let mut filter = TransactionFilter::pending().oldest_first();
        if let Some(account_id) = account_id {
            filter = filter.with_account(account_id);
        }
        self.store.list_transactions(&filter)
    }

    /// Approve a pending transaction, crediting (or debiting) the owning
    /// account. Exactly one terminal transition ever succeeds per
    /// transaction: racing callers fail with `AlreadyProcessed` after the
    /// row lock is released by the winner.
    pub fn approve(
        &self,
        transaction_id: TransactionId,
        approver: UserId,
    ) -> LedgerResult<(WalletTransaction, Account)> {
        let settlement = self.store.begin_settlement(transaction_id)?;
        let transition = settlement.transaction().approval(approver, Utc::now())?;
        let (txn, account) = settlement.commit(transition)?;

        tracing::info!(
            transaction_id = %transaction_id,
            approver = %approver,
            delta = txn.signed_amount(),
            balance = account.balance,
            "transaction approved"
        );
        Ok((txn, account))
    }

    /// Reject a pending transaction. Same locking and guard as `approve`,
    /// but no balance effect; an optional reason lands in the note.
    pub fn reject(
        &self,
        transaction_id: TransactionId,
        approver: UserId,
        reason: Option<&str>,
    ) -> LedgerResult<WalletTransaction> {
        let settlement = self.store.begin_settlement(transaction_id)?;
        let transition = settlement
            .transaction()
            .rejection(approver, Utc::now(), reason)?;
        let (txn, _account) = settlement.commit(transition)?;

        tracing::info!(
            transaction_id = %transaction_id,
            approver = %approver,
            "transaction rejected"
        );
        Ok(txn)
    }

    /// Recompute an account's balance from its approved history and compare
    /// with the stored balance.
    pub fn reconcile(&self, account_id: AccountId) -> LedgerResult<ReconciliationReport> {
        audit::reconcile_account(&self.store, account_id)
    }
}
