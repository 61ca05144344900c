//! In-memory ledger store for dev/test.
//!
//! Each transaction row lives behind its own `parking_lot::Mutex`; a bounded
//! `try_lock_arc_for` is the `SELECT ... FOR UPDATE` equivalent. Lock order
//! is strictly row-then-accounts in the single commit path, so the store
//! cannot deadlock.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::lock_api::ArcMutexGuard;
use parking_lot::{Mutex, RawMutex, RwLock};

use storefront_core::{AccountId, LedgerError, LedgerResult, TransactionId, UserId};
use storefront_wallet::{Account, TerminalTransition, WalletTransaction};

use crate::ledger_store::{CreatedOrder, LedgerStore, SettlementUnit, TransactionFilter};

const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Default)]
struct AccountTable {
    accounts: HashMap<AccountId, Account>,
    by_owner: HashMap<UserId, AccountId>,
}

type Row = Arc<Mutex<WalletTransaction>>;

/// In-memory ledger store. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct InMemoryLedgerStore {
    lock_timeout: Duration,
    tables: Arc<RwLock<AccountTable>>,
    rows: Arc<RwLock<HashMap<TransactionId, Row>>>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::with_lock_timeout(DEFAULT_LOCK_TIMEOUT)
    }

    /// Store with a custom bound on row-lock acquisition waits.
    pub fn with_lock_timeout(lock_timeout: Duration) -> Self {
        Self {
            lock_timeout,
            tables: Arc::new(RwLock::new(AccountTable::default())),
            rows: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Corrupt a stored balance directly, bypassing the settlement path.
    /// Exists so reconciliation tests can seed drift.
    #[cfg(test)]
    pub(crate) fn nudge_balance(&self, account_id: AccountId, delta: i64) {
        if let Some(account) = self.tables.write().accounts.get_mut(&account_id) {
            account.balance += delta;
        }
    }
}

impl Default for InMemoryLedgerStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerStore for InMemoryLedgerStore {
    type Settlement = InMemorySettlement;

    fn open_account(&self, owner: UserId) -> LedgerResult<Account> {
        let mut tables = self.tables.write();

        if let Some(account_id) = tables.by_owner.get(&owner) {
            // Unwrap is safe only because both maps mutate under one lock.
            let account = tables.accounts[account_id].clone();
            return Ok(account);
        }

        let account = Account::open(owner, Utc::now());
        tables.by_owner.insert(owner, account.account_id);
        tables.accounts.insert(account.account_id, account.clone());
        Ok(account)
    }

    fn account(&self, account_id: AccountId) -> LedgerResult<Account> {
        self.tables
            .read()
            .accounts
            .get(&account_id)
            .cloned()
            .ok_or(LedgerError::NotFound)
    }

    fn insert_transaction(&self, txn: WalletTransaction) -> LedgerResult<WalletTransaction> {
        if txn.amount <= 0 {
            return Err(LedgerError::invalid_amount(format!(
                "amount must be positive, got {}",
                txn.amount
            )));
        }
        if !self.tables.read().accounts.contains_key(&txn.account_id) {
            return Err(LedgerError::NotFound);
        }

        self.rows
            .write()
            .insert(txn.transaction_id, Arc::new(Mutex::new(txn.clone())));
        Ok(txn)
    }

    fn list_transactions(
        &self,
        filter: &TransactionFilter,
    ) -> LedgerResult<Vec<WalletTransaction>> {
        let rows: Vec<Row> = self.rows.read().values().cloned().collect();

        // Each row is read under a bounded wait so a long-held settlement
        // cannot stall listings indefinitely.
        let mut out: Vec<WalletTransaction> = Vec::with_capacity(rows.len());
        for row in &rows {
            let txn = row
                .try_lock_for(self.lock_timeout)
                .ok_or(LedgerError::LockTimeout)?
                .clone();
            if filter.account_id.is_none_or(|id| txn.account_id == id)
                && filter.status.is_none_or(|status| txn.status == status)
            {
                out.push(txn);
            }
        }

        out.sort_by_key(|txn| (txn.created_at, txn.transaction_id));
        if filter.order == CreatedOrder::NewestFirst {
            out.reverse();
        }
        Ok(out)
    }

    fn begin_settlement(&self, transaction_id: TransactionId) -> LedgerResult<Self::Settlement> {
        let row: Row = self
            .rows
            .read()
            .get(&transaction_id)
            .cloned()
            .ok_or(LedgerError::NotFound)?;

        let guard = row
            .try_lock_arc_for(self.lock_timeout)
            .ok_or(LedgerError::LockTimeout)?;

        Ok(InMemorySettlement {
            tables: Arc::clone(&self.tables),
            guard,
        })
    }
}

/// A held row lock plus the handles needed to commit atomically.
pub struct InMemorySettlement {
    tables: Arc<RwLock<AccountTable>>,
    guard: ArcMutexGuard<RawMutex, WalletTransaction>,
}

impl SettlementUnit for InMemorySettlement {
    fn transaction(&self) -> &WalletTransaction {
        &self.guard
    }

    fn commit(self, transition: TerminalTransition) -> LedgerResult<(WalletTransaction, Account)> {
        let mut guard = self.guard;

        // Both writes happen while the row lock and the account-table write
        // lock are held; either both land or (on the missing-account and
        // balance-overflow errors) neither does. The fallible balance write
        // goes first so a failed commit leaves the row pending.
        let mut tables = self.tables.write();
        let account = tables.accounts.get_mut(&guard.account_id).ok_or_else(|| {
            LedgerError::store_unavailable("account row missing for locked transaction")
        })?;

        account.apply_delta(transition.balance_delta)?;
        guard.apply(&transition);

        Ok((guard.clone(), account.clone()))
    }
}
