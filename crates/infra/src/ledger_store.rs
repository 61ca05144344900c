//! Ledger store contract.
//!
//! The store owns the two pieces of mutable shared state in the wallet core
//! (account balances and transaction statuses) and guards every terminal
//! transition with an exclusive per-row lock scoped to a settlement unit.

use storefront_core::{AccountId, LedgerResult, TransactionId, UserId};
use storefront_wallet::{Account, TerminalTransition, TransactionStatus, WalletTransaction};

/// Ordering of listed transactions by creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CreatedOrder {
    /// FIFO: fair to the earliest requester (admin pending queue).
    #[default]
    OldestFirst,
    /// History views: most recent activity on top.
    NewestFirst,
}

/// Read-only transaction query. No row locks are held across a listing, so
/// results are not a snapshot: a row settled concurrently may be missing
/// from the next poll of a pending listing.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub account_id: Option<AccountId>,
    pub status: Option<TransactionStatus>,
    pub order: CreatedOrder,
}

impl TransactionFilter {
    pub fn for_account(account_id: AccountId) -> Self {
        Self {
            account_id: Some(account_id),
            ..Self::default()
        }
    }

    pub fn pending() -> Self {
        Self {
            status: Some(TransactionStatus::Pending),
            ..Self::default()
        }
    }

    pub fn with_account(mut self, account_id: AccountId) -> Self {
        self.account_id = Some(account_id);
        self
    }

    pub fn newest_first(mut self) -> Self {
        self.order = CreatedOrder::NewestFirst;
        self
    }

    pub fn oldest_first(mut self) -> Self {
        self.order = CreatedOrder::OldestFirst;
        self
    }
}

/// One atomic unit over a single locked transaction row.
///
/// Holding a settlement unit means holding the row's exclusive lock (the
/// `SELECT ... FOR UPDATE` equivalent). `commit` writes the terminal status
/// fields and the authorized balance delta together; dropping the unit
/// without committing releases the lock with no writes at all, so a failed
/// decision is never partially applied.
pub trait SettlementUnit: Send {
    /// The locked row, as of lock acquisition.
    fn transaction(&self) -> &WalletTransaction;

    /// Apply a decided terminal transition and release the lock.
    ///
    /// Returns the updated transaction and an account snapshot taken inside
    /// the atomic unit.
    fn commit(self, transition: TerminalTransition) -> LedgerResult<(WalletTransaction, Account)>;
}

/// Durable, queryable storage of accounts and transactions.
///
/// Implementations must provide the "exactly one terminal transition"
/// guarantee: either row-level pessimistic locking (as the in-memory store
/// does) or an equivalent version-check-and-retry scheme.
pub trait LedgerStore: Send + Sync {
    type Settlement: SettlementUnit;

    /// Get-or-create the account owned by `owner`, with `balance = 0` on
    /// first touch. Idempotent.
    fn open_account(&self, owner: UserId) -> LedgerResult<Account>;

    /// Fetch an account snapshot. Fails with `NotFound` if absent.
    fn account(&self, account_id: AccountId) -> LedgerResult<Account>;

    /// Persist a freshly created transaction. Fails with `InvalidAmount` for
    /// non-positive amounts and `NotFound` for an unknown account. No
    /// balance effect.
    fn insert_transaction(&self, txn: WalletTransaction) -> LedgerResult<WalletTransaction>;

    /// Read-only listing; takes no exclusive locks of its own. A row held by
    /// a settlement is waited for with a bounded timeout, failing the listing
    /// with `LockTimeout` rather than stalling it indefinitely.
    fn list_transactions(&self, filter: &TransactionFilter)
        -> LedgerResult<Vec<WalletTransaction>>;

    /// Acquire the exclusive row lock for `transaction_id` with a bounded
    /// wait. Fails with `NotFound` for an unknown id and `LockTimeout` when
    /// a concurrent settlement holds the row past the configured wait.
    fn begin_settlement(&self, transaction_id: TransactionId) -> LedgerResult<Self::Settlement>;
}
