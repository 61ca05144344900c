use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::{AccountId, LedgerError, LedgerResult, TransactionId, UserId};

/// Sign discriminator: a topup credits the account, a debit removes funds.
///
/// The debit path (order checkout's hold-and-confirm) reuses the same state
/// machine with the sign inverted; sufficient-balance enforcement lives with
/// that caller, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Topup,
    Debit,
}

/// Transaction status lifecycle.
///
/// `pending` is initial; `approved` and `rejected` are terminal. The only
/// legal transitions are `pending → approved` and `pending → rejected`,
/// each of which may succeed at most once per transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Approved,
    Rejected,
}

impl TransactionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }
}

/// The outcome of a terminal state-machine decision.
///
/// Produced by [`WalletTransaction::approval`] / [`WalletTransaction::rejection`]
/// and applied by the store's settlement commit, so the status write and the
/// balance write always travel together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalTransition {
    pub status: TransactionStatus,
    pub approved_by: UserId,
    pub approved_at: DateTime<Utc>,
    pub note: Option<String>,
    /// Signed balance delta the transition authorizes (0 for rejections).
    pub balance_delta: i64,
}

/// A single top-up (or debit) request: the append-only audit record.
///
/// `amount`, `account_id`, `kind`, and `created_at` are fixed at creation.
/// Only `status`, `note`, `approved_by`, and `approved_at` ever change, and
/// only through [`WalletTransaction::apply`] with a [`TerminalTransition`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletTransaction {
    pub transaction_id: TransactionId,
    pub account_id: AccountId,
    /// Positive amount in smallest currency unit; sign comes from `kind`.
    pub amount: i64,
    pub kind: TransactionKind,
    /// Payment channel, e.g. "transfer".
    pub method: String,
    pub status: TransactionStatus,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub approved_by: Option<UserId>,
    pub approved_at: Option<DateTime<Utc>>,
}

const DEFAULT_METHOD: &str = "transfer";

impl WalletTransaction {
    /// Create a pending top-up request. Fails with `InvalidAmount` unless
    /// `amount > 0`. Has no balance effect until approved.
    pub fn topup(
        account_id: AccountId,
        amount: i64,
        method: Option<String>,
        note: Option<String>,
        at: DateTime<Utc>,
    ) -> LedgerResult<Self> {
        Self::new(TransactionKind::Topup, account_id, amount, method, note, at)
    }

    /// Create a pending debit request (hold for the checkout path).
    pub fn debit(
        account_id: AccountId,
        amount: i64,
        method: Option<String>,
        note: Option<String>,
        at: DateTime<Utc>,
    ) -> LedgerResult<Self> {
        Self::new(TransactionKind::Debit, account_id, amount, method, note, at)
    }

    fn new(
        kind: TransactionKind,
        account_id: AccountId,
        amount: i64,
        method: Option<String>,
        note: Option<String>,
        at: DateTime<Utc>,
    ) -> LedgerResult<Self> {
        if amount <= 0 {
            return Err(LedgerError::invalid_amount(format!(
                "amount must be positive, got {amount}"
            )));
        }

        Ok(Self {
            transaction_id: TransactionId::new(),
            account_id,
            amount,
            kind,
            method: method.unwrap_or_else(|| DEFAULT_METHOD.to_string()),
            status: TransactionStatus::Pending,
            note,
            created_at: at,
            approved_by: None,
            approved_at: None,
        })
    }

    /// Signed delta this transaction applies to the balance once approved.
    pub fn signed_amount(&self) -> i64 {
        match self.kind {
            TransactionKind::Topup => self.amount,
            TransactionKind::Debit => -self.amount,
        }
    }

    /// Decide the `pending → approved` transition.
    ///
    /// Guard: fails with `AlreadyProcessed` unless the status is still
    /// `pending`. Callers must hold the row's exclusive lock when deciding,
    /// which is what makes the guard race-proof: the second of two racing
    /// approvers always observes the terminal status the first one wrote.
    pub fn approval(
        &self,
        approver: UserId,
        at: DateTime<Utc>,
    ) -> LedgerResult<TerminalTransition> {
        self.ensure_pending()?;

        Ok(TerminalTransition {
            status: TransactionStatus::Approved,
            approved_by: approver,
            approved_at: at,
            note: self.note.clone(),
            balance_delta: self.signed_amount(),
        })
    }

    /// Decide the `pending → rejected` transition. No balance effect; an
    /// optional reason is appended to the note for the audit trail.
    pub fn rejection(
        &self,
        approver: UserId,
        at: DateTime<Utc>,
        reason: Option<&str>,
    ) -> LedgerResult<TerminalTransition> {
        self.ensure_pending()?;

        let note = match reason {
            Some(reason) => Some(match &self.note {
                Some(existing) => format!("{existing}\nRejected: {reason}"),
                None => format!("Rejected: {reason}"),
            }),
            None => self.note.clone(),
        };

        Ok(TerminalTransition {
            status: TransactionStatus::Rejected,
            approved_by: approver,
            approved_at: at,
            note,
            balance_delta: 0,
        })
    }

    /// Write a decided terminal transition into the row.
    pub fn apply(&mut self, transition: &TerminalTransition) {
        self.status = transition.status;
        self.approved_by = Some(transition.approved_by);
        self.approved_at = Some(transition.approved_at);
        self.note = transition.note.clone();
    }

    fn ensure_pending(&self) -> LedgerResult<()> {
        if self.status.is_terminal() {
            return Err(LedgerError::AlreadyProcessed);
        }
        Ok(())
    }
}
