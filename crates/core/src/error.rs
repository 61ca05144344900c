//! Ledger error model.

use thiserror::Error;

/// Result type used across the ledger core.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Ledger-level error.
///
/// Keep this focused on deterministic failures of the balance-mutation
/// protocol (validation, state-machine guards, contention). Transport
/// concerns belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// A submitted amount was missing, zero, or negative.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// The requested transaction (or account) does not exist.
    #[error("not found")]
    NotFound,

    /// The transaction already reached a terminal status; the state machine
    /// guard tripped. Not a server fault, and never partially applied.
    #[error("transaction already processed")]
    AlreadyProcessed,

    /// The exclusive row lock could not be acquired within the bounded wait.
    #[error("timed out waiting for transaction lock")]
    LockTimeout,

    /// The underlying durable store is unreachable. The enclosing atomic
    /// unit was rolled back, so the caller may safely retry.
    #[error("ledger store unavailable: {0}")]
    StoreUnavailable(String),
}

impl LedgerError {
    pub fn invalid_amount(msg: impl Into<String>) -> Self {
        Self::InvalidAmount(msg.into())
    }

    pub fn store_unavailable(msg: impl Into<String>) -> Self {
        Self::StoreUnavailable(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }
}
