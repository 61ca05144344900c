//! `storefront-wallet` — pure wallet ledger domain.
//!
//! Accounts, wallet transactions, and the terminal-transition state machine.
//! No I/O here; the infra crate owns locking and atomic commits.

pub mod account;
pub mod transaction;

pub use account::Account;
pub use transaction::{
    TerminalTransition, TransactionKind, TransactionStatus, WalletTransaction,
};
