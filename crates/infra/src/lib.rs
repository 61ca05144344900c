//! `storefront-infra` — ledger storage and composition.
//!
//! - `ledger_store`: the store contract (row-locked settlement units)
//! - `memory`: in-memory implementation for dev/test
//! - `service`: the ledger service composing store + state machine
//! - `audit`: balance reconciliation against the transaction history

pub mod audit;
pub mod ledger_store;
pub mod memory;
pub mod service;

#[cfg(test)]
mod integration_tests;

pub use audit::{reconcile_account, ReconciliationReport};
pub use ledger_store::{CreatedOrder, LedgerStore, SettlementUnit, TransactionFilter};
pub use memory::InMemoryLedgerStore;
pub use service::LedgerService;
