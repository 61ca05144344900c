use serde::Deserialize;
use serde_json::json;

use storefront_infra::ReconciliationReport;
use storefront_wallet::{Account, WalletTransaction};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct TopupRequest {
    /// Optional so a missing amount maps to `invalid_amount` instead of a
    /// body-rejection.
    pub amount: Option<i64>,
    pub method: Option<String>,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PendingQuery {
    pub account_id: Option<String>,
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn transaction_to_json(txn: &WalletTransaction) -> serde_json::Value {
    json!({
        "id": txn.transaction_id.to_string(),
        "account_id": txn.account_id.to_string(),
        "amount": txn.amount,
        "kind": txn.kind,
        "method": txn.method,
        "status": txn.status,
        "note": txn.note,
        "created_at": txn.created_at,
        "approved_by": txn.approved_by.map(|id| id.to_string()),
        "approved_at": txn.approved_at,
    })
}

pub fn account_to_json(account: &Account) -> serde_json::Value {
    json!({
        "id": account.account_id.to_string(),
        "owner": account.owner.to_string(),
        "balance": account.balance,
        "created_at": account.created_at,
    })
}

pub fn report_to_json(report: &ReconciliationReport) -> serde_json::Value {
    json!({
        "account_id": report.account_id.to_string(),
        "stored_balance": report.stored_balance,
        "derived_balance": report.derived_balance,
        "consistent": report.is_consistent(),
    })
}
