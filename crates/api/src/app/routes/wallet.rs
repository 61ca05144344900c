use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use storefront_auth::Permission;
use storefront_core::{AccountId, LedgerError, TransactionId};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(my_wallet))
        .route("/topup", post(submit_topup))
        .route("/admin/pending", get(admin_pending))
        .route("/admin/:id/approve", post(admin_approve))
        .route("/admin/:id/reject", post(admin_reject))
        .route("/admin/accounts/:id/audit", get(admin_audit))
}

/// `GET /wallet`: caller's account and transaction history, newest first.
pub async fn my_wallet(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::authorize_request(&principal, &Permission::new("wallet.read")) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    let account = match services.ledger().open_account(principal.user_id()) {
        Ok(a) => a,
        Err(e) => return errors::ledger_error_to_response(e),
    };
    let transactions = match services.ledger().history(principal.user_id()) {
        Ok(txns) => txns,
        Err(e) => return errors::ledger_error_to_response(e),
    };

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "account": dto::account_to_json(&account),
            "transactions": transactions.iter().map(dto::transaction_to_json).collect::<Vec<_>>(),
        })),
    )
        .into_response()
}

/// `POST /wallet/topup`: submit a pending top-up for the caller's account.
/// No balance effect until an administrator approves.
pub async fn submit_topup(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::TopupRequest>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::authorize_request(&principal, &Permission::new("wallet.topup")) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    let Some(amount) = body.amount else {
        return errors::ledger_error_to_response(LedgerError::invalid_amount(
            "amount is required",
        ));
    };

    match services
        .ledger()
        .submit_topup(principal.user_id(), amount, body.method, body.note)
    {
        Ok((txn, account)) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "transaction": dto::transaction_to_json(&txn),
                "account": dto::account_to_json(&account),
            })),
        )
            .into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

/// `GET /wallet/admin/pending?account_id=`: oldest-first pending queue.
pub async fn admin_pending(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Query(query): Query<dto::PendingQuery>,
) -> axum::response::Response {
    if let Err(e) =
        crate::authz::authorize_request(&principal, &Permission::new("wallet.admin.pending"))
    {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    let account_id = match query.account_id.as_deref() {
        Some(raw) => match raw.parse::<AccountId>() {
            Ok(id) => Some(id),
            Err(_) => {
                return errors::json_error(
                    StatusCode::BAD_REQUEST,
                    "invalid_id",
                    "invalid account id",
                )
            }
        },
        None => None,
    };

    match services.ledger().list_pending(account_id) {
        Ok(txns) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "transactions": txns.iter().map(dto::transaction_to_json).collect::<Vec<_>>(),
            })),
        )
            .into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

/// `POST /wallet/admin/:id/approve`: credit the owning account, exactly once.
pub async fn admin_approve(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(e) =
        crate::authz::authorize_request(&principal, &Permission::new("wallet.admin.approve"))
    {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    let transaction_id: TransactionId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid transaction id")
        }
    };

    match services.ledger().approve(transaction_id, principal.user_id()) {
        Ok((txn, account)) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "transaction": dto::transaction_to_json(&txn),
                "account": dto::account_to_json(&account),
            })),
        )
            .into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

/// `POST /wallet/admin/:id/reject`: same guards as approve, no balance effect.
/// The body (and the reason inside it) is optional.
pub async fn admin_reject(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    body: Option<Json<dto::RejectRequest>>,
) -> axum::response::Response {
    if let Err(e) =
        crate::authz::authorize_request(&principal, &Permission::new("wallet.admin.reject"))
    {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    let transaction_id: TransactionId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid transaction id")
        }
    };

    let reason = body.and_then(|Json(body)| body.reason);
    match services
        .ledger()
        .reject(transaction_id, principal.user_id(), reason.as_deref())
    {
        Ok(txn) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "transaction": dto::transaction_to_json(&txn),
            })),
        )
            .into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

/// `GET /wallet/admin/accounts/:id/audit`: recompute the balance from the
/// approved history and compare with the stored balance.
pub async fn admin_audit(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(e) =
        crate::authz::authorize_request(&principal, &Permission::new("wallet.admin.audit"))
    {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    let account_id: AccountId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid account id")
        }
    };

    match services.ledger().reconcile(account_id) {
        Ok(report) => (StatusCode::OK, Json(dto::report_to_json(&report))).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}
