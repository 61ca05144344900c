use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use storefront_core::LedgerError;

pub fn ledger_error_to_response(err: LedgerError) -> axum::response::Response {
    match err {
        LedgerError::InvalidAmount(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_amount", msg),
        LedgerError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        LedgerError::AlreadyProcessed => json_error(
            StatusCode::BAD_REQUEST,
            "already_processed",
            "transaction already processed",
        ),
        LedgerError::LockTimeout => json_error(
            StatusCode::CONFLICT,
            "lock_timeout",
            "transaction is being processed, retry shortly",
        ),
        LedgerError::StoreUnavailable(msg) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_unavailable", msg)
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
