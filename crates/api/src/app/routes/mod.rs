use axum::{routing::get, Router};

pub mod system;
pub mod wallet;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/wallet", wallet::router())
}
