use axum::Router;
use axum::routing::{get, post};

use crate::presentation::AppState;
use crate::presentation::handlers::email::{
    check_email, check_username, send_email_verification, verify_email,
};

/// Signup helpers mounted directly under `/api`.
pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/api/check-email", get(check_email))
        .route("/api/check-username", get(check_username))
        .route("/api/send-email-verification", post(send_email_verification))
        .route("/api/verify-email", post(verify_email))
}
