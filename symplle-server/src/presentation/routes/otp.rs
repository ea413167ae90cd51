use axum::Router;
use axum::routing::{get, post};

use crate::presentation::AppState;
use crate::presentation::handlers::otp::{check_phone, send_otp, verify_otp};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/check-phone", get(check_phone))
        .route("/send", post(send_otp))
        .route("/verify", post(verify_otp))
}
