use axum::{Json, Router, middleware, routing::get};
use serde::Serialize;

use super::app_error::AppError;
use super::middleware::auth::identify_user;
use super::middleware::locale::negotiate_locale;
use super::{AppState, routes};
use crate::domain::error::DomainError;

/// API routes behind caller identification and locale negotiation.
pub(crate) fn routes(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health_handler))
        .merge(routes::router())
        .fallback(route_not_found)
        .layer(middleware::from_fn_with_state(state.clone(), negotiate_locale))
        .layer(middleware::from_fn_with_state(state.clone(), identify_user))
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct HealthzResponse {
    status: &'static str,
}

async fn health_handler() -> Json<HealthzResponse> {
    Json(HealthzResponse { status: "ok" })
}

async fn route_not_found() -> AppError {
    AppError::Domain(DomainError::NotFound("route".to_string()))
}
