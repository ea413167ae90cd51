use axum::Router;
use axum::middleware;
use axum::routing::{get, put};

use crate::presentation::AppState;
use crate::presentation::handlers::users::{get_me, update_locale};
use crate::presentation::middleware::auth::require_auth;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_me))
        .route("/me/locale", put(update_locale))
        .route_layer(middleware::from_fn(require_auth))
}
