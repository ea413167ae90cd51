use axum::Router;
use axum::middleware;
use axum::routing::delete;

use crate::presentation::AppState;
use crate::presentation::handlers::comments::delete_comment;
use crate::presentation::middleware::auth::require_auth;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}", delete(delete_comment))
        .route_layer(middleware::from_fn(require_auth))
}
