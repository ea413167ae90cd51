use axum::Router;
use axum::middleware;
use axum::routing::get;

use crate::presentation::AppState;
use crate::presentation::handlers::timeline::{get_timeline, get_trending, list_algorithms};
use crate::presentation::middleware::auth::require_auth;

pub(crate) fn router() -> Router<AppState> {
    let public = Router::new().route("/algorithms", get(list_algorithms));

    let protected = Router::new()
        .route("/", get(get_timeline))
        .route("/trending", get(get_trending))
        .route_layer(middleware::from_fn(require_auth));

    public.merge(protected)
}
