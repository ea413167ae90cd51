use axum::Router;
use axum::middleware;
use axum::routing::{get, post, put};

use crate::presentation::AppState;
use crate::presentation::handlers::comments::{create_comment, list_comments};
use crate::presentation::handlers::posts::{
    create_post, delete_post, get_post, like_post, list_posts, toggle_like, unlike_post,
    update_post,
};
use crate::presentation::middleware::auth::require_auth;

pub(crate) fn router() -> Router<AppState> {
    // get_post reads the caller when present, so it stays outside the auth layer
    let public = Router::new()
        .route("/", get(list_posts))
        .route("/{id}", get(get_post))
        .route("/{id}/comments", get(list_comments));

    let protected = Router::new()
        .route("/", post(create_post))
        .route("/{id}", put(update_post).delete(delete_post))
        .route(
            "/{id}/like",
            post(toggle_like).put(like_post).delete(unlike_post),
        )
        .route("/{id}/comments", post(create_comment))
        .route_layer(middleware::from_fn(require_auth));

    public.merge(protected)
}
