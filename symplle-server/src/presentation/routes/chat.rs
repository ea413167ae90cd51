use axum::Router;
use axum::middleware;
use axum::routing::{get, post};

use crate::presentation::AppState;
use crate::presentation::handlers::chat::{
    chat_info, create_room, get_room, join_room, list_messages, list_rooms, send_message,
};
use crate::presentation::middleware::auth::require_auth;

pub(crate) fn router() -> Router<AppState> {
    let public = Router::new().route("/info", get(chat_info));

    let protected = Router::new()
        .route("/rooms", get(list_rooms).post(create_room))
        .route("/rooms/{id}", get(get_room))
        .route("/rooms/{id}/join", post(join_room))
        .route("/rooms/{id}/messages", get(list_messages).post(send_message))
        .route_layer(middleware::from_fn(require_auth));

    public.merge(protected)
}
