use axum::Router;

use super::AppState;

pub(crate) mod auth;
pub(crate) mod chat;
pub(crate) mod comments;
pub(crate) mod email;
pub(crate) mod i18n;
pub(crate) mod otp;
pub(crate) mod posts;
pub(crate) mod timeline;
pub(crate) mod users;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .nest("/api/auth", auth::router())
        .nest("/api/users", users::router())
        .nest("/api/posts", posts::router())
        .nest("/api/comments", comments::router())
        .nest("/api/timeline", timeline::router())
        .nest("/api/i18n", i18n::router())
        .nest("/api/otp", otp::router())
        .nest("/api/chat", chat::router())
        .merge(email::router())
}
