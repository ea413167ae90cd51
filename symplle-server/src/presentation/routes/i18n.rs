use axum::Router;
use axum::routing::{get, post};

use crate::presentation::AppState;
use crate::presentation::handlers::i18n::{change_locale, demo_page, info};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/info", get(info))
        .route("/demo", get(demo_page))
        .route("/change-locale", post(change_locale))
}
