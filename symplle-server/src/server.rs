use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_sessions::cookie::SameSite;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};
use tracing::{info, warn};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::i18n::I18n;
use crate::infrastructure::settings::{Settings, supported_locales_from_env};
use crate::presentation::middleware::cors::apply_cors;
use crate::presentation::middleware::trace::apply_trace;
use crate::presentation::openapi::ApiDoc;
use crate::presentation::{AppState, http_handlers};

pub(crate) const SESSION_COOKIE_NAME: &str = "symplle-session";

pub(crate) async fn run_http(settings: &Settings, state: AppState) -> anyhow::Result<()> {
    if !settings.secure_cookies {
        warn!("secure cookies disabled; set SECURE_COOKIES=true behind HTTPS");
    }

    #[cfg(unix)]
    spawn_translation_reloader(state.i18n.clone());

    let app = build_router(state, settings)?;
    let listener = TcpListener::bind(&settings.http_addr).await?;

    info!("HTTP server listening on {}", settings.http_addr);
    axum::serve(listener, app).await?;
    Ok(())
}

pub(crate) fn build_router(state: AppState, settings: &Settings) -> anyhow::Result<Router> {
    #[allow(deprecated)]
    let timeout = TimeoutLayer::new(Duration::from_secs(settings.http_request_timeout_secs));

    let app = http_handlers::routes(state)
        .layer(session_layer(settings))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(RequestBodyLimitLayer::new(settings.http_request_body_limit_bytes))
                .layer(timeout),
        );
    let app = apply_cors(app, settings)?;
    Ok(apply_trace(app))
}

pub(crate) fn session_layer(settings: &Settings) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_secure(settings.secure_cookies)
        .with_same_site(SameSite::Lax)
        .with_name(SESSION_COOKIE_NAME)
        .with_http_only(true)
        .with_expiry(Expiry::OnInactivity(time::Duration::seconds(
            settings.session_ttl_secs,
        )))
}

/// Rebuilds every locale bundle on SIGHUP and loads locales newly listed in
/// `SUPPORTED_LOCALES`.
#[cfg(unix)]
fn spawn_translation_reloader(i18n: Arc<I18n>) {
    use tokio::signal::unix::{SignalKind, signal};

    tokio::spawn(async move {
        let mut hangups = match signal(SignalKind::hangup()) {
            Ok(hangups) => hangups,
            Err(err) => {
                warn!(error = %err, "cannot listen for SIGHUP; translations will not reload");
                return;
            }
        };

        while hangups.recv().await.is_some() {
            i18n.reload();
            for raw in supported_locales_from_env() {
                if let Err(err) = i18n.add_locale_support(&raw) {
                    warn!(locale = %raw, error = %err, "skipping locale from SUPPORTED_LOCALES");
                }
            }
            info!("translations reloaded");
        }
    });
}
