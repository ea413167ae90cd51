use axum::{
    body::Body,
    extract::{FromRequestParts, Query, Request, State},
    http::{HeaderMap, HeaderValue, StatusCode, header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{error, warn};

use crate::i18n::{Locale, LocaleContext, LocaleSignals};
use crate::presentation::AppState;
use crate::presentation::app_error::AppError;
use crate::presentation::envelope::{PendingEnvelope, content_language};
use crate::presentation::middleware::auth::CurrentUser;

pub(crate) const SESSION_LOCALE_KEY: &str = "locale";
pub(crate) const LOCALE_HEADER: &str = "x-locale";

#[derive(Debug, Default, Deserialize)]
struct LocaleQuery {
    lang: Option<String>,
    locale: Option<String>,
}

/// Owned copies of the request's locale inputs.
#[derive(Debug, Default)]
struct RequestLocaleInputs {
    user_preference: Option<String>,
    session: Option<String>,
    query: Option<String>,
    header_override: Option<String>,
    accept_language: Option<String>,
}

impl RequestLocaleInputs {
    fn signals(&self) -> LocaleSignals<'_> {
        LocaleSignals {
            user_preference: self.user_preference.as_deref(),
            session: self.session.as_deref(),
            query: self.query.as_deref(),
            header_override: self.header_override.as_deref(),
            accept_language: self.accept_language.as_deref(),
        }
    }
}

/// Locale the request resolves to with the caller's stored preference
/// left out. Used right after that preference is cleared.
#[derive(Debug, Clone)]
pub(crate) struct SignalLocale(pub(crate) Locale);

/// Resolves the request locale, exposes it as a [`LocaleContext`] and
/// renders any pending envelope in it.
pub(crate) async fn negotiate_locale(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let (mut inputs, session) = collect_inputs(&request);
    inputs.session = session_locale(session).await;
    let signals = inputs.signals();
    let locale = state.i18n.negotiate(&signals);
    let without_preference = state.i18n.negotiate(&LocaleSignals {
        user_preference: None,
        ..signals
    });
    let ctx = LocaleContext::new(state.i18n.clone(), locale);
    request.extensions_mut().insert(ctx.clone());
    request
        .extensions_mut()
        .insert(SignalLocale(without_preference));

    let mut response = next.run(request).await;
    let used = match response.extensions_mut().remove::<PendingEnvelope>() {
        Some(pending) => {
            let (used, rendered) = render_envelope(response, pending, &ctx);
            response = rendered;
            used
        }
        None => ctx,
    };

    if let Some(value) = content_language(used.locale()) {
        response.headers_mut().insert(header::CONTENT_LANGUAGE, value);
    }
    response
}

/// Reads everything but the session value, which needs an await.
fn collect_inputs(request: &Request) -> (RequestLocaleInputs, Option<Session>) {
    let query = Query::<LocaleQuery>::try_from_uri(request.uri())
        .map(|Query(query)| query)
        .unwrap_or_default();

    let inputs = RequestLocaleInputs {
        user_preference: request
            .extensions()
            .get::<CurrentUser>()
            .and_then(|user| user.preferred_locale.clone()),
        session: None,
        query: query.lang.or(query.locale),
        header_override: header_str(request.headers(), LOCALE_HEADER),
        accept_language: header_str(request.headers(), header::ACCEPT_LANGUAGE.as_str()),
    };
    (inputs, request.extensions().get::<Session>().cloned())
}

async fn session_locale(session: Option<Session>) -> Option<String> {
    session?
        .get::<String>(SESSION_LOCALE_KEY)
        .await
        .unwrap_or_else(|err| {
            warn!(error = %err, "failed to read session locale");
            None
        })
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

fn render_envelope(
    response: Response,
    pending: PendingEnvelope,
    ctx: &LocaleContext,
) -> (LocaleContext, Response) {
    let (mut parts, _) = response.into_parts();
    let (used, envelope) = pending.render(ctx);

    match serde_json::to_vec(&envelope) {
        Ok(bytes) => {
            parts.headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            );
            parts.headers.remove(header::CONTENT_LENGTH);
            (used, Response::from_parts(parts, Body::from(bytes)))
        }
        Err(err) => {
            error!(error = %err, "failed to encode response envelope");
            (used, StatusCode::INTERNAL_SERVER_ERROR.into_response())
        }
    }
}

impl<S> FromRequestParts<S> for SignalLocale
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SignalLocale>()
            .cloned()
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("locale middleware is not installed")))
    }
}

impl<S> FromRequestParts<S> for LocaleContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<LocaleContext>()
            .cloned()
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("locale middleware is not installed")))
    }
}
