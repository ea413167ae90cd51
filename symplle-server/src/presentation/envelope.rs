//! The `{success, data, message, locale}` body shared by every API route.
//!
//! Handlers and errors only describe the envelope: a status, a message key
//! with its arguments and the data. The locale middleware renders it once
//! the request locale is known.

use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;
use tracing::error;
use utoipa::ToSchema;

use crate::i18n::{Locale, LocaleContext};

/// Untranslated message: a catalog key plus named arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Message {
    pub(crate) key: &'static str,
    pub(crate) args: Vec<(&'static str, String)>,
}

impl Message {
    pub(crate) fn new(key: &'static str) -> Self {
        Self {
            key,
            args: Vec::new(),
        }
    }

    pub(crate) fn arg(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.args.push((name, value.into()));
        self
    }

    fn render(&self, ctx: &LocaleContext) -> String {
        let args: Vec<(&str, &str)> = self
            .args
            .iter()
            .map(|(name, value)| (*name, value.as_str()))
            .collect();
        ctx.t_with(self.key, &args)
    }
}

/// Envelope waiting in the response extensions for the locale middleware.
#[derive(Debug, Clone)]
pub(crate) struct PendingEnvelope {
    pub(crate) success: bool,
    pub(crate) message: Message,
    pub(crate) data: Value,
    /// Renders in this locale instead of the negotiated one.
    pub(crate) locale: Option<Locale>,
}

impl PendingEnvelope {
    pub(crate) fn into_response_with(self, status: StatusCode) -> Response {
        let mut response = status.into_response();
        response.extensions_mut().insert(self);
        response
    }

    /// Final body in the context's locale, or the override.
    pub(crate) fn render(self, ctx: &LocaleContext) -> (LocaleContext, Envelope) {
        let ctx = match self.locale {
            Some(locale) => ctx.with_locale(locale),
            None => ctx.clone(),
        };
        let body = Envelope {
            success: self.success,
            message: self.message.render(&ctx),
            locale: ctx.locale().to_string(),
            data: self.data,
        };
        (ctx, body)
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct Envelope {
    pub(crate) success: bool,
    #[schema(value_type = Object)]
    pub(crate) data: Value,
    pub(crate) message: String,
    pub(crate) locale: String,
}

/// Successful API response.
#[derive(Debug)]
pub(crate) struct ApiResponse<T> {
    status: StatusCode,
    message: Message,
    data: T,
    locale: Option<Locale>,
}

impl<T: Serialize> ApiResponse<T> {
    pub(crate) fn ok(message: Message, data: T) -> Self {
        Self {
            status: StatusCode::OK,
            message,
            data,
            locale: None,
        }
    }

    pub(crate) fn created(message: Message, data: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            ..Self::ok(message, data)
        }
    }

    pub(crate) fn in_locale(self, locale: Locale) -> Self {
        Self {
            locale: Some(locale),
            ..self
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        match serde_json::to_value(&self.data) {
            Ok(data) => PendingEnvelope {
                success: true,
                message: self.message,
                data,
                locale: self.locale,
            }
            .into_response_with(self.status),
            Err(err) => {
                error!(error = %err, "failed to serialize response data");
                PendingEnvelope {
                    success: false,
                    message: Message::new("errors.server"),
                    data: Value::Null,
                    locale: self.locale,
                }
                .into_response_with(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}

/// `pt_BR` is sent as `pt-BR` in `Content-Language`.
pub(crate) fn content_language(locale: &Locale) -> Option<HeaderValue> {
    HeaderValue::from_str(&locale.as_str().replace('_', "-")).ok()
}
