use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::Value;
use thiserror::Error;
use tracing::{error, warn};
use validator::ValidationErrors;

use crate::domain::error::DomainError;
use crate::presentation::envelope::{Message, PendingEnvelope};

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("validation error: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

pub(crate) type AppResult<T> = Result<T, AppError>;

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl AppError {
    fn status_and_message(&self) -> (StatusCode, Message) {
        match self {
            AppError::Domain(err) => domain_status_and_message(err),
            AppError::Validation(errors) => {
                let (field, details) = first_validation_failure(errors);
                (
                    StatusCode::BAD_REQUEST,
                    Message::new("errors.validation_details")
                        .arg("field", field)
                        .arg("details", details),
                )
            }
            AppError::BadRequest(details) => (
                StatusCode::BAD_REQUEST,
                Message::new("errors.validation_details")
                    .arg("field", "request")
                    .arg("details", details.clone()),
            ),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, Message::new("errors.unauthorized")),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Message::new("errors.server"),
            ),
        }
    }
}

fn domain_status_and_message(err: &DomainError) -> (StatusCode, Message) {
    match err {
        DomainError::Validation { field, message } => (
            StatusCode::BAD_REQUEST,
            Message::new("errors.validation_details")
                .arg("field", *field)
                .arg("details", *message),
        ),
        DomainError::NotFound(_) => (StatusCode::NOT_FOUND, Message::new("errors.not_found")),
        DomainError::AlreadyExists(_) => (StatusCode::CONFLICT, Message::new("errors.already_exists")),
        DomainError::Forbidden => (StatusCode::FORBIDDEN, Message::new("errors.forbidden")),
        DomainError::InvalidCredentials => (StatusCode::UNAUTHORIZED, Message::new("auth.login.error")),
        DomainError::UnsupportedLocale {
            requested,
            supported,
        } => (
            StatusCode::BAD_REQUEST,
            Message::new("i18n.errors.unsupported_locale")
                .arg("locale", requested.clone())
                .arg("supported", supported.join(", ")),
        ),
        DomainError::InvalidOtp => (
            StatusCode::BAD_REQUEST,
            Message::new("otp.errors.invalid_or_expired"),
        ),
        DomainError::OtpAttemptsExceeded => (
            StatusCode::TOO_MANY_REQUESTS,
            Message::new("otp.errors.too_many_attempts"),
        ),
        DomainError::Unexpected(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Message::new("errors.server"),
        ),
    }
}

/// Field and message of the alphabetically first failing field.
fn first_validation_failure(errors: &ValidationErrors) -> (String, String) {
    let field_errors = errors.field_errors();
    let mut fields: Vec<_> = field_errors.iter().collect();
    fields.sort_by(|(left, _), (right, _)| left.cmp(right));

    fields
        .first()
        .map(|(field, failures)| {
            let details = failures
                .first()
                .map(|failure| {
                    failure
                        .message
                        .as_ref()
                        .map(|message| message.to_string())
                        .unwrap_or_else(|| failure.code.to_string())
                })
                .unwrap_or_else(|| "invalid".to_string());
            (field.to_string(), details)
        })
        .unwrap_or_else(|| ("request".to_string(), errors.to_string()))
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        if status.is_server_error() {
            error!(error = %self, "request failed");
        } else {
            warn!(status = status.as_u16(), error = %self, "request rejected");
        }

        PendingEnvelope {
            success: false,
            message,
            data: Value::Null,
            locale: None,
        }
        .into_response_with(status)
    }
}
