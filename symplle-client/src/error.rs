use thiserror::Error;

#[derive(Debug, Error)]
/// Errors returned by `symplle-client`.
///
/// Variants built from a server response carry the envelope's `message`,
/// already translated into the locale the server negotiated.
pub enum SymplleClientError {
    /// Transport or decoding failure (`reqwest`).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Missing, invalid or insufficient credentials.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Rejected request: validation, conflict, rate limit or server failure.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Result of `symplle-client` operations.
pub type SymplleClientResult<T> = Result<T, SymplleClientError>;

impl SymplleClientError {
    pub(crate) fn from_http_status(status: reqwest::StatusCode, message: Option<String>) -> Self {
        let message = message.unwrap_or_else(|| format!("http status {status}"));
        match status {
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                Self::Unauthorized(message)
            }
            reqwest::StatusCode::NOT_FOUND => Self::NotFound(message),
            _ => Self::InvalidRequest(message),
        }
    }

    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::from_http_status(status, None);
        }
        Self::Http(err)
    }

    pub(crate) fn missing_token() -> Self {
        Self::Unauthorized("no access token; call register or login first".to_string())
    }
}
