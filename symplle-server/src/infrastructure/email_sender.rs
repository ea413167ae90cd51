use async_trait::async_trait;
use tracing::debug;

use crate::application::email_verification_service::EmailSender;
use crate::domain::error::DomainError;

/// Writes codes to the debug log instead of mailing them.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct LogEmailSender;

#[async_trait]
impl EmailSender for LogEmailSender {
    async fn send_verification(&self, email: &str, code: &str) -> Result<(), DomainError> {
        debug!(%email, %code, "email verification code (log-only delivery)");
        Ok(())
    }
}
