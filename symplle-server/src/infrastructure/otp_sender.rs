use async_trait::async_trait;
use tracing::debug;

use crate::application::otp_service::OtpSender;
use crate::domain::error::DomainError;

/// Writes codes to the debug log instead of delivering them.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct LogOtpSender;

#[async_trait]
impl OtpSender for LogOtpSender {
    async fn send(&self, phone: &str, code: &str) -> Result<(), DomainError> {
        debug!(%phone, %code, "verification code (log-only delivery)");
        Ok(())
    }
}
