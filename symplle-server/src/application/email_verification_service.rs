use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::info;

use super::otp_service::OtpSettings;
use super::verification_codes::VerificationCodes;
use crate::data::user_repository::UserRepository;
use crate::domain::error::DomainError;
use crate::domain::otp::{OtpChallenge, validate_code_format};
use crate::domain::user::normalize_email;

/// Delivery channel for email verification codes.
#[async_trait]
pub(crate) trait EmailSender: Send + Sync {
    async fn send_verification(&self, email: &str, code: &str) -> Result<(), DomainError>;
}

#[async_trait]
impl<T: EmailSender + ?Sized> EmailSender for Arc<T> {
    async fn send_verification(&self, email: &str, code: &str) -> Result<(), DomainError> {
        (**self).send_verification(email, code).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EmailVerification {
    pub(crate) email: String,
    /// Whether a registered user now has the email marked verified.
    pub(crate) user_verified: bool,
}

pub(crate) struct EmailVerificationService<R: UserRepository, S: EmailSender> {
    repo: R,
    sender: S,
    codes: VerificationCodes,
}

impl<R: UserRepository, S: EmailSender> EmailVerificationService<R, S> {
    pub(crate) fn new(repo: R, sender: S, settings: &OtpSettings) -> Self {
        Self {
            repo,
            sender,
            codes: VerificationCodes::new(settings),
        }
    }

    /// Issues a fresh code, replacing any pending one for the address.
    pub(crate) async fn send_code(&self, raw_email: &str) -> Result<String, DomainError> {
        let email = normalize_email(raw_email)?;
        let challenge = OtpChallenge::generate(&mut rand::rng());

        self.sender.send_verification(&email, challenge.code()).await?;
        self.codes.insert(email.clone(), challenge);
        info!(%email, "email verification code issued");
        Ok(email)
    }

    pub(crate) async fn verify(&self, raw_email: &str, code: &str) -> Result<EmailVerification, DomainError> {
        self.verify_at(raw_email, code, Instant::now()).await
    }

    async fn verify_at(
        &self,
        raw_email: &str,
        code: &str,
        now: Instant,
    ) -> Result<EmailVerification, DomainError> {
        let email = normalize_email(raw_email)?;
        validate_code_format(code)?;
        self.codes.check_at(&email, code, now)?;

        let user_verified = self.repo.mark_email_verified(&email).await?;
        info!(%email, user_verified, "email verified");
        Ok(EmailVerification {
            email,
            user_verified,
        })
    }
}
