use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::info;

use super::verification_codes::VerificationCodes;
use crate::data::user_repository::UserRepository;
use crate::domain::error::DomainError;
use crate::domain::otp::{OtpChallenge, validate_code_format};
use crate::domain::user::normalize_phone;

/// Delivery channel for verification codes.
#[async_trait]
pub(crate) trait OtpSender: Send + Sync {
    async fn send(&self, phone: &str, code: &str) -> Result<(), DomainError>;
}

#[async_trait]
impl<T: OtpSender + ?Sized> OtpSender for Arc<T> {
    async fn send(&self, phone: &str, code: &str) -> Result<(), DomainError> {
        (**self).send(phone, code).await
    }
}

#[derive(Debug, Clone)]
pub(crate) struct OtpSettings {
    pub(crate) ttl: Duration,
    pub(crate) max_attempts: u32,
    pub(crate) capacity: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PhoneCheck {
    pub(crate) phone: String,
    pub(crate) exists: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OtpVerification {
    pub(crate) phone: String,
    /// Whether a registered user now has the phone marked verified.
    pub(crate) user_verified: bool,
}

pub(crate) struct OtpService<R: UserRepository, S: OtpSender> {
    repo: R,
    sender: S,
    codes: VerificationCodes,
}

impl<R: UserRepository, S: OtpSender> OtpService<R, S> {
    pub(crate) fn new(repo: R, sender: S, settings: &OtpSettings) -> Self {
        Self {
            repo,
            sender,
            codes: VerificationCodes::new(settings),
        }
    }

    pub(crate) async fn check_phone(&self, raw_phone: &str) -> Result<PhoneCheck, DomainError> {
        let phone = normalize_phone(raw_phone)?;
        let exists = self.repo.phone_exists(&phone).await?;
        Ok(PhoneCheck { phone, exists })
    }

    /// Issues a fresh code, replacing any pending one for the phone.
    pub(crate) async fn send_otp(&self, raw_phone: &str) -> Result<String, DomainError> {
        let phone = normalize_phone(raw_phone)?;
        let challenge = OtpChallenge::generate(&mut rand::rng());

        self.sender.send(&phone, challenge.code()).await?;
        self.codes.insert(phone.clone(), challenge);
        info!(%phone, "verification code issued");
        Ok(phone)
    }

    pub(crate) async fn verify_otp(&self, raw_phone: &str, code: &str) -> Result<OtpVerification, DomainError> {
        self.verify_otp_at(raw_phone, code, Instant::now()).await
    }

    async fn verify_otp_at(
        &self,
        raw_phone: &str,
        code: &str,
        now: Instant,
    ) -> Result<OtpVerification, DomainError> {
        let phone = normalize_phone(raw_phone)?;
        validate_code_format(code)?;
        self.codes.check_at(&phone, code, now)?;

        let user_verified = self.repo.mark_phone_verified(&phone).await?;
        info!(%phone, user_verified, "phone verified");
        Ok(OtpVerification {
            phone,
            user_verified,
        })
    }
}
