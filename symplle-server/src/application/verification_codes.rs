use std::time::Instant;

use tracing::warn;

use super::otp_service::OtpSettings;
use crate::domain::error::DomainError;
use crate::domain::otp::{OtpChallenge, OtpCheck};
use crate::infrastructure::expiring_cache::{EntryAction, ExpiringCache};

/// Pending one-time codes keyed by the address they were sent to.
pub(crate) struct VerificationCodes {
    challenges: ExpiringCache<String, OtpChallenge>,
    max_attempts: u32,
}

impl VerificationCodes {
    pub(crate) fn new(settings: &OtpSettings) -> Self {
        Self {
            challenges: ExpiringCache::new(settings.capacity, settings.ttl),
            max_attempts: settings.max_attempts.max(1),
        }
    }

    /// Replaces any pending code for `key`.
    pub(crate) fn insert(&self, key: String, challenge: OtpChallenge) {
        self.challenges.insert(key, challenge);
    }

    /// Consumes the pending code on a match or once attempts run out.
    pub(crate) fn check_at(&self, key: &str, code: &str, now: Instant) -> Result<(), DomainError> {
        let max_attempts = self.max_attempts;
        let outcome = self
            .challenges
            .modify_at(&key.to_string(), now, |challenge| {
                match challenge.check(code, max_attempts) {
                    OtpCheck::Verified => (OtpCheck::Verified, EntryAction::Remove),
                    OtpCheck::Exhausted => (OtpCheck::Exhausted, EntryAction::Remove),
                    mismatch @ OtpCheck::Mismatch { .. } => (mismatch, EntryAction::Keep),
                }
            })
            .ok_or(DomainError::InvalidOtp)?;

        match outcome {
            OtpCheck::Verified => Ok(()),
            OtpCheck::Mismatch { remaining } => {
                warn!(%key, remaining, "verification code mismatch");
                Err(DomainError::InvalidOtp)
            }
            OtpCheck::Exhausted => {
                warn!(%key, "verification attempts exhausted");
                Err(DomainError::OtpAttemptsExceeded)
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn pending_code(&self, key: &str) -> Option<String> {
        self.challenges
            .get(&key.to_string())
            .map(|challenge| challenge.code().to_string())
    }

    #[cfg(test)]
    pub(crate) fn pending_count(&self) -> usize {
        self.challenges.len()
    }
}
