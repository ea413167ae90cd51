use rand::Rng;

use super::error::DomainError;

pub(crate) const OTP_CODE_LENGTH: usize = 6;

/// A pending phone verification code.
#[derive(Debug, Clone)]
pub(crate) struct OtpChallenge {
    code: String,
    failed_attempts: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OtpCheck {
    Verified,
    Mismatch { remaining: u32 },
    Exhausted,
}

impl OtpChallenge {
    pub(crate) fn generate<R: Rng>(rng: &mut R) -> Self {
        let code = (0..OTP_CODE_LENGTH)
            .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
            .collect();
        Self::with_code(code)
    }

    pub(crate) fn with_code(code: String) -> Self {
        Self {
            code,
            failed_attempts: 0,
        }
    }

    pub(crate) fn code(&self) -> &str {
        &self.code
    }

    /// Records an attempt. Once `max_attempts` failures accumulate the
    /// challenge is exhausted and must be discarded by the caller.
    pub(crate) fn check(&mut self, candidate: &str, max_attempts: u32) -> OtpCheck {
        if self.failed_attempts >= max_attempts {
            return OtpCheck::Exhausted;
        }
        if candidate.trim() == self.code {
            return OtpCheck::Verified;
        }
        self.failed_attempts += 1;
        if self.failed_attempts >= max_attempts {
            OtpCheck::Exhausted
        } else {
            OtpCheck::Mismatch {
                remaining: max_attempts - self.failed_attempts,
            }
        }
    }
}

pub(crate) fn validate_code_format(code: &str) -> Result<(), DomainError> {
    let code = code.trim();
    if code.len() != OTP_CODE_LENGTH || !code.chars().all(|c| c.is_ascii_digit()) {
        return Err(DomainError::Validation {
            field: "code",
            message: "must be 6 digits",
        });
    }
    Ok(())
}
