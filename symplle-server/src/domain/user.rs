use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

use super::error::DomainError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct RegisterRequest {
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) password: String,
    pub(crate) first_name: Option<String>,
    pub(crate) last_name: Option<String>,
    pub(crate) phone: Option<String>,
    pub(crate) preferred_locale: Option<String>,
}

impl RegisterRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let username = normalize_register_username(&self.username)?;
        let email = normalize_email(&self.email)?;
        let password_len = self.password.chars().count();
        if !(8..=128).contains(&password_len) {
            return Err(DomainError::Validation {
                field: "password",
                message: "must be 8..128 chars",
            });
        }
        let phone = self.phone.as_deref().map(normalize_phone).transpose()?;
        Ok(Self {
            username,
            email,
            password: self.password,
            first_name: normalize_name("first_name", self.first_name)?,
            last_name: normalize_name("last_name", self.last_name)?,
            phone,
            preferred_locale: self.preferred_locale,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct LoginRequest {
    pub(crate) username: String,
    pub(crate) password: String,
}

impl LoginRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let username = self.username.trim();
        if username.is_empty() || username.len() > 64 {
            return Err(DomainError::Validation {
                field: "username",
                message: "must be 1..64 chars",
            });
        }

        if self.password.is_empty() {
            return Err(DomainError::Validation {
                field: "password",
                message: "must not be empty",
            });
        }
        Ok(Self {
            username: username.to_string(),
            password: self.password,
        })
    }
}

#[derive(Debug, Clone)]
pub(crate) struct User {
    pub(crate) id: i64,
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) first_name: Option<String>,
    pub(crate) last_name: Option<String>,
    pub(crate) phone: Option<String>,
    pub(crate) avatar_url: Option<String>,
    pub(crate) preferred_locale: Option<String>,
    pub(crate) phone_verified: bool,
    pub(crate) email_verified: bool,
    pub(crate) created_at: DateTime<Utc>,
}

impl User {
    pub(crate) fn new(
        id: i64,
        username: impl Into<String>,
        email: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if id <= 0 {
            return Err(DomainError::Validation {
                field: "id",
                message: "must be > 0",
            });
        }
        let username = normalize_register_username(&username.into())?;
        let email = normalize_email(&email.into())?;

        Ok(Self {
            id,
            username,
            email,
            first_name: None,
            last_name: None,
            phone: None,
            avatar_url: None,
            preferred_locale: None,
            phone_verified: false,
            email_verified: false,
            created_at,
        })
    }

    pub(crate) fn display_name(&self) -> String {
        display_name(
            &self.username,
            self.first_name.as_deref(),
            self.last_name.as_deref(),
        )
    }
}

/// Compact author view attached to posts and comments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AuthorSummary {
    pub(crate) id: i64,
    pub(crate) username: String,
    pub(crate) name: String,
    pub(crate) avatar_url: Option<String>,
}

impl From<&User> for AuthorSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            name: user.display_name(),
            avatar_url: user.avatar_url.clone(),
        }
    }
}

pub(crate) fn display_name(username: &str, first: Option<&str>, last: Option<&str>) -> String {
    let full = format!("{} {}", first.unwrap_or_default(), last.unwrap_or_default());
    let full = full.trim();
    if full.is_empty() {
        username.to_string()
    } else {
        full.to_string()
    }
}

/// Normalizes a phone number to `+<digits>`; 8..15 digits as in E.164.
pub(crate) fn normalize_phone(raw: &str) -> Result<String, DomainError> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if !(8..=15).contains(&digits.len()) {
        return Err(DomainError::Validation {
            field: "phone",
            message: "must contain 8..15 digits",
        });
    }
    Ok(format!("+{digits}"))
}

pub(crate) fn normalize_register_username(username: &str) -> Result<String, DomainError> {
    let username = username.trim();
    if username.len() < 3 || username.len() > 64 {
        return Err(DomainError::Validation {
            field: "username",
            message: "must be 3..64 chars",
        });
    }
    Ok(username.to_string())
}

pub(crate) fn normalize_email(email: &str) -> Result<String, DomainError> {
    let email = email.trim().to_lowercase();
    if !email.validate_email() {
        return Err(DomainError::Validation {
            field: "email",
            message: "must be a valid email",
        });
    }
    Ok(email)
}

fn normalize_name(
    field: &'static str,
    value: Option<String>,
) -> Result<Option<String>, DomainError> {
    let Some(value) = value else {
        return Ok(None);
    };
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    if value.chars().count() > 50 {
        return Err(DomainError::Validation {
            field,
            message: "must be at most 50 chars",
        });
    }
    Ok(Some(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::{
        RegisterRequest, User, display_name, normalize_email, normalize_phone,
        normalize_register_username,
    };
    use chrono::Utc;

    #[test]
    fn user_new_rejects_non_positive_id() {
        let result = User::new(0, "valid_user", "test@example.com", Utc::now());
        assert!(result.is_err());
    }

    #[test]
    fn normalize_email_trims_and_lowercases() {
        let value = normalize_email("  TeSt@Example.COM ").expect("must be valid");
        assert_eq!(value, "test@example.com");
    }

    #[test]
    fn register_username_rules_are_applied() {
        assert!(normalize_register_username("ab").is_err());
        assert!(normalize_register_username("valid_user").is_ok());
    }

    #[test]
    fn register_password_length_is_checked() {
        let short = register_request("short");
        assert!(short.validate().is_err());

        let validated = register_request("very-secure-password")
            .validate()
            .expect("must be valid");
        assert_eq!(validated.username, "valid_user");
        assert_eq!(validated.email, "test@example.com");
    }

    #[test]
    fn register_normalizes_optional_profile_fields() {
        let mut req = register_request("very-secure-password");
        req.first_name = Some("  Ana ".to_string());
        req.last_name = Some("   ".to_string());
        req.phone = Some("+55 (11) 98765-4321".to_string());

        let validated = req.validate().expect("must be valid");
        assert_eq!(validated.first_name.as_deref(), Some("Ana"));
        assert_eq!(validated.last_name, None);
        assert_eq!(validated.phone.as_deref(), Some("+5511987654321"));
    }

    #[test]
    fn normalize_phone_rejects_short_numbers() {
        assert!(normalize_phone("12-34").is_err());
        assert_eq!(
            normalize_phone("555 123 4567 89").expect("valid"),
            "+555123456789"
        );
    }

    #[test]
    fn display_name_falls_back_to_username() {
        assert_eq!(display_name("ana", None, None), "ana");
        assert_eq!(display_name("ana", Some("Ana"), None), "Ana");
        assert_eq!(display_name("ana", Some("Ana"), Some("Souza")), "Ana Souza");
    }

    fn register_request(password: &str) -> RegisterRequest {
        RegisterRequest {
            username: "valid_user".to_string(),
            email: "test@example.com".to_string(),
            password: password.to_string(),
            first_name: None,
            last_name: None,
            phone: None,
            preferred_locale: None,
        }
    }
}
