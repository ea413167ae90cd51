use std::sync::Arc;

use crate::data::user_repository::UserRepository;
use crate::domain::error::DomainError;
use crate::domain::user::{User, normalize_email, normalize_register_username};
use crate::i18n::I18n;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EmailCheck {
    pub(crate) email: String,
    pub(crate) exists: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct UsernameCheck {
    pub(crate) username: String,
    pub(crate) exists: bool,
}

pub(crate) struct UserService<R: UserRepository> {
    repo: R,
    i18n: Arc<I18n>,
}

impl<R: UserRepository> UserService<R> {
    pub(crate) fn new(repo: R, i18n: Arc<I18n>) -> Self {
        Self { repo, i18n }
    }

    pub(crate) async fn get_profile(&self, user_id: i64) -> Result<User, DomainError> {
        self.repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("user id: {user_id}")))
    }

    pub(crate) async fn check_email(&self, raw_email: &str) -> Result<EmailCheck, DomainError> {
        let email = normalize_email(raw_email)?;
        let exists = self.repo.email_exists(&email).await?;
        Ok(EmailCheck { email, exists })
    }

    pub(crate) async fn check_username(&self, raw_username: &str) -> Result<UsernameCheck, DomainError> {
        let username = normalize_register_username(raw_username)?;
        let exists = self.repo.username_exists(&username).await?;
        Ok(UsernameCheck { username, exists })
    }

    /// `None` or a blank tag clears the stored preference.
    pub(crate) async fn set_preferred_locale(
        &self,
        user_id: i64,
        raw: Option<&str>,
    ) -> Result<User, DomainError> {
        let locale = match raw.map(str::trim) {
            Some(raw) if !raw.is_empty() => Some(self.i18n.resolve(raw)?),
            _ => None,
        };

        self.repo
            .set_preferred_locale(user_id, locale.as_ref().map(|locale| locale.as_str()))
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("user id: {user_id}")))
    }
}
