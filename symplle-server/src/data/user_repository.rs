use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::error::DomainError;
use crate::domain::user::User;

#[derive(Debug, Clone)]
pub(crate) struct UserCredentials {
    pub(crate) user: User,
    pub(crate) password_hash: String,
}

#[derive(Debug, Clone)]
pub(crate) struct NewUser {
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) password_hash: String,
    pub(crate) first_name: Option<String>,
    pub(crate) last_name: Option<String>,
    pub(crate) phone: Option<String>,
    pub(crate) preferred_locale: Option<String>,
}

#[async_trait]
pub(crate) trait UserRepository: Send + Sync {
    async fn create_user(&self, input: NewUser) -> Result<User, DomainError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<UserCredentials>, DomainError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DomainError>;
    async fn phone_exists(&self, phone: &str) -> Result<bool, DomainError>;
    async fn email_exists(&self, email: &str) -> Result<bool, DomainError>;
    async fn username_exists(&self, username: &str) -> Result<bool, DomainError>;
    /// Returns whether a user owns the phone.
    async fn mark_phone_verified(&self, phone: &str) -> Result<bool, DomainError>;
    /// Returns whether a user owns the email.
    async fn mark_email_verified(&self, email: &str) -> Result<bool, DomainError>;
    async fn set_preferred_locale(
        &self,
        user_id: i64,
        locale: Option<&str>,
    ) -> Result<Option<User>, DomainError>;
}

#[async_trait]
impl<T: UserRepository + ?Sized> UserRepository for Arc<T> {
    async fn create_user(&self, input: NewUser) -> Result<User, DomainError> {
        (**self).create_user(input).await
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserCredentials>, DomainError> {
        (**self).find_by_username(username).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DomainError> {
        (**self).find_by_id(id).await
    }

    async fn phone_exists(&self, phone: &str) -> Result<bool, DomainError> {
        (**self).phone_exists(phone).await
    }

    async fn email_exists(&self, email: &str) -> Result<bool, DomainError> {
        (**self).email_exists(email).await
    }

    async fn username_exists(&self, username: &str) -> Result<bool, DomainError> {
        (**self).username_exists(username).await
    }

    async fn mark_phone_verified(&self, phone: &str) -> Result<bool, DomainError> {
        (**self).mark_phone_verified(phone).await
    }

    async fn mark_email_verified(&self, email: &str) -> Result<bool, DomainError> {
        (**self).mark_email_verified(email).await
    }

    async fn set_preferred_locale(
        &self,
        user_id: i64,
        locale: Option<&str>,
    ) -> Result<Option<User>, DomainError> {
        (**self).set_preferred_locale(user_id, locale).await
    }
}
