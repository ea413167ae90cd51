use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        Error as PasswordHashError, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
        rand_core::OsRng,
    },
};

use std::sync::Arc;

use tracing::info;

use crate::data::user_repository::{NewUser, UserRepository};
use crate::domain::error::DomainError;
use crate::domain::user::{LoginRequest, RegisterRequest, User};
use crate::i18n::I18n;
use crate::infrastructure::jwt::JwtService;

#[derive(Debug, Clone)]
pub(crate) struct AuthResult {
    pub(crate) user: User,
    pub(crate) access_token: String,
}

pub(crate) struct AuthService<R: UserRepository> {
    repo: R,
    jwt: JwtService,
    i18n: Arc<I18n>,
}

impl<R: UserRepository> AuthService<R> {
    const DUMMY_PASSWORD_HASH: &'static str = "$argon2id$v=19$m=19456,t=2,p=1$MDEyMzQ1Njc4OWFiY2RlZg$gwN6hT1sNdk9kI95f7n2Gl3fL0qRmBf2Ffkj2r90/0M";

    pub(crate) fn new(repo: R, jwt: JwtService, i18n: Arc<I18n>) -> Self {
        Self { repo, jwt, i18n }
    }

    pub(crate) async fn register(&self, req: RegisterRequest) -> Result<AuthResult, DomainError> {
        let req = req.validate()?;
        let preferred_locale = match req.preferred_locale.as_deref() {
            Some(raw) if !raw.trim().is_empty() => Some(self.i18n.resolve(raw)?.to_string()),
            _ => None,
        };

        let password_hash = self.hash_password(&req.password)?;

        let new_user = Self::into_new_user(req, password_hash, preferred_locale);
        let user = self.repo.create_user(new_user).await?;

        let access_token = self.issue_token(&user)?;
        info!(user_id = user.id, "user registered");

        Ok(AuthResult { user, access_token })
    }

    pub(crate) async fn login(&self, req: LoginRequest) -> Result<AuthResult, DomainError> {
        let req = req.validate()?;
        let Some(creds) = self.repo.find_by_username(&req.username).await? else {
            // burn a verification so unknown usernames cost the same time
            match self.verify_password(&req.password, Self::DUMMY_PASSWORD_HASH) {
                Ok(()) | Err(DomainError::InvalidCredentials) => {}
                Err(err) => return Err(err),
            }
            info!(username = %req.username, "login rejected: unknown user");
            return Err(DomainError::InvalidCredentials);
        };

        if let Err(err) = self.verify_password(&req.password, &creds.password_hash) {
            info!(user_id = creds.user.id, "login rejected: bad password");
            return Err(err);
        }
        let access_token = self.issue_token(&creds.user)?;

        Ok(AuthResult {
            user: creds.user,
            access_token,
        })
    }

    /// Argon2id PHC string with a fresh random salt.
    pub(crate) fn hash_password(&self, raw_password: &str) -> Result<String, DomainError> {
        let salt = SaltString::generate(&mut OsRng);
        Self::hasher()?
            .hash_password(raw_password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(unexpected)
    }

    pub(crate) fn verify_password(&self, raw_password: &str, stored_hash: &str) -> Result<(), DomainError> {
        let stored = PasswordHash::new(stored_hash).map_err(unexpected)?;
        match Self::hasher()?.verify_password(raw_password.as_bytes(), &stored) {
            Ok(()) => Ok(()),
            Err(PasswordHashError::Password) => Err(DomainError::InvalidCredentials),
            Err(err) => Err(unexpected(err)),
        }
    }

    fn into_new_user(req: RegisterRequest, password_hash: String, preferred_locale: Option<String>) -> NewUser {
        NewUser {
            username: req.username,
            email: req.email,
            password_hash,
            first_name: req.first_name,
            last_name: req.last_name,
            phone: req.phone,
            preferred_locale,
        }
    }

    fn issue_token(&self, user: &User) -> Result<String, DomainError> {
        self.jwt.issue(user.id, &user.username).map_err(unexpected)
    }

    fn hasher() -> Result<Argon2<'static>, DomainError> {
        let params = Params::new(19 * 1024, 2, 1, None).map_err(unexpected)?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

fn unexpected(err: impl std::fmt::Display) -> DomainError {
    DomainError::Unexpected(err.to_string())
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::Utc;

    use super::AuthService;
    use crate::data::user_repository::{NewUser, UserCredentials, UserRepository};
    use crate::domain::error::DomainError;
    use crate::domain::user::{LoginRequest, RegisterRequest, User};
    use crate::i18n::tests::shipped_i18n;
    use crate::infrastructure::jwt::JwtService;

    #[derive(Clone)]
    struct FakeUserRepo {
        created_input: Arc<Mutex<Option<NewUser>>>,
        login_credentials: Arc<Mutex<Option<UserCredentials>>>,
        create_user_out: User,
    }

    impl FakeUserRepo {
        fn new(create_user_out: User) -> Self {
            Self {
                created_input: Arc::new(Mutex::new(None)),
                login_credentials: Arc::new(Mutex::new(None)),
                create_user_out,
            }
        }

        fn set_login_credentials(&self, creds: Option<UserCredentials>) {
            *self
                .login_credentials
                .lock()
                .expect("login credentials mutex poisoned") = creds;
        }

        fn take_created_input(&self) -> Option<NewUser> {
            self.created_input
                .lock()
                .expect("created input mutex poisoned")
                .take()
        }
    }

    #[async_trait]
    impl UserRepository for FakeUserRepo {
        async fn create_user(&self, input: NewUser) -> Result<User, DomainError> {
            *self
                .created_input
                .lock()
                .expect("created input mutex poisoned") = Some(input);
            Ok(self.create_user_out.clone())
        }

        async fn find_by_username(
            &self,
            _username: &str,
        ) -> Result<Option<UserCredentials>, DomainError> {
            Ok(self
                .login_credentials
                .lock()
                .expect("login credentials mutex poisoned")
                .clone())
        }

        async fn find_by_id(&self, _id: i64) -> Result<Option<User>, DomainError> {
            Ok(None)
        }

        async fn phone_exists(&self, _phone: &str) -> Result<bool, DomainError> {
            Ok(false)
        }

        async fn email_exists(&self, _email: &str) -> Result<bool, DomainError> {
            Ok(false)
        }

        async fn username_exists(&self, _username: &str) -> Result<bool, DomainError> {
            Ok(false)
        }

        async fn mark_phone_verified(&self, _phone: &str) -> Result<bool, DomainError> {
            Ok(false)
        }

        async fn mark_email_verified(&self, _email: &str) -> Result<bool, DomainError> {
            Ok(false)
        }

        async fn set_preferred_locale(
            &self,
            _user_id: i64,
            _locale: Option<&str>,
        ) -> Result<Option<User>, DomainError> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn register_creates_user_and_returns_token() {
        let repo = FakeUserRepo::new(sample_user(1, "valid_user", "valid@example.com"));
        let service = AuthService::new(repo.clone(), test_jwt(), shipped_i18n());

        let req = RegisterRequest {
            username: "  valid_user  ".to_string(),
            email: "  VALID@EXAMPLE.COM  ".to_string(),
            password: "very-secure-password".to_string(),
            first_name: Some(" Ana ".to_string()),
            last_name: None,
            phone: Some("+55 (11) 98765-4321".to_string()),
            preferred_locale: Some("pt-br".to_string()),
        };

        let result = service.register(req).await.expect("register must succeed");

        assert_eq!(result.user.username, "valid_user");
        assert!(!result.access_token.is_empty());

        let created = repo
            .take_created_input()
            .expect("create_user must be called");
        assert_eq!(created.username, "valid_user");
        assert_eq!(created.email, "valid@example.com");
        assert_eq!(created.first_name.as_deref(), Some("Ana"));
        assert_eq!(created.phone.as_deref(), Some("+5511987654321"));
        assert_eq!(created.preferred_locale.as_deref(), Some("pt_BR"));
        assert!(!created.password_hash.is_empty());
    }

    #[tokio::test]
    async fn register_rejects_unsupported_locale() {
        let repo = FakeUserRepo::new(sample_user(1, "valid_user", "valid@example.com"));
        let service = AuthService::new(repo.clone(), test_jwt(), shipped_i18n());

        let req = RegisterRequest {
            username: "valid_user".to_string(),
            email: "valid@example.com".to_string(),
            password: "very-secure-password".to_string(),
            first_name: None,
            last_name: None,
            phone: None,
            preferred_locale: Some("xx".to_string()),
        };

        let err = service.register(req).await.expect_err("register must fail");
        assert!(matches!(err, DomainError::UnsupportedLocale { .. }));
        assert!(repo.take_created_input().is_none());
    }

    #[tokio::test]
    async fn login_returns_invalid_credentials_for_missing_user() {
        let repo = FakeUserRepo::new(sample_user(1, "valid_user", "valid@example.com"));
        repo.set_login_credentials(None);
        let service = AuthService::new(repo, test_jwt(), shipped_i18n());

        let req = LoginRequest {
            username: "valid_user".to_string(),
            password: "some-password".to_string(),
        };

        let err = service.login(req).await.expect_err("login must fail");
        assert!(matches!(err, DomainError::InvalidCredentials));
    }

    #[tokio::test]
    async fn login_returns_invalid_credentials_for_wrong_password() {
        let repo = FakeUserRepo::new(sample_user(1, "valid_user", "valid@example.com"));
        let service = AuthService::new(repo.clone(), test_jwt(), shipped_i18n());

        let hash = service
            .hash_password("correct-password")
            .expect("hash must be created");
        repo.set_login_credentials(Some(UserCredentials {
            user: sample_user(1, "valid_user", "valid@example.com"),
            password_hash: hash,
        }));

        let req = LoginRequest {
            username: "valid_user".to_string(),
            password: "wrong-password".to_string(),
        };

        let err = service.login(req).await.expect_err("login must fail");
        assert!(matches!(err, DomainError::InvalidCredentials));
    }

    #[tokio::test]
    async fn login_returns_token_for_valid_credentials() {
        let repo = FakeUserRepo::new(sample_user(1, "valid_user", "valid@example.com"));
        let jwt = test_jwt();
        let service = AuthService::new(repo.clone(), jwt.clone(), shipped_i18n());

        let hash = service
            .hash_password("correct-password")
            .expect("hash must be created");
        repo.set_login_credentials(Some(UserCredentials {
            user: sample_user(1, "valid_user", "valid@example.com"),
            password_hash: hash,
        }));

        let req = LoginRequest {
            username: "valid_user".to_string(),
            password: "correct-password".to_string(),
        };

        let result = service.login(req).await.expect("login must succeed");
        assert_eq!(result.user.id, 1);
        let claims = jwt.verify(&result.access_token).expect("token must verify");
        assert_eq!(claims.sub, 1);
        assert_eq!(claims.username, "valid_user");
    }

    #[test]
    fn dummy_hash_verifies_without_internal_errors() {
        let service = AuthService::new(
            FakeUserRepo::new(sample_user(1, "valid_user", "valid@example.com")),
            test_jwt(),
            shipped_i18n(),
        );

        let result = service.verify_password("anything", AuthService::<FakeUserRepo>::DUMMY_PASSWORD_HASH);
        assert!(matches!(result, Ok(()) | Err(DomainError::InvalidCredentials)));
    }

    #[test]
    fn malformed_stored_hash_is_unexpected_not_bad_credentials() {
        let service = AuthService::new(
            FakeUserRepo::new(sample_user(1, "valid_user", "valid@example.com")),
            test_jwt(),
            shipped_i18n(),
        );

        let err = service
            .verify_password("anything", "not-a-phc-string")
            .expect_err("malformed hash must fail");
        assert!(matches!(err, DomainError::Unexpected(_)));
    }

    fn sample_user(id: i64, username: &str, email: &str) -> User {
        User::new(id, username.to_string(), email.to_string(), Utc::now())
            .expect("sample user must be valid")
    }

    fn test_jwt() -> JwtService {
        JwtService::new("0123456789abcdef0123456789abcdef", 3600)
    }
}
