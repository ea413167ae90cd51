use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::info;

mod application;
mod data;
mod domain;
mod i18n;
mod infrastructure;
mod presentation;
mod server;

#[cfg(test)]
mod test_support;

use application::otp_service::OtpSettings;
use data::repositories::postgres::{
    PostgresChatRepository, PostgresCommentRepository, PostgresPostRepository,
    PostgresTimelineRepository, PostgresUserRepository,
};
use i18n::I18n;
use infrastructure::database::{create_pool, run_migrations};
use infrastructure::email_sender::LogEmailSender;
use infrastructure::jwt::JwtService;
use infrastructure::logging::init_logging;
use infrastructure::otp_sender::LogOtpSender;
use infrastructure::settings::Settings;
use presentation::{AppState, Repositories, Senders};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let settings = Settings::from_env()?;

    init_logging(&settings.log_level)?;

    let pool = create_pool(&settings.database_url).await?;
    run_migrations(&pool).await?;

    let i18n = Arc::new(I18n::load(
        settings.locales_dir.clone(),
        settings.default_locale.clone(),
        &settings.supported_locales,
    ));
    info!(
        default_locale = %settings.default_locale,
        locales = settings.supported_locales.len(),
        "translations loaded"
    );

    let repos = Repositories {
        users: Arc::new(PostgresUserRepository::new(pool.clone())),
        posts: Arc::new(PostgresPostRepository::new(pool.clone())),
        comments: Arc::new(PostgresCommentRepository::new(pool.clone())),
        timeline: Arc::new(PostgresTimelineRepository::new(pool.clone())),
        chat: Arc::new(PostgresChatRepository::new(pool)),
    };
    let senders = Senders {
        otp: Arc::new(LogOtpSender),
        email: Arc::new(LogEmailSender),
    };
    let otp_settings = OtpSettings {
        ttl: Duration::from_secs(settings.otp_ttl_secs),
        max_attempts: settings.otp_max_attempts,
        capacity: settings.otp_cache_capacity,
    };
    let jwt = JwtService::new(&settings.jwt_secret, settings.jwt_ttl_seconds);

    let state = AppState::new(repos, senders, otp_settings, jwt, i18n);

    server::run_http(&settings, state).await
}
