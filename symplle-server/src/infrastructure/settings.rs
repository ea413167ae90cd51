use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};

use crate::i18n::Locale;

const DEFAULT_SUPPORTED_LOCALES: &str = "pt_BR,en_US,es_ES";

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_ttl_seconds: i64,
    pub http_addr: String,
    pub cors_origins: Vec<String>,
    pub log_level: String,
    pub http_request_body_limit_bytes: usize,
    pub http_request_timeout_secs: u64,
    pub locales_dir: PathBuf,
    pub(crate) default_locale: Locale,
    pub(crate) supported_locales: Vec<Locale>,
    pub otp_ttl_secs: u64,
    pub otp_max_attempts: u32,
    pub otp_cache_capacity: usize,
    pub session_ttl_secs: i64,
    pub secure_cookies: bool,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let database_url = get_required("DATABASE_URL").context("DATABASE_URL is required")?;
        let jwt_secret = get_required("JWT_SECRET").context("JWT_SECRET is required")?;
        let jwt_ttl_seconds: i64 = std::env::var("JWT_TTL_SECONDS")
            .unwrap_or_else(|_| "3600".to_string())
            .parse()
            .context("Failed to parse JWT_TTL_SECONDS, expecting integer")?;

        if jwt_secret.chars().count() < 32 {
            return Err(anyhow!("JWT_SECRET must be at least 32 characters"));
        }

        let http_addr = std::env::var("HTTP_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
        let cors_origins = parse_list(
            std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:3000,http://127.0.0.1:3000".to_string()),
        );
        let log_level = std::env::var("LOG_LEVEL")
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| "info".to_string());
        let http_request_body_limit_bytes =
            parse_usize_env("HTTP_REQUEST_BODY_LIMIT_BYTES", 1024 * 1024)?;
        let http_request_timeout_secs = parse_u64_env("HTTP_REQUEST_TIMEOUT_SECS", 10)?;

        let locales_dir = std::env::var("LOCALES_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/locales")));
        let default_locale = parse_locale(
            "DEFAULT_LOCALE",
            &std::env::var("DEFAULT_LOCALE").unwrap_or_else(|_| "en_US".to_string()),
        )?;
        let supported_locales = supported_locales_from_env()
            .iter()
            .map(|raw| parse_locale("SUPPORTED_LOCALES", raw))
            .collect::<Result<Vec<_>>>()?;

        if !locales_dir.join(default_locale.as_str()).is_dir() {
            return Err(anyhow!(
                "DEFAULT_LOCALE {default_locale} has no bundle under {}",
                locales_dir.display()
            ));
        }

        let otp_ttl_secs = parse_u64_env("OTP_TTL_SECS", 600)?;
        let otp_max_attempts = u32::try_from(parse_u64_env("OTP_MAX_ATTEMPTS", 5)?)
            .context("OTP_MAX_ATTEMPTS is too large")?;
        let otp_cache_capacity = parse_usize_env("OTP_CACHE_CAPACITY", 10_000)?;
        let session_ttl_secs = i64::try_from(parse_u64_env("SESSION_TTL_SECS", 30 * 24 * 60 * 60)?)
            .context("SESSION_TTL_SECS is too large")?;
        let secure_cookies = std::env::var("SECURE_COOKIES")
            .map(|raw| matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            database_url,
            jwt_secret,
            jwt_ttl_seconds,
            http_addr,
            cors_origins,
            log_level,
            http_request_body_limit_bytes,
            http_request_timeout_secs,
            locales_dir,
            default_locale,
            supported_locales,
            otp_ttl_secs,
            otp_max_attempts,
            otp_cache_capacity,
            session_ttl_secs,
            secure_cookies,
        })
    }
}

/// Raw `SUPPORTED_LOCALES` entries; re-read when translations reload.
pub(crate) fn supported_locales_from_env() -> Vec<String> {
    parse_list(
        std::env::var("SUPPORTED_LOCALES").unwrap_or_else(|_| DEFAULT_SUPPORTED_LOCALES.to_string()),
    )
}

fn get_required(key: &str) -> Result<String> {
    let value = std::env::var(key)?;
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(anyhow!("{key} must not be empty"));
    }
    Ok(value)
}

fn parse_list(raw: String) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_locale(key: &str, raw: &str) -> Result<Locale> {
    Locale::parse(raw).ok_or_else(|| anyhow!("{key} contains an invalid locale: {raw}"))
}

fn parse_usize_env(key: &str, default: usize) -> Result<usize> {
    let value = std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse::<usize>()
        .with_context(|| format!("Failed to parse {key}, expecting positive integer"))?;

    if value == 0 {
        return Err(anyhow!("{key} must be > 0"));
    }
    Ok(value)
}

fn parse_u64_env(key: &str, default: u64) -> Result<u64> {
    let value = std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse::<u64>()
        .with_context(|| format!("Failed to parse {key}, expecting positive integer"))?;

    if value == 0 {
        return Err(anyhow!("{key} must be > 0"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::{parse_list, parse_locale};

    #[test]
    fn parse_list_skips_blank_entries() {
        let items = parse_list(" pt_BR, ,en_US,, es_ES ".to_string());
        assert_eq!(items, vec!["pt_BR", "en_US", "es_ES"]);
    }

    #[test]
    fn parse_locale_normalizes_and_rejects() {
        assert_eq!(
            parse_locale("DEFAULT_LOCALE", "pt-br").expect("valid").as_str(),
            "pt_BR"
        );
        assert!(parse_locale("DEFAULT_LOCALE", "portuguese").is_err());
    }
}
