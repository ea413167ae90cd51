pub mod database;
pub(crate) mod email_sender;
pub(crate) mod expiring_cache;
pub(crate) mod jwt;
pub mod logging;
pub(crate) mod otp_sender;
pub mod settings;
