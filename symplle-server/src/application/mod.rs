pub(crate) mod auth_service;
pub(crate) mod chat_service;
pub(crate) mod comment_service;
pub(crate) mod email_verification_service;
pub(crate) mod otp_service;
pub(crate) mod post_service;
pub(crate) mod timeline_service;
pub(crate) mod user_service;
pub(crate) mod verification_codes;
