pub(crate) mod chat;
pub(crate) mod comment;
pub(crate) mod error;
pub(crate) mod otp;
pub(crate) mod post;
pub(crate) mod ranking;
pub(crate) mod user;
