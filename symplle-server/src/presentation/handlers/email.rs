use axum::extract::State;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::presentation::AppState;
use crate::presentation::app_error::AppResult;
use crate::presentation::envelope::{ApiResponse, Message};
use crate::presentation::extract::{AppJson, AppQuery};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct EmailQuery {
    pub(crate) email: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct UsernameQuery {
    pub(crate) username: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct SendEmailVerificationDto {
    #[validate(length(min = 3, max = 255))]
    pub(crate) email: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct VerifyEmailDto {
    #[validate(length(min = 3, max = 255))]
    pub(crate) email: String,
    #[validate(length(equal = 6))]
    pub(crate) code: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct EmailCheckDto {
    pub(crate) email: String,
    pub(crate) exists: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct UsernameCheckDto {
    pub(crate) username: String,
    pub(crate) exists: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct EmailSentDto {
    pub(crate) email: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct EmailVerifiedDto {
    pub(crate) email: String,
    pub(crate) verified: bool,
    /// Whether a registered account now has the email marked verified.
    pub(crate) user_verified: bool,
}

#[utoipa::path(
    get,
    path = "/api/check-email",
    tag = "email",
    params(EmailQuery),
    responses(
        (status = 200, description = "Whether an account uses the email", body = EmailCheckDto),
        (status = 400, description = "Malformed email")
    )
)]
pub(crate) async fn check_email(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<EmailQuery>,
) -> AppResult<ApiResponse<EmailCheckDto>> {
    let check = state.user_service.check_email(&query.email).await?;
    Ok(ApiResponse::ok(
        Message::new("users.email_checked"),
        EmailCheckDto {
            email: check.email,
            exists: check.exists,
        },
    ))
}

#[utoipa::path(
    get,
    path = "/api/check-username",
    tag = "email",
    params(UsernameQuery),
    responses(
        (status = 200, description = "Whether an account uses the username", body = UsernameCheckDto),
        (status = 400, description = "Username outside 3..64 chars")
    )
)]
pub(crate) async fn check_username(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<UsernameQuery>,
) -> AppResult<ApiResponse<UsernameCheckDto>> {
    let check = state.user_service.check_username(&query.username).await?;
    Ok(ApiResponse::ok(
        Message::new("users.username_checked"),
        UsernameCheckDto {
            username: check.username,
            exists: check.exists,
        },
    ))
}

#[utoipa::path(
    post,
    path = "/api/send-email-verification",
    tag = "email",
    request_body = SendEmailVerificationDto,
    responses(
        (status = 200, description = "Code mailed", body = EmailSentDto),
        (status = 400, description = "Malformed email")
    )
)]
pub(crate) async fn send_email_verification(
    State(state): State<AppState>,
    AppJson(dto): AppJson<SendEmailVerificationDto>,
) -> AppResult<ApiResponse<EmailSentDto>> {
    dto.validate()?;
    let email = state.email_verification_service.send_code(&dto.email).await?;
    Ok(ApiResponse::ok(
        Message::new("email.verification_sent").arg("email", email.clone()),
        EmailSentDto { email },
    ))
}

#[utoipa::path(
    post,
    path = "/api/verify-email",
    tag = "email",
    request_body = VerifyEmailDto,
    responses(
        (status = 200, description = "Email verified", body = EmailVerifiedDto),
        (status = 400, description = "Invalid or expired code"),
        (status = 429, description = "Too many attempts")
    )
)]
pub(crate) async fn verify_email(
    State(state): State<AppState>,
    AppJson(dto): AppJson<VerifyEmailDto>,
) -> AppResult<ApiResponse<EmailVerifiedDto>> {
    dto.validate()?;
    let verification = state
        .email_verification_service
        .verify(&dto.email, &dto.code)
        .await?;
    Ok(ApiResponse::ok(
        Message::new("email.verified"),
        EmailVerifiedDto {
            email: verification.email,
            verified: true,
            user_verified: verification.user_verified,
        },
    ))
}
