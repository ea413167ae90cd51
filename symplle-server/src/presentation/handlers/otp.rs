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
pub(crate) struct PhoneQuery {
    pub(crate) phone: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct SendOtpDto {
    #[validate(length(min = 8, max = 32))]
    pub(crate) phone: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct VerifyOtpDto {
    #[validate(length(min = 8, max = 32))]
    pub(crate) phone: String,
    #[validate(length(equal = 6))]
    pub(crate) code: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PhoneCheckDto {
    pub(crate) phone: String,
    pub(crate) exists: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct OtpSentDto {
    pub(crate) phone: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct OtpVerifiedDto {
    pub(crate) phone: String,
    pub(crate) verified: bool,
    /// Whether a registered account now has the phone marked verified.
    pub(crate) user_verified: bool,
}

#[utoipa::path(
    get,
    path = "/api/otp/check-phone",
    tag = "otp",
    params(PhoneQuery),
    responses(
        (status = 200, description = "Whether an account uses the phone", body = PhoneCheckDto),
        (status = 400, description = "Malformed phone number")
    )
)]
pub(crate) async fn check_phone(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<PhoneQuery>,
) -> AppResult<ApiResponse<PhoneCheckDto>> {
    let check = state.otp_service.check_phone(&query.phone).await?;
    Ok(ApiResponse::ok(
        Message::new("otp.phone_checked"),
        PhoneCheckDto {
            phone: check.phone,
            exists: check.exists,
        },
    ))
}

#[utoipa::path(
    post,
    path = "/api/otp/send",
    tag = "otp",
    request_body = SendOtpDto,
    responses(
        (status = 200, description = "Code issued", body = OtpSentDto),
        (status = 400, description = "Malformed phone number")
    )
)]
pub(crate) async fn send_otp(
    State(state): State<AppState>,
    AppJson(dto): AppJson<SendOtpDto>,
) -> AppResult<ApiResponse<OtpSentDto>> {
    dto.validate()?;
    let phone = state.otp_service.send_otp(&dto.phone).await?;
    Ok(ApiResponse::ok(
        Message::new("otp.sent").arg("phone", phone.clone()),
        OtpSentDto { phone },
    ))
}

#[utoipa::path(
    post,
    path = "/api/otp/verify",
    tag = "otp",
    request_body = VerifyOtpDto,
    responses(
        (status = 200, description = "Phone verified", body = OtpVerifiedDto),
        (status = 400, description = "Invalid or expired code"),
        (status = 429, description = "Too many attempts")
    )
)]
pub(crate) async fn verify_otp(
    State(state): State<AppState>,
    AppJson(dto): AppJson<VerifyOtpDto>,
) -> AppResult<ApiResponse<OtpVerifiedDto>> {
    dto.validate()?;
    let verification = state.otp_service.verify_otp(&dto.phone, &dto.code).await?;
    Ok(ApiResponse::ok(
        Message::new("otp.verified"),
        OtpVerifiedDto {
            phone: verification.phone,
            verified: true,
            user_verified: verification.user_verified,
        },
    ))
}
