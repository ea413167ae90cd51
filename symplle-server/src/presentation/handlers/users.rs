use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::user::User;
use crate::i18n::Locale;
use crate::presentation::AppState;
use crate::presentation::app_error::AppResult;
use crate::presentation::envelope::{ApiResponse, Message};
use crate::presentation::extract::AppJson;
use crate::presentation::middleware::auth::CurrentUser;
use crate::presentation::middleware::locale::SignalLocale;

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct UserDto {
    pub(crate) id: i64,
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) name: String,
    pub(crate) first_name: Option<String>,
    pub(crate) last_name: Option<String>,
    pub(crate) phone: Option<String>,
    pub(crate) phone_verified: bool,
    pub(crate) email_verified: bool,
    pub(crate) avatar_url: Option<String>,
    pub(crate) preferred_locale: Option<String>,
    pub(crate) created_at: DateTime<Utc>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            name: user.display_name(),
            id: user.id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            phone: user.phone,
            phone_verified: user.phone_verified,
            email_verified: user.email_verified,
            avatar_url: user.avatar_url,
            preferred_locale: user.preferred_locale,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct UpdateLocaleDto {
    /// `null` or an empty string clears the preference.
    pub(crate) locale: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "users",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Current user", body = UserDto),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn get_me(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<ApiResponse<UserDto>> {
    let profile = state.user_service.get_profile(user.id).await?;
    Ok(ApiResponse::ok(
        Message::new("users.profile_retrieved"),
        profile.into(),
    ))
}

#[utoipa::path(
    put,
    path = "/api/users/me/locale",
    tag = "users",
    security(
        ("bearer_auth" = [])
    ),
    request_body = UpdateLocaleDto,
    responses(
        (status = 200, description = "Preference stored", body = UserDto),
        (status = 400, description = "Unsupported locale"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn update_locale(
    State(state): State<AppState>,
    user: CurrentUser,
    SignalLocale(fallback): SignalLocale,
    AppJson(dto): AppJson<UpdateLocaleDto>,
) -> AppResult<ApiResponse<UserDto>> {
    let updated = state
        .user_service
        .set_preferred_locale(user.id, dto.locale.as_deref())
        .await?;

    // answer in the language the user just picked, or in what the request
    // negotiates once the old preference is gone
    Ok(match updated.preferred_locale.as_deref().and_then(Locale::parse) {
        Some(locale) => {
            ApiResponse::ok(Message::new("users.locale_updated"), UserDto::from(updated)).in_locale(locale)
        }
        None => ApiResponse::ok(Message::new("users.locale_cleared"), UserDto::from(updated))
            .in_locale(fallback),
    })
}
