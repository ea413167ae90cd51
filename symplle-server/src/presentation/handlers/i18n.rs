use axum::extract::State;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use utoipa::ToSchema;
use validator::Validate;

use crate::i18n::{DateKind, I18n, Locale, LocaleContext, LocaleInfo};
use crate::presentation::AppState;
use crate::presentation::app_error::{AppError, AppResult};
use crate::presentation::envelope::{ApiResponse, Message};
use crate::presentation::extract::AppJson;
use crate::presentation::middleware::locale::SESSION_LOCALE_KEY;

const SAMPLE_AMOUNT: f64 = 1234.56;
const SAMPLE_NUMBER: f64 = 1_234_567.891;

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct DateSamplesDto {
    pub(crate) short: String,
    pub(crate) medium: String,
    pub(crate) long: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct FormatSamplesDto {
    pub(crate) date: DateSamplesDto,
    pub(crate) currency: String,
    pub(crate) number: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct TranslationSamplesDto {
    pub(crate) welcome: String,
    pub(crate) login: String,
    pub(crate) save: String,
    pub(crate) cancel: String,
    pub(crate) loading: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct I18nInfoDto {
    pub(crate) current_locale: String,
    pub(crate) default_locale: String,
    pub(crate) supported_locales: Vec<LocaleInfo>,
    pub(crate) formats: FormatSamplesDto,
    pub(crate) translations: TranslationSamplesDto,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CurrencySamplesDto {
    pub(crate) local: String,
    pub(crate) large: String,
    pub(crate) usd: String,
    pub(crate) brl: String,
    pub(crate) eur: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct DateTimeSamplesDto {
    pub(crate) short: String,
    pub(crate) medium: String,
    pub(crate) long: String,
    pub(crate) time_12: String,
    pub(crate) time_24: String,
    pub(crate) datetime: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct RelativeTimeSamplesDto {
    pub(crate) just_now: String,
    pub(crate) minutes: String,
    pub(crate) hours: String,
    pub(crate) days: String,
    pub(crate) weeks: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PhoneSampleDto {
    pub(crate) raw: &'static str,
    pub(crate) formatted: String,
    pub(crate) valid: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct I18nDemoDto {
    pub(crate) locale: String,
    pub(crate) translations: TranslationSamplesDto,
    pub(crate) greeting: String,
    pub(crate) currency: CurrencySamplesDto,
    pub(crate) numbers: Vec<String>,
    pub(crate) dates: DateTimeSamplesDto,
    pub(crate) relative_time: RelativeTimeSamplesDto,
    pub(crate) phone: PhoneSampleDto,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct ChangeLocaleDto {
    #[validate(length(min = 2, max = 16))]
    pub(crate) locale: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ChangeLocaleResponseDto {
    pub(crate) locale: String,
}

fn translation_samples(ctx: &LocaleContext) -> TranslationSamplesDto {
    TranslationSamplesDto {
        welcome: ctx.t("app.welcome"),
        login: ctx.t("auth.login.title"),
        save: ctx.t("common.save"),
        cancel: ctx.t("common.cancel"),
        loading: ctx.t("common.loading"),
    }
}

/// A local number in the shape the locale's phone rules expect.
fn sample_phone(locale: &Locale) -> &'static str {
    match locale.language() {
        "pt" => "11987654321",
        "es" => "612345678",
        _ => "2025550123",
    }
}

fn demo(i18n: &I18n, locale: &Locale, ctx: &LocaleContext, now: DateTime<Utc>) -> I18nDemoDto {
    let phone = sample_phone(locale);
    I18nDemoDto {
        locale: locale.to_string(),
        translations: translation_samples(ctx),
        greeting: ctx.t_with("auth.login.success", &[("username", "Symplle")]),
        currency: CurrencySamplesDto {
            local: i18n.format_currency(locale, SAMPLE_AMOUNT, None),
            large: i18n.format_currency(locale, 1_000_000.0, None),
            usd: i18n.format_currency(locale, SAMPLE_AMOUNT, Some("USD")),
            brl: i18n.format_currency(locale, SAMPLE_AMOUNT, Some("BRL")),
            eur: i18n.format_currency(locale, SAMPLE_AMOUNT, Some("EUR")),
        },
        numbers: vec![
            i18n.format_number(locale, SAMPLE_NUMBER, None),
            i18n.format_number(locale, 1000.0, None),
            i18n.format_number(locale, 0.5, Some(3)),
        ],
        dates: DateTimeSamplesDto {
            short: i18n.format_date(locale, &now, DateKind::Short),
            medium: i18n.format_date(locale, &now, DateKind::Medium),
            long: i18n.format_date(locale, &now, DateKind::Long),
            time_12: i18n.format_date(locale, &now, DateKind::Time12),
            time_24: i18n.format_date(locale, &now, DateKind::Time24),
            datetime: i18n.format_date(locale, &now, DateKind::DateTime),
        },
        relative_time: RelativeTimeSamplesDto {
            just_now: ctx.time_ago(&(now - Duration::seconds(30)), &now),
            minutes: ctx.time_ago(&(now - Duration::minutes(5)), &now),
            hours: ctx.time_ago(&(now - Duration::hours(3)), &now),
            days: ctx.time_ago(&(now - Duration::days(2)), &now),
            weeks: ctx.time_ago(&(now - Duration::weeks(3)), &now),
        },
        phone: PhoneSampleDto {
            raw: phone,
            formatted: i18n.format_phone(locale, phone),
            valid: i18n.is_valid_phone(locale, phone),
        },
    }
}

#[utoipa::path(
    get,
    path = "/api/i18n/info",
    tag = "i18n",
    responses(
        (status = 200, description = "Locale negotiated for this request and formatting samples", body = I18nInfoDto)
    )
)]
pub(crate) async fn info(State(state): State<AppState>, ctx: LocaleContext) -> ApiResponse<I18nInfoDto> {
    let i18n = &state.i18n;
    let locale = ctx.locale();
    let now = Utc::now();

    ApiResponse::ok(
        Message::new("i18n.info_retrieved"),
        I18nInfoDto {
            current_locale: locale.to_string(),
            default_locale: i18n.default_locale().to_string(),
            supported_locales: i18n.supported_locales(),
            formats: FormatSamplesDto {
                date: DateSamplesDto {
                    short: i18n.format_date(locale, &now, DateKind::Short),
                    medium: i18n.format_date(locale, &now, DateKind::Medium),
                    long: i18n.format_date(locale, &now, DateKind::Long),
                },
                currency: i18n.format_currency(locale, SAMPLE_AMOUNT, None),
                number: i18n.format_number(locale, SAMPLE_NUMBER, None),
            },
            translations: translation_samples(&ctx),
        },
    )
}

#[utoipa::path(
    get,
    path = "/api/i18n/demo",
    tag = "i18n",
    responses(
        (status = 200, description = "Translations and formatting in the request locale", body = I18nDemoDto)
    )
)]
pub(crate) async fn demo_page(State(state): State<AppState>, ctx: LocaleContext) -> ApiResponse<I18nDemoDto> {
    let data = demo(&state.i18n, ctx.locale(), &ctx, Utc::now());
    ApiResponse::ok(Message::new("i18n.demo_retrieved"), data)
}

#[utoipa::path(
    post,
    path = "/api/i18n/change-locale",
    tag = "i18n",
    request_body = ChangeLocaleDto,
    responses(
        (status = 200, description = "Locale stored in the session", body = ChangeLocaleResponseDto),
        (status = 400, description = "Unsupported locale")
    )
)]
pub(crate) async fn change_locale(
    State(state): State<AppState>,
    session: Session,
    AppJson(dto): AppJson<ChangeLocaleDto>,
) -> AppResult<ApiResponse<ChangeLocaleResponseDto>> {
    dto.validate()?;
    let locale = state.i18n.resolve(&dto.locale)?;

    session
        .insert(SESSION_LOCALE_KEY, locale.as_str())
        .await
        .map_err(|err| AppError::Internal(err.into()))?;

    Ok(ApiResponse::ok(
        Message::new("settings.language.changed_success"),
        ChangeLocaleResponseDto {
            locale: locale.to_string(),
        },
    )
    .in_locale(locale))
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::demo;
    use crate::i18n::tests::shipped_i18n;
    use crate::i18n::{Locale, LocaleContext};

    #[test]
    fn demo_formats_in_the_requested_locale() {
        let i18n = shipped_i18n();
        let locale = Locale::parse("pt_BR").expect("valid locale");
        let ctx = LocaleContext::new(i18n.clone(), locale.clone());
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 14, 30, 0).single().expect("valid date");

        let data = demo(&i18n, &locale, &ctx, now);

        assert_eq!(data.locale, "pt_BR");
        assert_eq!(data.currency.local, "R$ 1.234,56");
        assert_eq!(data.translations.save, "Salvar");
        assert_eq!(data.relative_time.hours, "há 3 horas");
        assert!(data.phone.valid);
    }
}
