//! Translation lookup, locale negotiation and regional formatting.
//!
//! Every operation here degrades to a safe literal instead of failing, so
//! callers never have to handle localization errors on the request path.

mod catalog;
mod formats;
mod locale;
mod localizer;
mod negotiation;
mod translator;

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use crate::domain::error::DomainError;

use catalog::Catalog;
pub(crate) use locale::Locale;
pub(crate) use localizer::DateKind;
pub(crate) use negotiation::LocaleSignals;

/// Public description of one supported locale.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub(crate) struct LocaleInfo {
    pub(crate) code: String,
    pub(crate) name: String,
    pub(crate) native_name: String,
    pub(crate) flag: String,
    pub(crate) currency: String,
}

#[derive(Debug)]
pub(crate) struct I18n {
    catalog: Catalog,
}

impl I18n {
    pub(crate) fn load(dir: impl Into<PathBuf>, default_locale: Locale, supported: &[Locale]) -> Self {
        Self {
            catalog: Catalog::load(dir, default_locale, supported),
        }
    }

    pub(crate) fn default_locale(&self) -> &Locale {
        self.catalog.default_locale()
    }

    pub(crate) fn reload(&self) {
        self.catalog.reload();
    }

    /// Normalizes `raw` and loads its bundle if it is not supported yet.
    pub(crate) fn add_locale_support(&self, raw: &str) -> Result<Locale, DomainError> {
        let locale = Locale::parse(raw).ok_or_else(|| self.unsupported(raw))?;
        if !self.catalog.is_supported(&locale) {
            self.catalog.add_locale(locale.clone());
        }
        Ok(locale)
    }

    /// Maps `pt-br`, `PT_br`, `pt` and similar spellings onto a supported
    /// locale.
    pub(crate) fn normalize_locale(&self, raw: &str) -> Option<Locale> {
        self.catalog.match_supported(raw)
    }

    pub(crate) fn resolve(&self, raw: &str) -> Result<Locale, DomainError> {
        self.normalize_locale(raw).ok_or_else(|| self.unsupported(raw))
    }

    pub(crate) fn negotiate(&self, signals: &LocaleSignals<'_>) -> Locale {
        negotiation::negotiate(&self.catalog, signals)
    }

    pub(crate) fn supported_locales(&self) -> Vec<LocaleInfo> {
        self.catalog
            .supported()
            .into_iter()
            .map(|locale| {
                let bundle = self.catalog.bundle(&locale);
                let meta = &bundle.formats.meta;
                LocaleInfo {
                    code: locale.to_string(),
                    name: meta.name.clone(),
                    native_name: meta.native_name.clone(),
                    flag: meta.flag.clone(),
                    currency: meta.currency.clone(),
                }
            })
            .collect()
    }

    /// Looks `key` up in `locale`, then in the default locale, then gives
    /// back the key itself.
    pub(crate) fn translate(&self, locale: &Locale, key: &str, args: &[(&str, &str)]) -> String {
        let bundle = self.catalog.bundle(locale);
        let fallback;
        let template = match translator::lookup(&bundle.messages, key) {
            Some(template) => template,
            None if bundle.locale != *self.default_locale() => {
                fallback = self.catalog.default_bundle();
                match translator::lookup(&fallback.messages, key) {
                    Some(template) => template,
                    None => return key.to_string(),
                }
            }
            None => return key.to_string(),
        };

        if args.is_empty() {
            return template.to_string();
        }
        translator::interpolate(template, args).unwrap_or_else(|missing| {
            warn!(%locale, key, placeholder = %missing, "translation placeholder has no value");
            template.to_string()
        })
    }

    pub(crate) fn default_currency(&self, locale: &Locale) -> String {
        self.catalog.bundle(locale).formats.meta.currency.clone()
    }

    /// Without a currency code the locale's own currency is used.
    pub(crate) fn format_currency(&self, locale: &Locale, amount: f64, currency: Option<&str>) -> String {
        let code = currency.map_or_else(|| self.default_currency(locale), str::to_string);
        localizer::format_currency(&self.catalog.bundle(locale).formats, amount, Some(&code))
    }

    pub(crate) fn format_number(&self, locale: &Locale, value: f64, decimals: Option<usize>) -> String {
        localizer::format_number(&self.catalog.bundle(locale).formats, value, decimals)
    }

    pub(crate) fn format_date(&self, locale: &Locale, value: &DateTime<Utc>, kind: DateKind) -> String {
        localizer::format_date(&self.catalog.bundle(locale).formats, value, kind)
    }

    pub(crate) fn format_relative_time(
        &self,
        locale: &Locale,
        value: &DateTime<Utc>,
        now: &DateTime<Utc>,
    ) -> String {
        localizer::format_relative_time(&self.catalog.bundle(locale).formats, value, now)
    }

    pub(crate) fn format_phone(&self, locale: &Locale, raw: &str) -> String {
        localizer::format_phone(&self.catalog.bundle(locale).formats, raw)
    }

    pub(crate) fn is_valid_phone(&self, locale: &Locale, raw: &str) -> bool {
        localizer::is_valid_phone(&self.catalog.bundle(locale).formats, raw)
    }

    fn unsupported(&self, raw: &str) -> DomainError {
        DomainError::UnsupportedLocale {
            requested: raw.to_string(),
            supported: self.catalog.supported().iter().map(Locale::to_string).collect(),
        }
    }
}

/// The locale resolved for one request, passed explicitly to whatever needs
/// to render text for it.
#[derive(Debug, Clone)]
pub(crate) struct LocaleContext {
    i18n: Arc<I18n>,
    locale: Locale,
}

impl LocaleContext {
    pub(crate) fn new(i18n: Arc<I18n>, locale: Locale) -> Self {
        Self { i18n, locale }
    }

    pub(crate) fn locale(&self) -> &Locale {
        &self.locale
    }

    pub(crate) fn with_locale(&self, locale: Locale) -> Self {
        Self {
            i18n: self.i18n.clone(),
            locale,
        }
    }

    pub(crate) fn t(&self, key: &str) -> String {
        self.i18n.translate(&self.locale, key, &[])
    }

    pub(crate) fn t_with(&self, key: &str, args: &[(&str, &str)]) -> String {
        self.i18n.translate(&self.locale, key, args)
    }

    pub(crate) fn time_ago(&self, value: &DateTime<Utc>, now: &DateTime<Utc>) -> String {
        self.i18n.format_relative_time(&self.locale, value, now)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;

    use chrono::{Duration, TimeZone, Utc};

    use super::{DateKind, I18n, Locale, LocaleContext, LocaleSignals};
    use crate::domain::error::DomainError;

    /// Catalog over the bundles shipped with the crate.
    pub(crate) fn shipped_i18n() -> Arc<I18n> {
        let dir = PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/locales"));
        let supported = ["pt_BR", "en_US", "es_ES"].map(locale);
        Arc::new(I18n::load(dir, locale("en_US"), &supported))
    }

    fn locale(raw: &str) -> Locale {
        Locale::parse(raw).expect("valid locale")
    }

    #[test]
    fn shipped_keys_translate_in_every_locale() {
        let i18n = shipped_i18n();
        for code in ["pt_BR", "en_US", "es_ES"] {
            let translated = i18n.translate(&locale(code), "timeline.success", &[]);
            assert_ne!(translated, "timeline.success", "{code} misses timeline.success");
        }
        assert_eq!(
            i18n.translate(&locale("pt_BR"), "common.save", &[]),
            "Salvar"
        );
        assert_eq!(
            i18n.translate(&locale("es_ES"), "auth.login.success", &[("username", "ana")]),
            "¡Bienvenido de nuevo, ana!"
        );
    }

    #[test]
    fn missing_keys_fall_back_to_default_then_key() {
        let dir = tempfile::tempdir().expect("tempdir");
        for (code, body) in [
            ("en_US", r#"{"only": {"english": "English only"}}"#),
            ("pt_BR", r#"{"both": "Ambos"}"#),
        ] {
            std::fs::create_dir_all(dir.path().join(code)).expect("dir");
            std::fs::write(dir.path().join(code).join("messages.json"), body).expect("write");
        }
        let i18n = I18n::load(dir.path(), locale("en_US"), &[locale("pt_BR")]);

        assert_eq!(i18n.translate(&locale("pt_BR"), "both", &[]), "Ambos");
        assert_eq!(i18n.translate(&locale("pt_BR"), "only.english", &[]), "English only");
        assert_eq!(i18n.translate(&locale("pt_BR"), "no.such.key", &[]), "no.such.key");
        assert_eq!(i18n.translate(&locale("en_US"), "both", &[]), "both");
    }

    #[test]
    fn missing_placeholder_returns_raw_template() {
        let i18n = shipped_i18n();
        let out = i18n.translate(&locale("en_US"), "auth.login.success", &[("name", "ana")]);
        assert_eq!(out, "Welcome back, {username}!");
    }

    #[test]
    fn currency_samples_match_locale_conventions() {
        let i18n = shipped_i18n();
        assert_eq!(i18n.format_currency(&locale("en_US"), 1234.56, None), "$1,234.56");
        assert_eq!(i18n.format_currency(&locale("pt_BR"), 1234.56, None), "R$ 1.234,56");
        assert_eq!(i18n.format_currency(&locale("es_ES"), 1234.56, None), "1.234,56 €");
        assert_eq!(i18n.format_currency(&locale("pt_BR"), 10.0, Some("USD")), "US$ 10,00");
        assert_eq!(i18n.default_currency(&locale("es_ES")), "EUR");
    }

    #[test]
    fn shipped_dates_and_phones_are_localized() {
        let i18n = shipped_i18n();
        let value = Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).single().expect("valid");
        assert_eq!(
            i18n.format_date(&locale("es_ES"), &value, DateKind::Long),
            "15 de enero de 2024"
        );
        assert_eq!(
            i18n.format_date(&locale("pt_BR"), &value, DateKind::DateTime),
            "15 de jan de 2024 às 09:30"
        );
        assert_eq!(
            i18n.format_date(&locale("es_ES"), &value, DateKind::DateTime),
            "15 de ene de 2024 a las 09:30"
        );
        assert_eq!(i18n.format_phone(&locale("es_ES"), "612345678"), "612 345 678");
        assert_eq!(i18n.format_phone(&locale("pt_BR"), "11987654321"), "(11) 9 8765-4321");
        assert!(i18n.is_valid_phone(&locale("en_US"), "(555) 123-4567"));
    }

    #[test]
    fn relative_time_is_localized() {
        let i18n = shipped_i18n();
        let now = Utc::now();
        let ctx = LocaleContext::new(Arc::clone(&i18n), locale("pt_BR"));
        assert_eq!(ctx.time_ago(&(now - Duration::hours(2)), &now), "há 2 horas");
        assert_eq!(ctx.time_ago(&(now - Duration::days(1)), &now), "há 1 dia");
        let es = LocaleContext::new(i18n, locale("es_ES"));
        assert_eq!(es.time_ago(&(now - Duration::minutes(1)), &now), "hace 1 minuto");
    }

    #[test]
    fn resolve_rejects_unsupported_and_names_supported_set() {
        let i18n = shipped_i18n();
        assert_eq!(i18n.resolve("pt-br").expect("supported").as_str(), "pt_BR");
        assert_eq!(i18n.normalize_locale("PT_br").map(|l| l.to_string()).as_deref(), Some("pt_BR"));
        assert_eq!(i18n.normalize_locale("es").map(|l| l.to_string()).as_deref(), Some("es_ES"));
        match i18n.resolve("fr_FR") {
            Err(DomainError::UnsupportedLocale { requested, supported }) => {
                assert_eq!(requested, "fr_FR");
                assert_eq!(supported, vec!["en_US", "pt_BR", "es_ES"]);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn supported_locales_expose_metadata() {
        let i18n = shipped_i18n();
        let infos = i18n.supported_locales();
        let pt = infos.iter().find(|info| info.code == "pt_BR").expect("pt_BR listed");
        assert_eq!(pt.native_name, "Português (Brasil)");
        assert_eq!(pt.currency, "BRL");
    }

    #[test]
    fn add_locale_support_loads_new_bundle() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir_all(dir.path().join("fr_FR")).expect("dir");
        std::fs::write(
            dir.path().join("fr_FR").join("messages.json"),
            r#"{"common": {"ok": "D'accord"}}"#,
        )
        .expect("write");
        let i18n = I18n::load(dir.path(), locale("en_US"), &[]);
        assert!(i18n.resolve("fr_FR").is_err());

        let added = i18n.add_locale_support("fr-fr").expect("valid tag");
        assert_eq!(added.as_str(), "fr_FR");
        assert_eq!(i18n.translate(&added, "common.ok", &[]), "D'accord");
        assert!(i18n.add_locale_support("not a locale").is_err());

        let negotiated = i18n.negotiate(&LocaleSignals {
            accept_language: Some("fr"),
            ..LocaleSignals::default()
        });
        assert_eq!(negotiated.as_str(), "fr_FR");
    }
}
