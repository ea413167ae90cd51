use super::catalog::Catalog;
use super::locale::Locale;

/// Raw per-request inputs for locale resolution, highest priority first.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct LocaleSignals<'a> {
    pub(crate) user_preference: Option<&'a str>,
    pub(crate) session: Option<&'a str>,
    pub(crate) query: Option<&'a str>,
    pub(crate) header_override: Option<&'a str>,
    pub(crate) accept_language: Option<&'a str>,
}

pub(crate) fn negotiate(catalog: &Catalog, signals: &LocaleSignals<'_>) -> Locale {
    [
        signals.user_preference,
        signals.session,
        signals.query,
        signals.header_override,
    ]
    .into_iter()
    .flatten()
    .find_map(|raw| catalog.match_supported(raw))
    .or_else(|| {
        signals
            .accept_language
            .and_then(|header| best_accept_language(catalog, header))
    })
    .unwrap_or_else(|| catalog.default_locale().clone())
}

/// First range in header order that maps onto a supported locale. Quality
/// values are not used for ordering.
fn best_accept_language(catalog: &Catalog, header: &str) -> Option<Locale> {
    header
        .split(',')
        .filter_map(|range| range.split(';').next())
        .map(str::trim)
        .filter(|range| !range.is_empty() && *range != "*")
        .find_map(|range| catalog.match_supported(range))
}

#[cfg(test)]
mod tests {
    use super::{LocaleSignals, negotiate};
    use crate::i18n::catalog::Catalog;
    use crate::i18n::locale::Locale;

    fn catalog() -> (tempfile::TempDir, Catalog) {
        let dir = tempfile::tempdir().expect("tempdir");
        let catalog = Catalog::load(
            dir.path(),
            Locale::parse("en_US").expect("valid"),
            &[
                Locale::parse("pt_BR").expect("valid"),
                Locale::parse("es_ES").expect("valid"),
            ],
        );
        (dir, catalog)
    }

    #[test]
    fn falls_back_to_default_without_signals() {
        let (_dir, catalog) = catalog();
        let locale = negotiate(&catalog, &LocaleSignals::default());
        assert_eq!(locale.as_str(), "en_US");
    }

    #[test]
    fn user_preference_beats_everything() {
        let (_dir, catalog) = catalog();
        let signals = LocaleSignals {
            user_preference: Some("es_ES"),
            session: Some("pt_BR"),
            query: Some("en"),
            header_override: Some("pt"),
            accept_language: Some("pt-BR"),
        };
        assert_eq!(negotiate(&catalog, &signals).as_str(), "es_ES");
    }

    #[test]
    fn unsupported_higher_signals_are_skipped() {
        let (_dir, catalog) = catalog();
        let signals = LocaleSignals {
            user_preference: Some("fr_FR"),
            session: None,
            query: Some("klingon"),
            header_override: Some("PT-br"),
            accept_language: Some("es"),
        };
        assert_eq!(negotiate(&catalog, &signals).as_str(), "pt_BR");
    }

    #[test]
    fn session_beats_overrides() {
        let (_dir, catalog) = catalog();
        let signals = LocaleSignals {
            session: Some("pt_BR"),
            query: Some("es"),
            ..LocaleSignals::default()
        };
        assert_eq!(negotiate(&catalog, &signals).as_str(), "pt_BR");
    }

    #[test]
    fn accept_language_is_scanned_in_header_order() {
        let (_dir, catalog) = catalog();
        let signals = LocaleSignals {
            accept_language: Some("fr-FR;q=1.0, *;q=0.9, es-MX;q=0.5, pt-BR;q=0.8"),
            ..LocaleSignals::default()
        };
        assert_eq!(negotiate(&catalog, &signals).as_str(), "es_ES");
    }
}
