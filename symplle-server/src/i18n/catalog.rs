use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{info, warn};

use super::formats::FormatRules;
use super::locale::{Locale, default_region};

const MESSAGES_FILE: &str = "messages.json";
const FORMATS_FILE: &str = "formats.json";

/// Translation dictionary and formatting rules for one locale. Immutable
/// once built; reloads replace the whole bundle.
#[derive(Debug)]
pub(crate) struct LocaleBundle {
    pub(crate) locale: Locale,
    pub(crate) messages: Value,
    pub(crate) formats: FormatRules,
}

impl LocaleBundle {
    fn load(dir: &Path, locale: &Locale) -> Self {
        let locale_dir = dir.join(locale.as_str());
        let messages = read_json::<Value>(&locale_dir.join(MESSAGES_FILE))
            .filter(Value::is_object)
            .unwrap_or_else(|| Value::Object(Default::default()));
        let formats = read_json::<FormatRules>(&locale_dir.join(FORMATS_FILE)).unwrap_or_default();

        Self {
            locale: locale.clone(),
            messages,
            formats,
        }
    }

    fn empty(locale: &Locale) -> Self {
        Self {
            locale: locale.clone(),
            messages: Value::Object(Default::default()),
            formats: FormatRules::default(),
        }
    }
}

#[derive(Debug)]
struct CatalogState {
    supported: Vec<Locale>,
    bundles: HashMap<Locale, Arc<LocaleBundle>>,
}

/// The set of loaded locale bundles. Readers clone an `Arc` out of the map,
/// so a concurrent reload never exposes a half-built bundle.
#[derive(Debug)]
pub(crate) struct Catalog {
    dir: PathBuf,
    default_locale: Locale,
    state: RwLock<CatalogState>,
}

impl Catalog {
    /// The default locale is always part of the supported set.
    pub(crate) fn load(dir: impl Into<PathBuf>, default_locale: Locale, supported: &[Locale]) -> Self {
        let mut locales = vec![default_locale.clone()];
        for locale in supported {
            if !locales.contains(locale) {
                locales.push(locale.clone());
            }
        }

        let catalog = Self {
            dir: dir.into(),
            default_locale,
            state: RwLock::new(CatalogState {
                supported: locales,
                bundles: HashMap::new(),
            }),
        };
        catalog.reload();
        catalog
    }

    pub(crate) fn default_locale(&self) -> &Locale {
        &self.default_locale
    }

    pub(crate) fn supported(&self) -> Vec<Locale> {
        self.read_state().supported.clone()
    }

    pub(crate) fn is_supported(&self, locale: &Locale) -> bool {
        self.read_state().supported.contains(locale)
    }

    /// Rebuilds every bundle from disk and swaps each one in whole.
    pub(crate) fn reload(&self) {
        for locale in self.supported() {
            let bundle = Arc::new(LocaleBundle::load(&self.dir, &locale));
            self.write_state().bundles.insert(locale, bundle);
        }
        info!(dir = %self.dir.display(), locales = ?self.supported(), "locale bundles loaded");
    }

    /// Loads a bundle for a locale that was not configured at startup.
    pub(crate) fn add_locale(&self, locale: Locale) {
        let bundle = Arc::new(LocaleBundle::load(&self.dir, &locale));
        let mut state = self.write_state();
        if !state.supported.contains(&locale) {
            state.supported.push(locale.clone());
        }
        state.bundles.insert(locale.clone(), bundle);
        info!(%locale, "locale support added");
    }

    /// Bundle for `locale`, or the default bundle for unsupported locales.
    pub(crate) fn bundle(&self, locale: &Locale) -> Arc<LocaleBundle> {
        let state = self.read_state();
        state
            .bundles
            .get(locale)
            .or_else(|| state.bundles.get(&self.default_locale))
            .cloned()
            .unwrap_or_else(|| Arc::new(LocaleBundle::empty(&self.default_locale)))
    }

    pub(crate) fn default_bundle(&self) -> Arc<LocaleBundle> {
        self.bundle(&self.default_locale)
    }

    /// Maps a raw tag onto a supported locale: exact match first, then the
    /// ISO default region for the language, then any locale sharing it.
    pub(crate) fn match_supported(&self, raw: &str) -> Option<Locale> {
        let state = self.read_state();
        if let Some(requested) = Locale::parse(raw)
            && state.supported.contains(&requested)
        {
            return Some(requested);
        }

        let language = raw.trim().split(['-', '_']).next()?.to_ascii_lowercase();
        default_region(&language)
            .and_then(|region| Locale::parse(&format!("{language}_{region}")))
            .filter(|locale| state.supported.contains(locale))
            .or_else(|| {
                state
                    .supported
                    .iter()
                    .find(|locale| locale.language() == language)
                    .cloned()
            })
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, CatalogState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, CatalogState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "locale file unreadable, using defaults");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "locale file is not valid json, using defaults");
            None
        }
    }
}
