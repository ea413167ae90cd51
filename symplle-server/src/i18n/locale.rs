use std::fmt;

use serde::Serialize;

/// Canonical `ll_RR` locale code, e.g. `pt_BR`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub(crate) struct Locale(String);

impl Locale {
    /// Parses any reasonable spelling (`pt-br`, `PT_br`, `pt`) into the
    /// canonical form. Bare languages use the region from the ISO table.
    pub(crate) fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let mut parts = raw.split(['-', '_']);
        let language = parts.next()?.to_ascii_lowercase();
        if !(2..=3).contains(&language.len()) || !language.chars().all(|c| c.is_ascii_alphabetic())
        {
            return None;
        }

        let region = match parts.next() {
            Some(region)
                if region.len() == 2 && region.chars().all(|c| c.is_ascii_alphabetic()) =>
            {
                region.to_ascii_uppercase()
            }
            Some(_) => return None,
            None => default_region(&language)?.to_string(),
        };

        Some(Self(format!("{language}_{region}")))
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }

    pub(crate) fn language(&self) -> &str {
        self.0.split('_').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Region assumed for a bare ISO 639-1 language code.
pub(crate) fn default_region(language: &str) -> Option<&'static str> {
    match language {
        "pt" => Some("BR"),
        "en" => Some("US"),
        "es" => Some("ES"),
        _ => None,
    }
}
