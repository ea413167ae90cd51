use std::collections::HashMap;

use serde::Deserialize;

/// Regional formatting rules, one `formats.json` per locale. Every section
/// falls back to the built-in `en_US` rules when missing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct FormatRules {
    pub(crate) meta: LocaleMeta,
    pub(crate) currency: CurrencyRules,
    pub(crate) numbers: NumberRules,
    pub(crate) date: DateRules,
    pub(crate) relative_time: RelativeTimeRules,
    pub(crate) phone: PhoneRules,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub(crate) struct LocaleMeta {
    pub(crate) name: String,
    pub(crate) native_name: String,
    pub(crate) flag: String,
    pub(crate) currency: String,
}

impl Default for LocaleMeta {
    fn default() -> Self {
        Self {
            name: "English (United States)".to_string(),
            native_name: "English (US)".to_string(),
            flag: "🇺🇸".to_string(),
            currency: "USD".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub(crate) struct CurrencyRules {
    pub(crate) symbol: String,
    pub(crate) decimal_separator: String,
    pub(crate) thousands_separator: String,
    /// Placement template with `{symbol}` and `{amount}`.
    pub(crate) format: String,
    pub(crate) decimals: usize,
    /// Symbol per ISO 4217 code as written in this locale.
    pub(crate) symbols: HashMap<String, String>,
}

impl Default for CurrencyRules {
    fn default() -> Self {
        Self {
            symbol: "$".to_string(),
            decimal_separator: ".".to_string(),
            thousands_separator: ",".to_string(),
            format: "{symbol}{amount}".to_string(),
            decimals: 2,
            symbols: HashMap::from([
                ("USD".to_string(), "$".to_string()),
                ("BRL".to_string(), "R$".to_string()),
                ("EUR".to_string(), "€".to_string()),
            ]),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub(crate) struct NumberRules {
    pub(crate) decimal_separator: String,
    pub(crate) thousands_separator: String,
}

impl Default for NumberRules {
    fn default() -> Self {
        Self {
            decimal_separator: ".".to_string(),
            thousands_separator: ",".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub(crate) struct DateRules {
    pub(crate) short: String,
    pub(crate) medium: String,
    pub(crate) long: String,
    pub(crate) time_12: String,
    pub(crate) time_24: String,
    pub(crate) datetime_connective: String,
    pub(crate) am: String,
    pub(crate) pm: String,
    pub(crate) months: Vec<String>,
    pub(crate) months_short: Vec<String>,
}

impl Default for DateRules {
    fn default() -> Self {
        let months = [
            "January", "February", "March", "April", "May", "June", "July", "August",
            "September", "October", "November", "December",
        ];
        Self {
            short: "{mm}/{dd}/{yyyy}".to_string(),
            medium: "{month_short} {day}, {yyyy}".to_string(),
            long: "{month_name} {day}, {yyyy}".to_string(),
            time_12: "{hh}:{MM} {ampm}".to_string(),
            time_24: "{HH}:{MM}".to_string(),
            datetime_connective: "at".to_string(),
            am: "AM".to_string(),
            pm: "PM".to_string(),
            months_short: months.iter().map(|m| m[..3].to_string()).collect(),
            months: months.iter().map(|m| m.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PluralTemplate {
    pub(crate) one: String,
    pub(crate) other: String,
}

impl PluralTemplate {
    fn new(one: &str, other: &str) -> Self {
        Self {
            one: one.to_string(),
            other: other.to_string(),
        }
    }

    pub(crate) fn select(&self, count: i64) -> &str {
        if count == 1 { &self.one } else { &self.other }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub(crate) struct RelativeTimeRules {
    pub(crate) now: String,
    pub(crate) minute: PluralTemplate,
    pub(crate) hour: PluralTemplate,
    pub(crate) day: PluralTemplate,
    pub(crate) week: PluralTemplate,
    pub(crate) month: PluralTemplate,
    pub(crate) year: PluralTemplate,
}

impl Default for RelativeTimeRules {
    fn default() -> Self {
        Self {
            now: "now".to_string(),
            minute: PluralTemplate::new("{n} minute ago", "{n} minutes ago"),
            hour: PluralTemplate::new("{n} hour ago", "{n} hours ago"),
            day: PluralTemplate::new("{n} day ago", "{n} days ago"),
            week: PluralTemplate::new("{n} week ago", "{n} weeks ago"),
            month: PluralTemplate::new("{n} month ago", "{n} months ago"),
            year: PluralTemplate::new("{n} year ago", "{n} years ago"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub(crate) struct PhoneRules {
    pub(crate) country_code: String,
    pub(crate) patterns: Vec<PhonePattern>,
}

/// `#` in `pattern` is replaced by the next digit.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PhonePattern {
    pub(crate) digits: usize,
    #[serde(default)]
    pub(crate) leading: Option<String>,
    pub(crate) pattern: String,
}

impl PhonePattern {
    pub(crate) fn matches(&self, digits: &str) -> bool {
        digits.len() == self.digits
            && self
                .leading
                .as_deref()
                .is_none_or(|prefix| digits.starts_with(prefix))
    }
}

impl Default for PhoneRules {
    fn default() -> Self {
        Self {
            country_code: "+1".to_string(),
            patterns: vec![
                PhonePattern {
                    digits: 10,
                    leading: None,
                    pattern: "(###) ###-####".to_string(),
                },
                PhonePattern {
                    digits: 11,
                    leading: Some("1".to_string()),
                    pattern: "+# (###) ###-####".to_string(),
                },
            ],
        }
    }
}
