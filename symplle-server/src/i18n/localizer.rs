//! Regional formatting driven by a locale's [`FormatRules`]. Nothing in
//! here fails: bad input degrades to a plain rendering.

use std::str::FromStr;

use chrono::{DateTime, Datelike, Timelike, Utc};
use tracing::warn;

use super::formats::{FormatRules, PluralTemplate};
use super::translator::interpolate;

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;
const WEEK: i64 = 7 * DAY;
const MONTH: i64 = 30 * DAY;
const YEAR: i64 = 365 * DAY;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DateKind {
    Short,
    Medium,
    Long,
    Time12,
    Time24,
    DateTime,
}

impl FromStr for DateKind {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "short" => Ok(DateKind::Short),
            "medium" => Ok(DateKind::Medium),
            "long" => Ok(DateKind::Long),
            "time_12" => Ok(DateKind::Time12),
            "time_24" => Ok(DateKind::Time24),
            "datetime" => Ok(DateKind::DateTime),
            _ => Err(()),
        }
    }
}

pub(crate) fn format_currency(rules: &FormatRules, amount: f64, currency_code: Option<&str>) -> String {
    let currency = &rules.currency;
    let symbol = currency_code
        .and_then(|code| currency.symbols.get(&code.trim().to_ascii_uppercase()))
        .unwrap_or(&currency.symbol);
    let amount = format_decimal(
        amount,
        currency.decimals,
        &currency.decimal_separator,
        &currency.thousands_separator,
    );

    render(&currency.format, &[("symbol", symbol.as_str()), ("amount", amount.as_str())])
        .unwrap_or_else(|| format!("{symbol}{amount}"))
}

/// Integral values get no decimals unless `decimals` says otherwise.
pub(crate) fn format_number(rules: &FormatRules, value: f64, decimals: Option<usize>) -> String {
    let decimals = decimals.unwrap_or(if value.fract() == 0.0 { 0 } else { 2 });
    format_decimal(
        value,
        decimals,
        &rules.numbers.decimal_separator,
        &rules.numbers.thousands_separator,
    )
}

pub(crate) fn format_date(rules: &FormatRules, value: &DateTime<Utc>, kind: DateKind) -> String {
    let date = &rules.date;
    let template = match kind {
        DateKind::Short => &date.short,
        DateKind::Medium => &date.medium,
        DateKind::Long => &date.long,
        DateKind::Time12 => &date.time_12,
        DateKind::Time24 => &date.time_24,
        DateKind::DateTime => {
            return format!(
                "{} {} {}",
                format_date(rules, value, DateKind::Medium),
                date.datetime_connective,
                format_date(rules, value, DateKind::Time24),
            );
        }
    };

    let month_index = value.month0() as usize;
    let month_number = value.month().to_string();
    let month_name = date.months.get(month_index).unwrap_or(&month_number);
    let month_short = date.months_short.get(month_index).unwrap_or(&month_number);
    let (is_pm, hour12) = value.hour12();
    let ampm = if is_pm { &date.pm } else { &date.am };

    let day = value.day().to_string();
    let dd = format!("{:02}", value.day());
    let mm = format!("{:02}", value.month());
    let yyyy = format!("{:04}", value.year());
    let hh24 = format!("{:02}", value.hour());
    let hh12 = format!("{hour12:02}");
    let minutes = format!("{:02}", value.minute());

    let tokens = [
        ("day", day.as_str()),
        ("dd", dd.as_str()),
        ("mm", mm.as_str()),
        ("yyyy", yyyy.as_str()),
        ("month_name", month_name.as_str()),
        ("month_short", month_short.as_str()),
        ("HH", hh24.as_str()),
        ("hh", hh12.as_str()),
        ("MM", minutes.as_str()),
        ("ampm", ampm.as_str()),
    ];

    render(template, &tokens).unwrap_or_else(|| value.format("%Y-%m-%d %H:%M").to_string())
}

/// Buckets `now - value` into the coarsest fitting unit. Future timestamps
/// read as "now".
pub(crate) fn format_relative_time(
    rules: &FormatRules,
    value: &DateTime<Utc>,
    now: &DateTime<Utc>,
) -> String {
    let relative = &rules.relative_time;
    let seconds = (*now - *value).num_seconds();

    let (template, count): (&PluralTemplate, i64) = match seconds {
        s if s < MINUTE => return relative.now.clone(),
        s if s < HOUR => (&relative.minute, s / MINUTE),
        s if s < DAY => (&relative.hour, s / HOUR),
        s if s < WEEK => (&relative.day, s / DAY),
        s if s < MONTH => (&relative.week, s / WEEK),
        s if s < YEAR => (&relative.month, s / MONTH),
        s => (&relative.year, s / YEAR),
    };

    let count_text = count.to_string();
    let template = template.select(count);
    render(template, &[("n", count_text.as_str())]).unwrap_or_else(|| template.to_string())
}

/// Applies the first phone pattern matching the digit count. Unknown
/// lengths come back as bare digits.
pub(crate) fn format_phone(rules: &FormatRules, raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    let Some(pattern) = rules.phone.patterns.iter().find(|p| p.matches(&digits)) else {
        return digits;
    };

    let mut remaining = digits.chars();
    pattern
        .pattern
        .chars()
        .map(|c| if c == '#' { remaining.next().unwrap_or('#') } else { c })
        .collect()
}

pub(crate) fn is_valid_phone(rules: &FormatRules, raw: &str) -> bool {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    rules.phone.patterns.iter().any(|p| p.matches(&digits))
}

fn render(template: &str, args: &[(&str, &str)]) -> Option<String> {
    match interpolate(template, args) {
        Ok(rendered) => Some(rendered),
        Err(missing) => {
            warn!(template, placeholder = %missing, "format template references unknown placeholder");
            None
        }
    }
}

fn format_decimal(value: f64, decimals: usize, decimal_sep: &str, thousands_sep: &str) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let fixed = format!("{:.*}", decimals, value.abs());
    let (integer, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let negative = value < 0.0 && fixed.chars().any(|c| matches!(c, '1'..='9'));

    let mut out = String::with_capacity(fixed.len() + integer.len() / 3 + 1);
    if negative {
        out.push('-');
    }
    out.push_str(&group_thousands(integer, thousands_sep));
    if !fraction.is_empty() {
        out.push_str(decimal_sep);
        out.push_str(fraction);
    }
    out
}

fn group_thousands(integer: &str, separator: &str) -> String {
    let len = integer.len();
    let mut out = String::with_capacity(len + len / 3 * separator.len());
    for (idx, digit) in integer.chars().enumerate() {
        if idx > 0 && (len - idx) % 3 == 0 {
            out.push_str(separator);
        }
        out.push(digit);
    }
    out
}
