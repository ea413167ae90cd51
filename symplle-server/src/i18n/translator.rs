use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::Value;

static PLACEHOLDER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").ok());

/// Walks a dot-separated key through nested message objects. Only string
/// leaves count as hits.
pub(crate) fn lookup<'a>(messages: &'a Value, key: &str) -> Option<&'a str> {
    key.split('.')
        .try_fold(messages, |node, segment| node.get(segment))
        .and_then(Value::as_str)
}

/// Substitutes `{name}` placeholders. Returns the first placeholder with no
/// matching argument as the error.
pub(crate) fn interpolate(template: &str, args: &[(&str, &str)]) -> Result<String, String> {
    let Some(placeholder) = PLACEHOLDER.as_ref() else {
        return Ok(template.to_string());
    };
    if let Some(missing) = placeholder
        .captures_iter(template)
        .map(|caps| caps[1].to_string())
        .find(|name| !args.iter().any(|(key, _)| *key == name.as_str()))
    {
        return Err(missing);
    }

    Ok(placeholder
        .replace_all(template, |caps: &Captures<'_>| {
            args.iter()
                .find(|(key, _)| *key == &caps[1])
                .map(|(_, value)| value.to_string())
                .unwrap_or_default()
        })
        .into_owned())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{interpolate, lookup};

    #[test]
    fn lookup_walks_nested_objects() {
        let messages = json!({
            "auth": { "login": { "title": "Sign in" } },
            "count": 3
        });
        assert_eq!(lookup(&messages, "auth.login.title"), Some("Sign in"));
        assert_eq!(lookup(&messages, "auth.login"), None);
        assert_eq!(lookup(&messages, "auth.logout.title"), None);
        assert_eq!(lookup(&messages, "count"), None);
    }

    #[test]
    fn interpolate_replaces_every_occurrence() {
        let out = interpolate("{name} likes {what}, {name}!", &[("name", "Ana"), ("what", "Rust")])
            .expect("all placeholders bound");
        assert_eq!(out, "Ana likes Rust, Ana!");
    }

    #[test]
    fn interpolate_reports_missing_placeholder() {
        let err = interpolate("Hello {username}", &[("user", "ana")]).expect_err("missing");
        assert_eq!(err, "username");
    }

    #[test]
    fn interpolate_ignores_extra_args_and_non_placeholders() {
        let out = interpolate("{ not a placeholder } ok", &[("unused", "x")]).expect("no placeholders");
        assert_eq!(out, "{ not a placeholder } ok");
    }
}
