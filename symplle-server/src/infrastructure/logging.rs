use anyhow::{Result, anyhow};
use tracing_subscriber::{EnvFilter, fmt};

/// Installs the global subscriber. `RUST_LOG` wins over the configured
/// level; sqlx statement logging is capped at `warn` unless asked for.
pub fn init_logging(default_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(with_quiet_sqlx(default_level)))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .compact()
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(())
}

fn with_quiet_sqlx(level: &str) -> String {
    if level.contains("sqlx") {
        level.to_string()
    } else {
        format!("{level},sqlx=warn")
    }
}

#[cfg(test)]
mod tests {
    use super::with_quiet_sqlx;

    #[test]
    fn sqlx_directive_is_added_once() {
        assert_eq!(with_quiet_sqlx("debug"), "debug,sqlx=warn");
        assert_eq!(with_quiet_sqlx("info,sqlx=debug"), "info,sqlx=debug");
    }
}
