//! Diagnostics setup.
//!
//! Structured logging with `tracing`. Output always goes to stderr so that
//! stdout stays clean for results. Filter precedence: `RUST_LOG`, then the
//! CLI `--log-level`, then the config file, then `warn`.

use anyhow::{Result, anyhow};
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::infra::config::LoggingConfig;

/// Resolve the effective filter directive.
fn build_env_filter(
    cli_level: Option<&str>,
    config: &LoggingConfig,
) -> Result<EnvFilter>
{
    if let Ok(filter) = EnvFilter::try_from_default_env()
    {
        return Ok(filter);
    }

    let directive = cli_level.unwrap_or(config.level.as_str());

    EnvFilter::try_new(directive).map_err(|e| anyhow!("invalid log level '{directive}': {e}"))
}

/// Install the global subscriber. If one is already installed it is kept
/// and this call only reports that at debug level.
pub fn init(
    cli_level: Option<&str>,
    config: &LoggingConfig,
    color: bool,
) -> Result<()>
{
    let filter = build_env_filter(cli_level, config)?;
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match config
        .format
        .as_str()
    {
        "json" => registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        "text" => registry
            .with(
                fmt::layer()
                    .with_ansi(color)
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        other => return Err(anyhow!("unknown log format '{other}' (expected text or json)")),
    };

    // A subscriber set by an embedding host (or an earlier call) wins.
    if let Err(err) = installed
    {
        debug!(error = %err, "global subscriber already set; keeping it");
    }

    Ok(())
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_cli_level_beats_config()
    {
        let config = LoggingConfig { level: "error".to_string(), format: "text".to_string() };
        // RUST_LOG may be set by the harness; only assert acceptance.
        assert!(build_env_filter(Some("debug"), &config).is_ok());
    }

    #[test]
    fn test_second_init_keeps_first_subscriber()
    {
        let config = LoggingConfig::default();
        assert!(init(None, &config, false).is_ok());
        assert!(init(Some("debug"), &config, false).is_ok());
    }

    #[test]
    fn test_unknown_format_is_rejected()
    {
        let config = LoggingConfig { level: "warn".to_string(), format: "xml".to_string() };
        assert!(init(None, &config, false).is_err());
    }
}
