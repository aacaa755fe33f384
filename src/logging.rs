use anyhow::anyhow;
use tracing_subscriber::filter::LevelFilter;

use crate::config::{Config, LogFormat};

const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::INFO;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LogSettings {
    level: LevelFilter,
    format: LogFormat,
}

/// Installs the global subscriber. Events go to stderr so the CLI's stdout
/// stays machine-readable.
pub fn init(config: &Config, cli_level_override: Option<&str>) -> anyhow::Result<()> {
    let settings = resolve_settings(config, cli_level_override)?;

    let builder = tracing_subscriber::fmt()
        .with_max_level(settings.level)
        .with_target(true)
        .with_writer(std::io::stderr);
    match settings.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
    }
    .map_err(|err| anyhow!("initialize logging subscriber: {err}"))?;

    Ok(())
}

fn resolve_settings(
    config: &Config,
    cli_level_override: Option<&str>,
) -> anyhow::Result<LogSettings> {
    let logging = config.logging.as_ref();

    let level = match cli_level_override.or_else(|| logging.and_then(|l| l.level.as_deref())) {
        Some(raw_level) => raw_level
            .trim()
            .to_ascii_lowercase()
            .parse::<LevelFilter>()
            .map_err(|_| {
                anyhow!(
                    "invalid log level `{raw_level}`; expected one of trace, debug, info, warn, error, off"
                )
            })?,
        None => DEFAULT_LOG_LEVEL,
    };

    let format = logging.and_then(|l| l.format).unwrap_or(LogFormat::Json);

    Ok(LogSettings { level, format })
}
