use std::{
    env, fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::Context as _;
use serde::Deserialize;

pub const PROJECT_CONFIG_FILENAME: &str = "replaylocate.toml";
pub const HOME_CONFIG_DIR: &str = ".replaylocate";
pub const HOME_CONFIG_FILENAME: &str = "config.toml";

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timeline: Option<TimelineConfig>,
    #[serde(default)]
    pub logging: Option<LoggingConfig>,
}

impl Config {
    /// Loads config from `override_path` when given, otherwise discovers it:
    /// `./replaylocate.toml`, then `$HOME/.replaylocate/config.toml`, then
    /// built-in defaults.
    pub fn load(override_path: Option<&Path>) -> anyhow::Result<Self> {
        if let Some(path) = override_path {
            return Self::from_path(path);
        }

        let project_config = Path::new(PROJECT_CONFIG_FILENAME);
        if project_config.is_file() {
            return Self::from_path(project_config);
        }

        if let Some(home) = env::var_os("HOME") {
            let home_config = Path::new(&home)
                .join(HOME_CONFIG_DIR)
                .join(HOME_CONFIG_FILENAME);
            if home_config.is_file() {
                return Self::from_path(&home_config);
            }
        }

        Ok(Self::default())
    }

    pub fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let toml =
            fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
        Self::from_toml_str(&toml)
    }

    pub fn from_toml_str(toml: &str) -> anyhow::Result<Self> {
        toml.parse()
    }

    pub fn index_path(&self) -> Option<&Path> {
        self.timeline
            .as_ref()
            .and_then(|timeline| timeline.index.as_deref())
    }
}

impl FromStr for Config {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        toml::from_str(s).context("parse config TOML")
    }
}

#[derive(Debug, Deserialize)]
pub struct TimelineConfig {
    pub index: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub format: Option<LogFormat>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::{Config, LogFormat};

    #[test]
    fn empty_config_parses_to_defaults() {
        let config = Config::from_toml_str("").expect("empty config should parse");
        assert!(config.timeline.is_none());
        assert!(config.logging.is_none());
        assert!(config.index_path().is_none());
    }

    #[test]
    fn full_config_parses() {
        let config = Config::from_toml_str(
            r#"
[timeline]
index = "captures.json"

[logging]
level = "debug"
format = "pretty"
"#,
        )
        .expect("config should parse");

        assert_eq!(config.index_path(), Some(Path::new("captures.json")));
        let logging = config.logging.as_ref().expect("logging section");
        assert_eq!(logging.level.as_deref(), Some("debug"));
        assert_eq!(logging.format, Some(LogFormat::Pretty));
    }

    #[test]
    fn timeline_section_without_index_is_allowed() {
        let config = Config::from_toml_str("[timeline]\n").expect("config should parse");
        assert!(config.timeline.is_some());
        assert!(config.index_path().is_none());
    }

    #[test]
    fn invalid_toml_is_rejected_with_context() {
        let err = Config::from_toml_str("[timeline\n").unwrap_err();
        assert!(
            err.to_string().contains("parse config TOML"),
            "error: {err}"
        );
    }

    #[test]
    fn unknown_log_format_is_rejected() {
        let err = Config::from_toml_str(
            r#"
[logging]
format = "xml"
"#,
        )
        .unwrap_err();
        assert!(
            err.to_string().contains("parse config TOML"),
            "error: {err}"
        );
    }
}
