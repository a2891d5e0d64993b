//! Layered configuration for plugin registry hosts.
//!
//! Values are merged from built-in defaults, a TOML file (`.plugreg.toml`
//! or the file named by `--config-path`), `PLUGREG_*` environment
//! variables, and command-line flags, with later layers winning.

use camino::{Utf8Path, Utf8PathBuf};
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

mod defaults;
mod logging;

pub use crate::defaults::{
    DEFAULT_LOG_FILTER, default_log_filter, default_log_filter_string, default_log_format,
};
pub use crate::logging::{LogFormat, LogFormatParseError};

/// Resolved host configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "PLUGREG")]
pub struct Config {
    /// Tracing filter expression, for example `info` or `plugin_registry=debug`.
    #[serde(default = "default_log_filter_string")]
    pub log_filter: String,
    /// Output format for log events.
    #[serde(default = "default_log_format")]
    pub log_format: LogFormat,
    /// Directory whose plugin libraries are loaded at start-up.
    #[serde(default)]
    pub plugin_dir: Option<Utf8PathBuf>,
}

impl Config {
    /// Tracing filter expression.
    #[must_use]
    pub const fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Output format for log events.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Directory scanned for plugin libraries, if configured.
    #[must_use]
    pub fn plugin_dir(&self) -> Option<&Utf8Path> {
        self.plugin_dir.as_deref()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            plugin_dir: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rstest::rstest;

    use super::*;

    #[test]
    fn default_applies_built_in_values() {
        let config = Config::default();
        assert_eq!(config.log_filter(), DEFAULT_LOG_FILTER);
        assert_eq!(config.log_format(), LogFormat::Json);
        assert!(config.plugin_dir().is_none());
    }

    #[rstest]
    #[case::json("json", LogFormat::Json)]
    #[case::compact("compact", LogFormat::Compact)]
    #[case::mixed_case("Compact", LogFormat::Compact)]
    fn parses_log_formats(#[case] text: &str, #[case] expected: LogFormat) {
        assert_eq!(LogFormat::from_str(text).ok(), Some(expected));
    }

    #[test]
    fn rejects_unknown_log_format() {
        assert!(LogFormat::from_str("pretty").is_err());
    }

    #[test]
    fn log_format_displays_in_snake_case() {
        assert_eq!(LogFormat::Compact.to_string(), "compact");
    }
}
