//! Driver configuration parsed from environment variables.
//!
//! Every setting can be overridden on the command line; see
//! [`CliConfig::apply_overrides`].

use std::env;
use std::str::FromStr;

use crate::error::CliError;

/// Environment variable holding the log level.
pub const LOG_LEVEL_VAR: &str = "TERMLINE_LOG_LEVEL";

/// Environment variable holding the style of text outside styled variables.
pub const DEFAULT_STYLE_VAR: &str = "TERMLINE_DEFAULT_STYLE";

/// Log level enumeration matching tracing crate levels.
///
/// Defaults to `Warn` when not specified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Every match attempt and delegation.
    Trace,
    /// Grammar compilation details.
    Debug,
    /// Informational messages.
    Info,
    /// Potential problems.
    #[default]
    Warn,
    /// Failures only.
    Error,
}

impl FromStr for LogLevel {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err(CliError::InvalidConfig(format!(
                "unknown log level '{s}', expected one of: trace, debug, info, warn, error"
            ))),
        }
    }
}

impl LogLevel {
    /// Convert to a tracing filter directive string.
    #[must_use]
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Configuration for the driver.
///
/// # Environment Variables
///
/// - `TERMLINE_LOG_LEVEL`: trace, debug, info, warn or error
/// - `TERMLINE_DEFAULT_STYLE`: style of text outside styled variables when
///   highlighting
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliConfig {
    /// Log level.
    pub log_level: LogLevel,
    /// Style of unstyled text in `highlight` output.
    pub default_style: String,
}

impl CliConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `CliError::InvalidConfig` if an environment variable contains
    /// an invalid value.
    pub fn from_env() -> Result<Self, CliError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from `lookup`, which maps variable names to values.
    ///
    /// # Errors
    ///
    /// Returns `CliError::InvalidConfig` for an unknown log level or a style
    /// containing control characters.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, CliError> {
        let log_level = match lookup(LOG_LEVEL_VAR) {
            Some(val) => val.parse()?,
            None => LogLevel::default(),
        };

        let default_style = match lookup(DEFAULT_STYLE_VAR) {
            Some(val) => parse_style(&val)?,
            None => String::new(),
        };

        Ok(Self {
            log_level,
            default_style,
        })
    }

    /// Apply optional overrides, e.g. from command-line flags.
    #[must_use]
    pub fn apply_overrides(
        mut self,
        log_level: Option<LogLevel>,
        default_style: Option<String>,
    ) -> Self {
        if let Some(level) = log_level {
            self.log_level = level;
        }

        if let Some(style) = default_style {
            self.default_style = style;
        }

        self
    }

    /// Create a new configuration with the specified log level.
    #[must_use]
    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }
}

/// Validate a style string.
///
/// # Errors
///
/// Returns `CliError::InvalidConfig` when `style` contains control characters.
pub fn parse_style(style: &str) -> Result<String, CliError> {
    if style.chars().any(char::is_control) {
        return Err(CliError::InvalidConfig(format!(
            "invalid style {style:?}, control characters are not allowed"
        )));
    }
    Ok(style.trim().to_owned())
}

#[cfg(test)]
#[expect(
    clippy::unwrap_used,
    reason = "tests require explicit panic messages for debugging failures"
)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[rstest]
    #[case("trace", LogLevel::Trace)]
    #[case("debug", LogLevel::Debug)]
    #[case("info", LogLevel::Info)]
    #[case("warn", LogLevel::Warn)]
    #[case("warning", LogLevel::Warn)]
    #[case("error", LogLevel::Error)]
    #[case("TRACE", LogLevel::Trace)]
    #[case("Debug", LogLevel::Debug)]
    fn log_level_parses_valid_values(#[case] input: &str, #[case] expected: LogLevel) {
        assert_eq!(input.parse::<LogLevel>().ok(), Some(expected));
    }

    #[test]
    fn log_level_rejects_invalid_values() {
        let result = "loud".parse::<LogLevel>();
        assert!(result.unwrap_err().to_string().contains("unknown log level"));
    }

    #[test]
    fn defaults_apply_without_environment() {
        let config = CliConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, CliConfig::default());
        assert_eq!(config.log_level, LogLevel::Warn);
    }

    #[test]
    fn reads_environment_values() {
        let config = CliConfig::from_lookup(lookup(&[
            (LOG_LEVEL_VAR, "debug"),
            (DEFAULT_STYLE_VAR, " class:plain "),
        ]))
        .unwrap();
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.default_style, "class:plain");
    }

    #[rstest]
    #[case(LOG_LEVEL_VAR, "verbose")]
    #[case(DEFAULT_STYLE_VAR, "class:a\nclass:b")]
    fn rejects_invalid_environment_values(#[case] key: &str, #[case] value: &str) {
        let err = CliConfig::from_lookup(lookup(&[(key, value)])).unwrap_err();
        assert!(matches!(err, CliError::InvalidConfig(_)));
    }

    #[test]
    fn apply_overrides_updates_selected_fields() {
        let config = CliConfig::default()
            .apply_overrides(Some(LogLevel::Error), Some("class:x".to_owned()));
        assert_eq!(config.log_level, LogLevel::Error);
        assert_eq!(config.default_style, "class:x");

        let config = CliConfig::default().apply_overrides(None, None);
        assert_eq!(config, CliConfig::default());
    }
}
