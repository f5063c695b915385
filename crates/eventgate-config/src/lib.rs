//! Shared configuration for the eventgate workspace.
//!
//! A [`Config`] carries the logging setup consumed by the telemetry layer and
//! the exclusion patterns the type registry applies while discovering plugin
//! modules. Values are layered by `ortho_config`: built-in defaults, then a
//! TOML file named by `--config-path` or `EVENTGATE_CONFIG_PATH`, then
//! `EVENTGATE_*` environment variables, then command-line flags.
//!
//! [`Config::resolve`] loads the layers and rejects blank values so a
//! misconfigured process fails at startup instead of on first dispatch.

mod defaults;
mod error;
mod logging;

use std::ffi::OsString;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use self::defaults::{
    DEFAULT_LOG_FILTER, ENV_PREFIX, default_log_filter, default_log_filter_string,
    default_log_format,
};
pub use self::error::ConfigError;
pub use self::logging::{LogFormat, LogFormatParseError};

/// Runtime configuration for the registry and dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "EVENTGATE")]
pub struct Config {
    /// Filter expression handed to the tracing subscriber.
    #[serde(default = "default_log_filter_string")]
    pub log_filter: String,
    /// Output format for log lines.
    #[serde(default = "default_log_format")]
    pub log_format: LogFormat,
    /// File name patterns for modules that must never be scanned.
    ///
    /// Patterns match case-insensitively against the module file name. A
    /// trailing `*` matches any suffix.
    #[serde(default)]
    pub excluded_files: Vec<String>,
    /// Module name prefixes that must never be scanned.
    #[serde(default)]
    pub excluded_modules: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            excluded_files: Vec::new(),
            excluded_modules: Vec::new(),
        }
    }
}

impl Config {
    /// Loads the configuration for the current process and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Load`] when a layer cannot be read or merged and
    /// [`ConfigError::InvalidValue`] when the merged values are unusable.
    pub fn resolve() -> Result<Self, ConfigError> {
        let config = Self::load()?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the configuration from explicit command-line arguments.
    ///
    /// The first argument is the program name, as with [`std::env::args_os`].
    ///
    /// # Errors
    ///
    /// Same as [`Config::resolve`].
    pub fn resolve_from_iter<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let config = Self::load_from_iter(args)?;
        config.validate()?;
        Ok(config)
    }

    /// Returns the configured log filter.
    #[must_use]
    pub const fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Returns the configured log format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Returns the excluded file name patterns.
    #[must_use]
    pub fn excluded_files(&self) -> &[String] {
        &self.excluded_files
    }

    /// Returns the excluded module name prefixes.
    #[must_use]
    pub fn excluded_modules(&self) -> &[String] {
        &self.excluded_modules
    }

    /// Rejects a blank log filter and blank exclusion patterns.
    ///
    /// A blank module prefix would exclude every module.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the offending setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.log_filter.trim().is_empty() {
            return Err(ConfigError::invalid_value("log_filter", self.log_filter.clone()));
        }
        if let Some(blank) = self.excluded_files.iter().find(|pattern| pattern.trim().is_empty()) {
            return Err(ConfigError::invalid_value("excluded_files", blank.clone()));
        }
        if let Some(blank) = self
            .excluded_modules
            .iter()
            .find(|prefix| prefix.trim().is_empty())
        {
            return Err(ConfigError::invalid_value("excluded_modules", blank.clone()));
        }
        Ok(())
    }
}
