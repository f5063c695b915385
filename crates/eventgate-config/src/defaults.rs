//! Default values shared by the workspace.

/// Default log filter expression.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Prefix applied to every environment variable read by [`crate::Config`].
///
/// `EVENTGATE_LOG_FILTER` overrides the log filter and `EVENTGATE_CONFIG_PATH`
/// names the configuration file.
pub const ENV_PREFIX: &str = "EVENTGATE";

/// Default log filter expression.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format.
#[must_use]
pub const fn default_log_format() -> crate::logging::LogFormat {
    crate::logging::LogFormat::Json
}
