//! Structured logging for processes embedding the dispatcher.
//!
//! The catalog logs under `eventgate_catalog::catalog` and the dispatcher
//! under `eventgate_dispatch::dispatch`, so a filter such as
//! `eventgate_dispatch=debug,info` narrows output to dispatch decisions.
//! One subscriber is installed per process. Whoever initialises first
//! decides the filter and format, and later callers are told what was
//! installed.

use std::ffi::OsString;
use std::io::{self, IsTerminal};

use eventgate_config::{Config, ConfigError, LogFormat};
use once_cell::sync::OnceCell;
use thiserror::Error;
use tracing::{Subscriber, info, subscriber::SetGlobalDefaultError};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

static INSTALLED: OnceCell<TelemetryHandle> = OnceCell::new();

/// Settings of the subscriber that is installed for this process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryHandle {
    filter: String,
    format: LogFormat,
}

impl TelemetryHandle {
    /// Filter expression the installed subscriber applies.
    #[must_use]
    pub const fn filter(&self) -> &str {
        self.filter.as_str()
    }

    /// Output format of the installed subscriber.
    #[must_use]
    pub const fn format(&self) -> LogFormat {
        self.format
    }
}

/// Errors encountered while configuring telemetry.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The layered configuration could not be loaded.
    #[error("failed to load telemetry configuration: {0}")]
    Config(#[from] ConfigError),
    /// Failed to parse the configured log filter expression.
    #[error("invalid log filter: {0}")]
    Filter(String),
    /// A subscriber not installed through this module is already active.
    #[error("failed to install telemetry subscriber: {0}")]
    Subscriber(SetGlobalDefaultError),
}

/// Installs the global subscriber described by `config` on first use.
///
/// Later calls leave the subscriber alone and return the handle of the one
/// already installed, even when `config` asks for something else.
///
/// # Examples
///
/// ```rust
/// use eventgate_config::{Config, LogFormat};
/// use eventgate_dispatch::telemetry;
///
/// # fn main() -> Result<(), telemetry::TelemetryError> {
/// let first = telemetry::initialise(&Config::default())?;
/// let compact = Config {
///     log_format: LogFormat::Compact,
///     ..Config::default()
/// };
/// let second = telemetry::initialise(&compact)?;
///
/// // The first configuration stays in force.
/// assert_eq!(second.format(), LogFormat::Json);
/// assert_eq!(first, second);
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns [`TelemetryError::Filter`] for an unparsable filter and
/// [`TelemetryError::Subscriber`] when a foreign subscriber is already set.
pub fn initialise(config: &Config) -> Result<TelemetryHandle, TelemetryError> {
    INSTALLED
        .get_or_try_init(|| install_subscriber(config))
        .cloned()
}

/// Loads the process configuration and installs telemetry from it.
///
/// # Errors
///
/// Returns [`TelemetryError::Config`] when configuration fails to load,
/// otherwise the errors of [`initialise`].
pub fn initialise_from_environment() -> Result<TelemetryHandle, TelemetryError> {
    initialise(&Config::resolve()?)
}

/// Loads configuration from explicit command-line arguments and installs
/// telemetry from it.
///
/// # Errors
///
/// Same as [`initialise_from_environment`].
pub fn initialise_from_args<I, T>(args: I) -> Result<TelemetryHandle, TelemetryError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    initialise(&Config::resolve_from_iter(args)?)
}

fn install_subscriber(config: &Config) -> Result<TelemetryHandle, TelemetryError> {
    let filter = EnvFilter::try_new(config.log_filter())
        .map_err(|error| TelemetryError::Filter(error.to_string()))?;

    let builder = |filter: EnvFilter| {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .with_level(true)
            .with_writer(io::stderr)
            // Colour only when a person is reading.
            .with_ansi(io::stderr().is_terminal())
            .with_timer(fmt::time::UtcTime::rfc_3339())
    };

    let subscriber: Box<dyn Subscriber + Send + Sync> = match config.log_format() {
        LogFormat::Json => Box::new(builder(filter).json().flatten_event(true).finish()),
        LogFormat::Compact => Box::new(builder(filter).compact().finish()),
    };
    tracing::subscriber::set_global_default(subscriber).map_err(TelemetryError::Subscriber)?;

    let handle = TelemetryHandle {
        filter: config.log_filter().to_owned(),
        format: config.log_format(),
    };
    info!(
        target: concat!(env!("CARGO_PKG_NAME"), "::telemetry"),
        filter = handle.filter(),
        format = %handle.format(),
        "telemetry installed"
    );
    Ok(handle)
}
