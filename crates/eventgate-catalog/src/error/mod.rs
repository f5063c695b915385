//! Domain errors raised while building the type catalog.
//!
//! Module load failures are recoverable: discovery skips the module and logs
//! a diagnostic. Type load failures are not: they abort the whole scan and
//! surface as [`CatalogError::ScanFailure`].

use thiserror::Error;

use crate::manifest::ModuleIdentity;

/// Maximum number of underlying type load failures quoted in a scan error.
pub const MAX_REPORTED_FAILURES: usize = 5;

/// Errors arising from catalog construction and lookup.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A module's declared types could not be enumerated.
    #[error(
        "error scanning module {module}: can't load types:\n{}",
        failures.join("\n")
    )]
    ScanFailure {
        /// Module whose types failed to load.
        module: ModuleIdentity,
        /// The first few underlying failure messages.
        failures: Vec<String>,
        /// Complete underlying error.
        #[source]
        source: TypeLoadError,
    },

    /// A module manifest failed validation.
    #[error("manifest error: {message}")]
    Manifest {
        /// Description of the validation failure.
        message: String,
    },

    /// A process-wide registry has already been installed.
    #[error("a process-wide type registry is already installed")]
    AlreadyInstalled,
}

impl CatalogError {
    /// Creates a scan failure quoting at most [`MAX_REPORTED_FAILURES`]
    /// underlying messages.
    #[must_use]
    pub fn scan_failure(module: ModuleIdentity, source: TypeLoadError) -> Self {
        let failures = source
            .failures()
            .iter()
            .take(MAX_REPORTED_FAILURES)
            .cloned()
            .collect();
        Self::ScanFailure {
            module,
            failures,
            source,
        }
    }

    /// Creates a manifest validation error.
    #[must_use]
    pub fn manifest(message: impl Into<String>) -> Self {
        Self::Manifest {
            message: message.into(),
        }
    }
}

/// A referenced module could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModuleLoadError {
    /// No module with the identity is known to the source.
    #[error("module {identity} not found")]
    NotFound {
        /// Identity that was requested.
        identity: ModuleIdentity,
    },

    /// The module exists but refused to load.
    #[error("module {identity} failed to load: {message}")]
    Failed {
        /// Identity that was requested.
        identity: ModuleIdentity,
        /// Human-readable failure description.
        message: String,
    },
}

/// A module's declared types could not all be loaded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} type(s) failed to load", failures.len())]
pub struct TypeLoadError {
    failures: Vec<String>,
}

impl TypeLoadError {
    /// Creates an error from the individual load failure messages.
    #[must_use]
    pub const fn new(failures: Vec<String>) -> Self {
        Self { failures }
    }

    /// Returns every underlying failure message.
    #[must_use]
    pub fn failures(&self) -> &[String] {
        &self.failures
    }
}
