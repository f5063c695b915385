//! Predicates deciding which modules discovery must skip.

use std::path::Path;

use eventgate_config::Config;

use crate::manifest::{ModuleDescriptor, ModuleIdentity};

/// File-name and module-name exclusion rules applied during discovery.
///
/// File patterns match the module's file name case-insensitively; a trailing
/// `*` matches any suffix. Module rules match name prefixes
/// case-insensitively.
///
/// # Example
///
/// ```
/// use eventgate_catalog::{ExclusionPolicy, ModuleIdentity};
///
/// let policy = ExclusionPolicy::default().with_module_prefix("std");
/// assert!(policy.excludes_module(&ModuleIdentity::new("std-runtime", "1.0")));
/// assert!(!policy.excludes_module(&ModuleIdentity::new("sales", "1.0")));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionPolicy {
    file_patterns: Vec<String>,
    module_prefixes: Vec<String>,
}

impl ExclusionPolicy {
    /// Builds a policy from the configured exclusion lists.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let with_files = config
            .excluded_files()
            .iter()
            .fold(Self::default(), |acc, pattern| acc.with_file_pattern(pattern));
        config
            .excluded_modules()
            .iter()
            .fold(with_files, |acc, prefix| acc.with_module_prefix(prefix))
    }

    /// Adds a file-name pattern. Blank patterns are ignored.
    #[must_use]
    pub fn with_file_pattern(mut self, pattern: impl AsRef<str>) -> Self {
        let pattern = pattern.as_ref().trim();
        if !pattern.is_empty() {
            self.file_patterns.push(pattern.to_ascii_lowercase());
        }
        self
    }

    /// Adds a module-name prefix.
    ///
    /// Blank prefixes are ignored, since every name starts with the empty
    /// string.
    #[must_use]
    pub fn with_module_prefix(mut self, prefix: impl AsRef<str>) -> Self {
        let prefix = prefix.as_ref().trim();
        if !prefix.is_empty() {
            self.module_prefixes.push(prefix.to_ascii_lowercase());
        }
        self
    }

    /// Returns `true` when the module file matches a file pattern.
    #[must_use]
    pub fn excludes_file(&self, location: &Path) -> bool {
        let Some(file_name) = location.file_name().and_then(|name| name.to_str()) else {
            return false;
        };
        let lowered = file_name.to_ascii_lowercase();
        self.file_patterns
            .iter()
            .any(|pattern| {
                pattern.strip_suffix('*').map_or_else(
                    || lowered == *pattern,
                    |prefix| lowered.starts_with(prefix),
                )
            })
    }

    /// Returns `true` when the module name matches a module prefix.
    #[must_use]
    pub fn excludes_module(&self, identity: &ModuleIdentity) -> bool {
        let name = identity.name().to_ascii_lowercase();
        self.module_prefixes
            .iter()
            .any(|prefix| name.starts_with(prefix.as_str()))
    }

    /// Returns `true` when either predicate rejects the module.
    #[must_use]
    pub fn excludes(&self, module: &ModuleDescriptor) -> bool {
        module
            .location()
            .is_some_and(|location| self.excludes_file(location))
            || self.excludes_module(module.identity())
    }
}
