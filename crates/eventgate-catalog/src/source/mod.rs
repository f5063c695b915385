//! Module sources feeding the type registry.
//!
//! The registry never inspects compiled code itself. It asks a
//! [`ModuleSource`] which modules are loaded, resolves references through it,
//! and asks it for each module's declared types. [`PluginManifest`] is the
//! explicit, registration-based source used in production: plugins describe
//! their modules and types at startup instead of being discovered by
//! reflection.

use std::collections::HashMap;

use crate::error::{CatalogError, ModuleLoadError, TypeLoadError};
use crate::manifest::{ModuleDescriptor, ModuleIdentity, TypeDescriptor};

/// Supplier of modules and their declared types.
#[cfg_attr(test, mockall::automock)]
pub trait ModuleSource: Send + Sync {
    /// Returns every module currently loaded in the process.
    fn loaded_modules(&self) -> Vec<ModuleDescriptor>;

    /// Resolves a module by identity.
    ///
    /// # Errors
    ///
    /// Returns a [`ModuleLoadError`] when the module cannot be resolved.
    fn load(&self, identity: &ModuleIdentity) -> Result<ModuleDescriptor, ModuleLoadError>;

    /// Enumerates the types a module declares.
    ///
    /// # Errors
    ///
    /// Returns a [`TypeLoadError`] when any declared type cannot be loaded.
    fn declared_types(&self, module: &ModuleDescriptor)
    -> Result<Vec<TypeDescriptor>, TypeLoadError>;
}

/// Registration entry describing one plugin module and its types.
///
/// # Example
///
/// ```
/// use eventgate_catalog::{Capability, ModuleIdentity, ModuleManifest, TypeDescriptor, TypeKind};
///
/// let sales = ModuleManifest::new(ModuleIdentity::new("sales", "1.0"))
///     .declare(
///         TypeDescriptor::new("Sales.OrderPlaced", TypeKind::Class)
///             .with_capability(Capability::DomainEvent),
///     )
///     .declare(TypeDescriptor::new("Sales.Customer", TypeKind::Class));
/// assert_eq!(sales.descriptor().declared_types().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleManifest {
    descriptor: ModuleDescriptor,
    types: Vec<TypeDescriptor>,
    type_failures: Vec<String>,
}

impl ModuleManifest {
    /// Creates a manifest for a static module with no types.
    #[must_use]
    pub const fn new(identity: ModuleIdentity) -> Self {
        Self::from_descriptor(ModuleDescriptor::new(identity))
    }

    /// Creates a manifest around an existing descriptor.
    #[must_use]
    pub const fn from_descriptor(descriptor: ModuleDescriptor) -> Self {
        Self {
            descriptor,
            types: Vec::new(),
            type_failures: Vec::new(),
        }
    }

    /// Declares a type, recording this module as its owner.
    #[must_use]
    pub fn declare(mut self, descriptor: TypeDescriptor) -> Self {
        let owned = descriptor.declared_in(self.descriptor.identity().clone());
        let mut names = self.descriptor.declared_types().to_vec();
        names.push(owned.qualified_name().to_owned());
        self.descriptor = self.descriptor.with_declared_types(names);
        self.types.push(owned);
        self
    }

    /// Records a type that failed to load, making enumeration fail.
    #[must_use]
    pub fn with_type_failure(mut self, message: impl Into<String>) -> Self {
        self.type_failures.push(message.into());
        self
    }

    /// Records a direct reference to another module.
    #[must_use]
    pub fn references(mut self, identity: ModuleIdentity) -> Self {
        let mut references = self.descriptor.references().to_vec();
        references.push(identity);
        self.descriptor = self.descriptor.with_references(references);
        self
    }

    /// Records the file the module is loaded from.
    #[must_use]
    pub fn located_at(mut self, location: impl Into<std::path::PathBuf>) -> Self {
        self.descriptor = self.descriptor.located_at(location);
        self
    }

    /// Returns the module descriptor.
    #[must_use]
    pub const fn descriptor(&self) -> &ModuleDescriptor {
        &self.descriptor
    }

    fn validate(&self) -> Result<(), CatalogError> {
        let identity = self.descriptor.identity();
        if identity.name().trim().is_empty() {
            return Err(CatalogError::manifest("module name must not be empty"));
        }
        if let Some(blank) = self
            .types
            .iter()
            .find(|descriptor| descriptor.qualified_name().trim().is_empty())
        {
            return Err(CatalogError::manifest(format!(
                "module {identity} declares a {} with an empty name",
                blank.kind()
            )));
        }
        Ok(())
    }
}

/// Registration-based [`ModuleSource`].
///
/// Every registered module counts as loaded. References resolve against the
/// registered modules; unknown references fail to load and are skipped by
/// discovery.
#[derive(Debug, Clone, Default)]
pub struct PluginManifest {
    modules: Vec<ModuleManifest>,
    index: HashMap<ModuleIdentity, usize>,
}

impl PluginManifest {
    /// Creates an empty manifest.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a module after validation.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Manifest`] if validation fails or if a module
    /// with the same identity is already registered.
    pub fn register(&mut self, module: ModuleManifest) -> Result<(), CatalogError> {
        module.validate()?;
        let identity = module.descriptor().identity().clone();
        if self.index.contains_key(&identity) {
            return Err(CatalogError::manifest(format!(
                "module {identity} is already registered"
            )));
        }
        self.index.insert(identity, self.modules.len());
        self.modules.push(module);
        Ok(())
    }

    /// Returns the number of registered modules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Returns `true` when no modules are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    fn entry(&self, identity: &ModuleIdentity) -> Option<&ModuleManifest> {
        self.index
            .get(identity)
            .and_then(|position| self.modules.get(*position))
    }
}

impl ModuleSource for PluginManifest {
    fn loaded_modules(&self) -> Vec<ModuleDescriptor> {
        self.modules
            .iter()
            .map(|module| module.descriptor().clone())
            .collect()
    }

    fn load(&self, identity: &ModuleIdentity) -> Result<ModuleDescriptor, ModuleLoadError> {
        self.entry(identity)
            .map(|module| module.descriptor().clone())
            .ok_or_else(|| ModuleLoadError::NotFound {
                identity: identity.clone(),
            })
    }

    fn declared_types(
        &self,
        module: &ModuleDescriptor,
    ) -> Result<Vec<TypeDescriptor>, TypeLoadError> {
        let Some(entry) = self.entry(module.identity()) else {
            return Err(TypeLoadError::new(vec![format!(
                "module {} is not registered",
                module.identity()
            )]));
        };
        if entry.type_failures.is_empty() {
            Ok(entry.types.clone())
        } else {
            Err(TypeLoadError::new(entry.type_failures.clone()))
        }
    }
}
