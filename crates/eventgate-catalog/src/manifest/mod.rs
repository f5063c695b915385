//! Descriptor types for plugin modules and the types they declare.
//!
//! A [`ModuleDescriptor`] identifies a unit of compiled code contributing
//! types to the catalog. A [`TypeDescriptor`] describes one declared type:
//! its qualified name, its kind, and the capability flags the dispatcher
//! checks before handing values of that type to collaborators.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Name and version uniquely identifying a module.
///
/// # Example
///
/// ```
/// use eventgate_catalog::ModuleIdentity;
///
/// let identity = ModuleIdentity::new("sales", "1.2.0");
/// assert_eq!(identity.to_string(), "sales@1.2.0");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModuleIdentity {
    name: String,
    version: String,
}

impl ModuleIdentity {
    /// Creates a new identity.
    #[must_use]
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    /// Returns the module name.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the module version.
    #[must_use]
    pub const fn version(&self) -> &str {
        self.version.as_str()
    }
}

impl fmt::Display for ModuleIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

/// How a module came to exist in the process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleOrigin {
    /// Compiled ahead of time and registered at startup.
    #[default]
    Static,
    /// Generated at runtime; never scanned.
    Generated,
}

/// Immutable description of a discovered module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    identity: ModuleIdentity,
    #[serde(default)]
    location: Option<PathBuf>,
    #[serde(default)]
    origin: ModuleOrigin,
    #[serde(default)]
    references: Vec<ModuleIdentity>,
    #[serde(default)]
    declared_types: Vec<String>,
}

impl ModuleDescriptor {
    /// Creates a static module descriptor with no location or references.
    #[must_use]
    pub const fn new(identity: ModuleIdentity) -> Self {
        Self {
            identity,
            location: None,
            origin: ModuleOrigin::Static,
            references: Vec::new(),
            declared_types: Vec::new(),
        }
    }

    /// Records the file the module was loaded from.
    #[must_use]
    pub fn located_at(mut self, location: impl Into<PathBuf>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Marks the module as generated at runtime.
    #[must_use]
    pub const fn generated(mut self) -> Self {
        self.origin = ModuleOrigin::Generated;
        self
    }

    /// Declares the modules this module references directly.
    #[must_use]
    pub fn with_references(mut self, references: Vec<ModuleIdentity>) -> Self {
        self.references = references;
        self
    }

    /// Declares the qualified names of the types this module exposes.
    #[must_use]
    pub fn with_declared_types(mut self, declared_types: Vec<String>) -> Self {
        self.declared_types = declared_types;
        self
    }

    /// Returns the module identity.
    #[must_use]
    pub const fn identity(&self) -> &ModuleIdentity {
        &self.identity
    }

    /// Returns the module file location, when known.
    #[must_use]
    pub fn location(&self) -> Option<&Path> {
        self.location.as_deref()
    }

    /// Returns the module origin.
    #[must_use]
    pub const fn origin(&self) -> ModuleOrigin {
        self.origin
    }

    /// Returns `true` for modules generated at runtime.
    #[must_use]
    pub fn is_generated(&self) -> bool {
        self.origin == ModuleOrigin::Generated
    }

    /// Returns the direct references.
    #[must_use]
    pub fn references(&self) -> &[ModuleIdentity] {
        &self.references
    }

    /// Returns the qualified names of the declared types.
    #[must_use]
    pub fn declared_types(&self) -> &[String] {
        &self.declared_types
    }
}

/// Structural kind of a declared type.
///
/// Only [`TypeKind::Class`] and [`TypeKind::Interface`] enter the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    /// A concrete data type.
    Class,
    /// An abstract contract.
    Interface,
    /// A plain value type.
    ValueType,
    /// An enumeration.
    Enumeration,
    /// A callable signature.
    Delegate,
}

impl TypeKind {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Interface => "interface",
            Self::ValueType => "value_type",
            Self::Enumeration => "enumeration",
            Self::Delegate => "delegate",
        }
    }

    /// Returns `true` for kinds retained by the registry.
    #[must_use]
    pub const fn is_registrable(self) -> bool {
        matches!(self, Self::Class | Self::Interface)
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capability contracts a type may satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    /// A fact to be recorded and queued.
    DomainEvent,
}

impl Capability {
    /// Returns the canonical kebab-case string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DomainEvent => "domain-event",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Description of one declared type.
///
/// # Example
///
/// ```
/// use eventgate_catalog::{Capability, TypeDescriptor, TypeKind};
///
/// let placed = TypeDescriptor::new("Sales.OrderPlaced", TypeKind::Class)
///     .with_capability(Capability::DomainEvent);
/// assert!(placed.is_domain_event());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    qualified_name: String,
    kind: TypeKind,
    #[serde(default)]
    module: Option<ModuleIdentity>,
    #[serde(default)]
    capabilities: Vec<Capability>,
}

impl TypeDescriptor {
    /// Creates a descriptor with no capabilities.
    #[must_use]
    pub fn new(qualified_name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            kind,
            module: None,
            capabilities: Vec::new(),
        }
    }

    /// Adds a capability flag, ignoring duplicates.
    #[must_use]
    pub fn with_capability(mut self, capability: Capability) -> Self {
        if !self.capabilities.contains(&capability) {
            self.capabilities.push(capability);
        }
        self
    }

    /// Records the declaring module.
    #[must_use]
    pub fn declared_in(mut self, module: ModuleIdentity) -> Self {
        self.module = Some(module);
        self
    }

    /// Returns the fully qualified name.
    #[must_use]
    pub const fn qualified_name(&self) -> &str {
        self.qualified_name.as_str()
    }

    /// Returns the type kind.
    #[must_use]
    pub const fn kind(&self) -> TypeKind {
        self.kind
    }

    /// Returns the declaring module, when recorded.
    #[must_use]
    pub const fn module(&self) -> Option<&ModuleIdentity> {
        self.module.as_ref()
    }

    /// Returns the capability flags.
    #[must_use]
    pub fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }

    /// Returns `true` when the type carries `capability`.
    #[must_use]
    pub fn has_capability(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    /// Returns `true` when the type is a domain event.
    #[must_use]
    pub fn is_domain_event(&self) -> bool {
        self.has_capability(Capability::DomainEvent)
    }
}

#[cfg(test)]
mod tests;
