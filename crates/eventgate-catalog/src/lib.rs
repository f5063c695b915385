//! Build-once catalog of plugin modules and the types they declare.
//!
//! The `eventgate-catalog` crate answers one question for the dispatcher:
//! given a qualified type name, which type does it denote and what can that
//! type do? Modules describe themselves through a [`ModuleSource`], normally
//! a [`PluginManifest`] populated at startup. The [`TypeRegistry`] discovers
//! loaded modules and their direct references, skips generated and excluded
//! modules, and keeps every class and interface they declare.
//!
//! # Architecture
//!
//! Discovery is lazy. The first call to [`TypeRegistry::modules`] or
//! [`TypeRegistry::all_types`] performs the scan; every later call returns
//! the cached result. Concurrent first callers wait on the in-flight scan
//! instead of racing to build their own. A failed type scan is never cached:
//! the registry discards the attempt and reports [`CatalogError::ScanFailure`],
//! so a later call starts again from module discovery.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use eventgate_catalog::{
//!     Capability, ExclusionPolicy, ModuleIdentity, ModuleManifest, PluginManifest,
//!     TypeDescriptor, TypeKind, TypeRegistry,
//! };
//!
//! let mut manifest = PluginManifest::new();
//! manifest
//!     .register(
//!         ModuleManifest::new(ModuleIdentity::new("sales", "1.0")).declare(
//!             TypeDescriptor::new("Sales.OrderPlaced", TypeKind::Class)
//!                 .with_capability(Capability::DomainEvent),
//!         ),
//!     )
//!     .expect("registration succeeds");
//!
//! let registry = TypeRegistry::new(Arc::new(manifest), ExclusionPolicy::default());
//! let placed = registry
//!     .find("Sales.OrderPlaced")
//!     .expect("scan succeeds")
//!     .expect("type is registered");
//! assert!(placed.is_domain_event());
//! ```

pub mod error;
pub mod exclusion;
pub mod manifest;
pub mod registry;
pub mod source;

#[cfg(test)]
mod tests;

pub use error::{CatalogError, MAX_REPORTED_FAILURES, ModuleLoadError, TypeLoadError};
pub use exclusion::ExclusionPolicy;
pub use manifest::{
    Capability, ModuleDescriptor, ModuleIdentity, ModuleOrigin, TypeDescriptor, TypeKind,
};
pub use registry::{TypeRegistry, TypeSet};
pub use source::{ModuleManifest, ModuleSource, PluginManifest};
