//! Lazily built, process-wide catalog of plugin modules and their types.
//!
//! The [`TypeRegistry`] asks its [`ModuleSource`] for loaded modules, follows
//! their direct references, and enumerates the class and interface types each
//! resolved module declares. Discovery runs on first access and its result is
//! kept for the lifetime of the registry, even if the source changes later.
//!
//! A module whose types cannot be enumerated aborts the whole scan. The
//! partially built generation is discarded so the next call starts again from
//! module discovery, and the caller receives [`CatalogError::ScanFailure`].
//! The registry never serves a silently incomplete catalog.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use once_cell::sync::OnceCell;
use tracing::{debug, error, info, warn};

use crate::error::CatalogError;
use crate::exclusion::ExclusionPolicy;
use crate::manifest::{ModuleDescriptor, ModuleIdentity, TypeDescriptor};
use crate::source::ModuleSource;

/// Tracing target for catalog operations.
pub(crate) const CATALOG_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::catalog");

static GLOBAL_REGISTRY: OnceCell<Arc<TypeRegistry>> = OnceCell::new();

/// Ordered set of discovered types with lookup by qualified name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeSet {
    types: Vec<TypeDescriptor>,
    by_name: HashMap<String, usize>,
}

impl TypeSet {
    fn new(types: Vec<TypeDescriptor>) -> Self {
        let mut by_name = HashMap::with_capacity(types.len());
        for (position, descriptor) in types.iter().enumerate() {
            by_name
                .entry(descriptor.qualified_name().to_owned())
                .or_insert(position);
        }
        Self { types, by_name }
    }

    /// Looks up a type by qualified name.
    ///
    /// When several modules declare the same name, the first one discovered
    /// wins.
    #[must_use]
    pub fn find(&self, qualified_name: &str) -> Option<&TypeDescriptor> {
        self.by_name
            .get(qualified_name)
            .and_then(|position| self.types.get(*position))
    }

    /// Iterates over the types in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.types.iter()
    }

    /// Returns the types as a slice in discovery order.
    #[must_use]
    pub fn as_slice(&self) -> &[TypeDescriptor] {
        &self.types
    }

    /// Returns the number of types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns `true` when no types were discovered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// One scan attempt. Replaced wholesale when its type scan fails.
#[derive(Default)]
struct Generation {
    modules: OnceCell<Arc<[ModuleDescriptor]>>,
    types: OnceCell<Arc<TypeSet>>,
}

/// Build-once catalog of modules and types.
///
/// Type scans and generation resets are serialised by a build lock.
/// Concurrent first callers wait for the single in-flight scan and then read
/// its result, or start over on a fresh generation if it failed. A failed
/// scan can therefore never discard a catalog committed by a sibling.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use eventgate_catalog::{
///     Capability, ExclusionPolicy, ModuleIdentity, ModuleManifest, PluginManifest,
///     TypeDescriptor, TypeKind, TypeRegistry,
/// };
///
/// let mut manifest = PluginManifest::new();
/// manifest
///     .register(ModuleManifest::new(ModuleIdentity::new("sales", "1.0")).declare(
///         TypeDescriptor::new("Sales.OrderPlaced", TypeKind::Class)
///             .with_capability(Capability::DomainEvent),
///     ))
///     .expect("registration succeeds");
///
/// let registry = TypeRegistry::new(Arc::new(manifest), ExclusionPolicy::default());
/// let types = registry.all_types().expect("scan succeeds");
/// assert!(types.find("Sales.OrderPlaced").is_some());
/// ```
pub struct TypeRegistry {
    source: Arc<dyn ModuleSource>,
    exclusions: RwLock<ExclusionPolicy>,
    generation: RwLock<Arc<Generation>>,
    build: Mutex<()>,
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let generation = self.current();
        f.debug_struct("TypeRegistry")
            .field("modules", &generation.modules.get().map(|modules| modules.len()))
            .field("types", &generation.types.get().map(|types| types.len()))
            .finish_non_exhaustive()
    }
}

impl TypeRegistry {
    /// Creates a registry over `source`. Nothing is scanned until first use.
    #[must_use]
    pub fn new(source: Arc<dyn ModuleSource>, exclusions: ExclusionPolicy) -> Self {
        Self {
            source,
            exclusions: RwLock::new(exclusions),
            generation: RwLock::new(Arc::new(Generation::default())),
            build: Mutex::new(()),
        }
    }

    /// Installs `registry` as the process-wide registry.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::AlreadyInstalled`] if a registry was installed
    /// earlier.
    pub fn install_global(registry: Arc<Self>) -> Result<Arc<Self>, CatalogError> {
        GLOBAL_REGISTRY
            .try_insert(registry)
            .map(Arc::clone)
            .map_err(|_| CatalogError::AlreadyInstalled)
    }

    /// Returns the process-wide registry, if one was installed.
    #[must_use]
    pub fn global() -> Option<Arc<Self>> {
        GLOBAL_REGISTRY.get().cloned()
    }

    /// Adds a module-name exclusion for scans that have not yet succeeded.
    ///
    /// Modules discovered by an unfinished generation are dropped so the next
    /// call rediscovers them under the new rule. A catalog that was already
    /// built is left untouched. A blank prefix would exclude every module and
    /// is ignored.
    pub fn exclude_module(&self, prefix: &str) {
        if prefix.trim().is_empty() {
            warn!(target: CATALOG_TARGET, "ignoring blank module exclusion");
            return;
        }
        let _build = self.build.lock().unwrap_or_else(PoisonError::into_inner);
        {
            let mut exclusions = self
                .exclusions
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            *exclusions = exclusions.clone().with_module_prefix(prefix);
        }
        let mut generation = self
            .generation
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if generation.types.get().is_none() {
            *generation = Arc::new(Generation::default());
        }
    }

    /// Returns the discovered modules, scanning on first use.
    #[must_use]
    pub fn modules(&self) -> Arc<[ModuleDescriptor]> {
        let generation = self.current();
        Arc::clone(
            generation
                .modules
                .get_or_init(|| self.discover_modules()),
        )
    }

    /// Returns every discovered class and interface, scanning on first use.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::ScanFailure`] when a module's types cannot be
    /// enumerated. The next call restarts discovery from scratch.
    pub fn all_types(&self) -> Result<Arc<TypeSet>, CatalogError> {
        if let Some(types) = self.current().types.get() {
            return Ok(Arc::clone(types));
        }
        let _build = self.build.lock().unwrap_or_else(PoisonError::into_inner);
        let generation = self.current();
        let scanned = generation.types.get_or_try_init(|| {
            let modules = generation
                .modules
                .get_or_init(|| self.discover_modules());
            self.scan_types(modules).map(Arc::new)
        });
        scanned.map(Arc::clone).map_err(|scan_error| {
            self.discard(&generation);
            scan_error
        })
    }

    /// Looks up a type by qualified name, scanning on first use.
    ///
    /// # Errors
    ///
    /// Propagates scan failures from [`TypeRegistry::all_types`].
    pub fn find(&self, qualified_name: &str) -> Result<Option<TypeDescriptor>, CatalogError> {
        Ok(self.all_types()?.find(qualified_name).cloned())
    }

    fn current(&self) -> Arc<Generation> {
        Arc::clone(
            &self
                .generation
                .read()
                .unwrap_or_else(PoisonError::into_inner),
        )
    }

    /// Replaces `failed` with a fresh generation while it is still current
    /// and holds no committed catalog. Callers hold the build lock.
    fn discard(&self, failed: &Arc<Generation>) {
        let mut generation = self
            .generation
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if Arc::ptr_eq(&generation, failed) && failed.types.get().is_none() {
            *generation = Arc::new(Generation::default());
        }
    }

    fn discover_modules(&self) -> Arc<[ModuleDescriptor]> {
        let exclusions = self
            .exclusions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        debug!(target: CATALOG_TARGET, "discovering plugin modules");

        let mut pending = UniqueIdentities::default();
        for module in self.source.loaded_modules() {
            if module.is_generated() || exclusions.excludes(&module) {
                debug!(target: CATALOG_TARGET, module = %module.identity(), "skipping module");
                continue;
            }
            pending.push(module.identity().clone());
            for reference in module.references() {
                if !exclusions.excludes_module(reference) {
                    pending.push(reference.clone());
                }
            }
        }

        let mut resolved = Vec::new();
        let mut seen = HashSet::new();
        for identity in pending.into_inner() {
            match self.source.load(&identity) {
                Ok(module) => {
                    if module.is_generated() || exclusions.excludes_module(module.identity()) {
                        continue;
                    }
                    if seen.insert(module.identity().clone()) {
                        resolved.push(module);
                    }
                }
                Err(load_error) => {
                    warn!(
                        target: CATALOG_TARGET,
                        module = %identity,
                        error = %load_error,
                        "skipping module that failed to load"
                    );
                }
            }
        }

        info!(target: CATALOG_TARGET, modules = resolved.len(), "module discovery complete");
        resolved.into()
    }

    fn scan_types(&self, modules: &[ModuleDescriptor]) -> Result<TypeSet, CatalogError> {
        let mut types = Vec::new();
        for module in modules {
            let declared = self.source.declared_types(module).map_err(|source| {
                error!(
                    target: CATALOG_TARGET,
                    module = %module.identity(),
                    failures = source.failures().len(),
                    "type scan aborted"
                );
                CatalogError::scan_failure(module.identity().clone(), source)
            })?;
            types.extend(
                declared
                    .into_iter()
                    .filter(|descriptor| descriptor.kind().is_registrable()),
            );
        }
        info!(target: CATALOG_TARGET, types = types.len(), "type scan complete");
        Ok(TypeSet::new(types))
    }
}

/// Insertion-ordered set of module identities.
#[derive(Default)]
struct UniqueIdentities {
    order: Vec<ModuleIdentity>,
    seen: HashSet<ModuleIdentity>,
}

impl UniqueIdentities {
    fn push(&mut self, identity: ModuleIdentity) {
        if self.seen.insert(identity.clone()) {
            self.order.push(identity);
        }
    }

    fn into_inner(self) -> Vec<ModuleIdentity> {
        self.order
    }
}

#[cfg(test)]
mod tests;
