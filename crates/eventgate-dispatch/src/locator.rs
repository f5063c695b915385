//! Per-call service resolution.
//!
//! Handlers do not hold their collaborators. They receive a
//! [`ServiceLocator`] on every call and resolve what they need from it, which
//! keeps cached handlers free of per-tenant or per-request state.

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

/// A required service was not registered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no service registered for {service}")]
pub struct LocatorError {
    service: &'static str,
}

impl LocatorError {
    /// Creates an error naming the missing service type.
    #[must_use]
    pub fn missing<T: ?Sized>() -> Self {
        Self {
            service: type_name::<T>(),
        }
    }

    /// Returns the name of the missing service type.
    #[must_use]
    pub const fn service(&self) -> &'static str {
        self.service
    }
}

/// Object-safe lookup of services by type.
pub trait ServiceLocator: Send + Sync {
    /// Returns the service registered under `id`, if any.
    fn lookup(&self, id: TypeId) -> Option<&(dyn Any + Send + Sync)>;
}

impl dyn ServiceLocator + '_ {
    /// Resolves a service of type `T`.
    ///
    /// # Errors
    ///
    /// Returns [`LocatorError`] when no `T` is registered.
    pub fn resolve<T: Any + Send + Sync>(&self) -> Result<&T, LocatorError> {
        self.lookup(TypeId::of::<T>())
            .and_then(|service| service.downcast_ref::<T>())
            .ok_or_else(LocatorError::missing::<T>)
    }
}

/// Map-backed [`ServiceLocator`].
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use eventgate_dispatch::{EventStore, InMemoryEventStore, ServiceLocator, ServiceRegistry};
///
/// let store: Arc<dyn EventStore> = Arc::new(InMemoryEventStore::new());
/// let services = ServiceRegistry::new().with(store);
/// let locator: &dyn ServiceLocator = &services;
/// assert!(locator.resolve::<Arc<dyn EventStore>>().is_ok());
/// ```
#[derive(Default)]
pub struct ServiceRegistry {
    services: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceRegistry")
            .field("services", &self.services.len())
            .finish()
    }
}

impl ServiceRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `service`, replacing any earlier service of the same type.
    pub fn insert<T: Any + Send + Sync>(&mut self, service: T) {
        self.services.insert(TypeId::of::<T>(), Box::new(service));
    }

    /// Builder form of [`ServiceRegistry::insert`].
    #[must_use]
    pub fn with<T: Any + Send + Sync>(mut self, service: T) -> Self {
        self.insert(service);
        self
    }
}

impl ServiceLocator for ServiceRegistry {
    fn lookup(&self, id: TypeId) -> Option<&(dyn Any + Send + Sync)> {
        self.services.get(&id).map(|service| &**service)
    }
}
