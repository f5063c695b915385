//! Domain event contract.

use eventgate_catalog::{Capability, TypeDescriptor, TypeKind};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// A fact that can be decoded from a request and queued.
///
/// Implementors name themselves with the same qualified name their plugin
/// module declares, which is how dispatch links a catalog entry to the
/// handler for the concrete type.
///
/// # Example
///
/// ```
/// use eventgate_dispatch::DomainEvent;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Default, Serialize, Deserialize)]
/// struct OrderPlaced {
///     order: u64,
/// }
///
/// impl DomainEvent for OrderPlaced {
///     const NAME: &'static str = "Sales.OrderPlaced";
/// }
///
/// assert!(OrderPlaced::type_descriptor().is_domain_event());
/// ```
pub trait DomainEvent: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Qualified type name.
    const NAME: &'static str;

    /// Returns the catalog descriptor for this event type.
    #[must_use]
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::new(Self::NAME, TypeKind::Class).with_capability(Capability::DomainEvent)
    }
}
