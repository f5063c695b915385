//! Command dispatch and event queuing over the eventgate type catalog.
//!
//! A caller hands [`CommandDispatcher::execute`] a serialized [`Argument`]
//! naming an event type. The dispatcher resolves the name through the
//! [`eventgate_catalog::TypeRegistry`], checks that the type is a domain
//! event and that the [`Principal`] may access it, then asks a memoized
//! per-type [`QueueHandler`] to decode the payload and queue it on the
//! [`EventStore`] found in the call's [`ServiceLocator`].
//!
//! # Architecture
//!
//! Dispatch is generic over the caller's wire formats. Each [`Codec`] maps
//! its format to a [`serde_json::Value`] tree, and handlers turn that tree
//! into the concrete event type with `serde`. Handlers come from a
//! [`HandlerTable`] of factories keyed by qualified type name; the
//! [`HandlerCache`] builds each one on first use and shares it afterwards.
//!
//! Recoverable failures are reported through [`CommandResult`]. Only store
//! security violations and catalog scan failures escape as a
//! [`DispatchFault`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use eventgate_catalog::{ExclusionPolicy, ModuleIdentity, ModuleManifest, PluginManifest, TypeRegistry};
//! use eventgate_dispatch::{
//!     CommandDispatcher, DomainEvent, EventStore, HandlerTable, InMemoryEventStore, JsonCodec,
//!     PermissionManager, Principal, ServiceRegistry, StatusCode,
//! };
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Default, Serialize, Deserialize)]
//! struct OrderPlaced {
//!     order: u64,
//! }
//!
//! impl DomainEvent for OrderPlaced {
//!     const NAME: &'static str = "Sales.OrderPlaced";
//! }
//!
//! struct AllowAll;
//!
//! impl PermissionManager for AllowAll {
//!     fn can_access(&self, _resource: &str, _principal: &Principal) -> bool {
//!         true
//!     }
//! }
//!
//! let mut manifest = PluginManifest::new();
//! manifest
//!     .register(
//!         ModuleManifest::new(ModuleIdentity::new("sales", "1.0"))
//!             .declare(OrderPlaced::type_descriptor()),
//!     )
//!     .expect("registration succeeds");
//! let registry = Arc::new(TypeRegistry::new(Arc::new(manifest), ExclusionPolicy::default()));
//!
//! let mut handlers = HandlerTable::new();
//! handlers.register::<OrderPlaced>();
//! let dispatcher = CommandDispatcher::new(registry, Arc::new(AllowAll), handlers);
//!
//! let store: Arc<dyn EventStore> = Arc::new(InMemoryEventStore::new());
//! let services = ServiceRegistry::new().with(store);
//! let raw = r#"{"name":"Sales.OrderPlaced","data":{"order":1}}"#.to_owned();
//! let result = dispatcher
//!     .execute::<String, String>(&services, &JsonCodec, &JsonCodec, &Principal::new("alice"), &raw)
//!     .expect("no security fault");
//! assert_eq!(result.status, StatusCode::Accepted);
//! ```

pub mod argument;
pub mod cache;
pub mod codec;
pub mod dispatcher;
pub mod event;
pub mod handler;
pub mod locator;
pub mod result;
pub mod security;
pub mod store;
pub mod telemetry;

pub use argument::{Argument, EXAMPLE_EVENT_NAME};
pub use cache::HandlerCache;
pub use codec::{Codec, CodecError, JsonCodec};
pub use dispatcher::{CommandDispatcher, DispatchFault, EVENT_QUEUED};
pub use event::DomainEvent;
pub use handler::{
    DESERIALIZATION_MESSAGE, EventHandler, HandlerError, HandlerTable, QueueHandler,
    SERIALIZATION_MESSAGE,
};
pub use locator::{LocatorError, ServiceLocator, ServiceRegistry};
pub use result::{CommandResult, StatusCode};
pub use security::{PermissionManager, Principal, SecurityFault};
pub use store::{EventStore, InMemoryEventStore, QueuedEvent, StoreError};
pub use telemetry::{TelemetryError, TelemetryHandle};
