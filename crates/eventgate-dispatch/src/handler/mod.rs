//! Per-type queuing logic and the factories that build it.
//!
//! A [`QueueHandler`] knows one concrete event type: it turns a JSON payload
//! into that type and hands the result to the event store. Handlers are
//! created from a [`HandlerTable`] keyed by qualified type name, since a
//! catalog entry alone carries no way to build a typed value.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::event::DomainEvent;
use crate::locator::{LocatorError, ServiceLocator};
use crate::security::SecurityFault;
use crate::store::{EventStore, QueuedEvent, StoreError};

/// Message reported when a payload cannot become the target event.
pub const DESERIALIZATION_MESSAGE: &str = "Error deserializing domain event.";

/// Message reported when an event cannot be rendered as a JSON tree.
pub const SERIALIZATION_MESSAGE: &str = "Error serializing domain event.";

/// Failures raised while queuing a single event.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// No handler factory is registered for the type.
    #[error("no handler is registered for event type {name}")]
    Unregistered {
        /// Qualified type name.
        name: String,
    },

    /// The payload could not be turned into the event type.
    #[error("Error deserializing domain event.")]
    Deserialization(#[source] serde_json::Error),

    /// The built event could not be rendered for the store.
    #[error("Error serializing domain event.")]
    Serialization(#[source] serde_json::Error),

    /// The call's locator has no event store.
    #[error(transparent)]
    Locator(#[from] LocatorError),

    /// The store rejected the event for security reasons.
    #[error(transparent)]
    Security(SecurityFault),

    /// The store failed to queue the event.
    #[error("{message}")]
    Store {
        /// Store failure message.
        message: String,
        /// The event as sent, when the caller supplied data.
        sent: Option<Value>,
        /// Underlying store error.
        #[source]
        source: StoreError,
    },
}

impl HandlerError {
    fn from_store(source: StoreError, sent: Option<Value>) -> Self {
        match source {
            StoreError::Security(fault) => Self::Security(fault),
            StoreError::Failure { .. } => Self::Store {
                message: source.to_string(),
                sent,
                source,
            },
        }
    }
}

/// Type-erased queuing logic for one event type.
pub trait QueueHandler: Send + Sync {
    /// Qualified name of the event type this handler builds.
    fn event_name(&self) -> &str;

    /// Decodes `data` (or builds the default event when absent) and queues
    /// it on the event store resolved from `locator`.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError`] describing which stage failed.
    fn queue(&self, data: Option<&Value>, locator: &dyn ServiceLocator)
    -> Result<(), HandlerError>;
}

/// [`QueueHandler`] for the concrete event type `E`.
pub struct EventHandler<E> {
    default: fn() -> E,
}

impl<E> fmt::Debug for EventHandler<E>
where
    E: DomainEvent,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHandler")
            .field("event", &E::NAME)
            .finish_non_exhaustive()
    }
}

impl<E: DomainEvent> EventHandler<E> {
    /// Creates a handler using `default` when a request carries no data.
    #[must_use]
    pub const fn new(default: fn() -> E) -> Self {
        Self { default }
    }

    fn build(&self, data: Option<&Value>) -> Result<E, HandlerError> {
        data.map_or_else(
            || Ok((self.default)()),
            |payload| E::deserialize(payload).map_err(HandlerError::Deserialization),
        )
    }
}

impl<E: DomainEvent> QueueHandler for EventHandler<E> {
    fn event_name(&self) -> &str {
        E::NAME
    }

    fn queue(
        &self,
        data: Option<&Value>,
        locator: &dyn ServiceLocator,
    ) -> Result<(), HandlerError> {
        let event = self.build(data)?;
        let payload = serde_json::to_value(&event).map_err(HandlerError::Serialization)?;
        let store = locator.resolve::<Arc<dyn EventStore>>()?;
        let sent = data.map(|_| payload.clone());
        store
            .queue(QueuedEvent::new(E::NAME, payload, event))
            .map_err(|source| HandlerError::from_store(source, sent))
    }
}

type HandlerFactory = Arc<dyn Fn() -> Arc<dyn QueueHandler> + Send + Sync>;

/// Factories building a [`QueueHandler`] per qualified event name.
///
/// # Example
///
/// ```
/// use eventgate_dispatch::{DomainEvent, HandlerTable};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Default, Serialize, Deserialize)]
/// struct OrderPlaced {
///     order: u64,
/// }
///
/// impl DomainEvent for OrderPlaced {
///     const NAME: &'static str = "Sales.OrderPlaced";
/// }
///
/// let mut table = HandlerTable::new();
/// table.register::<OrderPlaced>();
/// assert!(table.contains("Sales.OrderPlaced"));
/// ```
#[derive(Clone, Default)]
pub struct HandlerTable {
    factories: HashMap<String, HandlerFactory>,
}

impl fmt::Debug for HandlerTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("HandlerTable")
            .field("events", &names)
            .finish()
    }
}

impl HandlerTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `E`, building it with [`Default`] when a request has no
    /// data.
    pub fn register<E: DomainEvent + Default>(&mut self) -> &mut Self {
        self.register_with_default::<E>(E::default)
    }

    /// Registers `E` with an explicit default constructor.
    pub fn register_with_default<E: DomainEvent>(&mut self, default: fn() -> E) -> &mut Self {
        self.register_factory(E::NAME, move || {
            Arc::new(EventHandler::<E>::new(default)) as Arc<dyn QueueHandler>
        })
    }

    /// Registers a custom factory under `name`, replacing any earlier one.
    pub fn register_factory<F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn() -> Arc<dyn QueueHandler> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
        self
    }

    /// Returns `true` when a factory is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Returns the number of registered factories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Returns `true` when no factory is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Builds a fresh handler for `name`.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError::Unregistered`] when no factory exists.
    pub fn create(&self, name: &str) -> Result<Arc<dyn QueueHandler>, HandlerError> {
        self.factories
            .get(name)
            .map(|factory| factory())
            .ok_or_else(|| HandlerError::Unregistered {
                name: name.to_owned(),
            })
    }
}
