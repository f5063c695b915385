//! Event store boundary.
//!
//! Handlers hand every decoded event to an [`EventStore`] resolved from the
//! call's service locator. The store reports security violations separately
//! from ordinary failures so dispatch can let the former through untouched.

use std::any::Any;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use serde_json::Value;
use thiserror::Error;

use crate::security::SecurityFault;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Failure reported by an [`EventStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store refused the event for security reasons.
    #[error(transparent)]
    Security(#[from] SecurityFault),

    /// The store failed for any other reason.
    #[error("{message}")]
    Failure {
        /// Human-readable failure description.
        message: String,
        /// Underlying cause, when known.
        #[source]
        source: Option<BoxedSource>,
    },
}

impl StoreError {
    /// Creates an ordinary failure with no underlying cause.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an ordinary failure wrapping `source`.
    #[must_use]
    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Failure {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// A decoded event on its way to the store.
#[derive(Clone)]
pub struct QueuedEvent {
    name: &'static str,
    payload: Value,
    value: Arc<dyn Any + Send + Sync>,
}

impl fmt::Debug for QueuedEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueuedEvent")
            .field("name", &self.name)
            .field("payload", &self.payload)
            .finish_non_exhaustive()
    }
}

impl QueuedEvent {
    /// Wraps a typed event together with its canonical payload.
    #[must_use]
    pub fn new<E: Any + Send + Sync>(name: &'static str, payload: Value, value: E) -> Self {
        Self {
            name,
            payload,
            value: Arc::new(value),
        }
    }

    /// Returns the qualified event type name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the event as a JSON tree.
    #[must_use]
    pub const fn payload(&self) -> &Value {
        &self.payload
    }

    /// Returns the typed event when it is an `E`.
    #[must_use]
    pub fn downcast_ref<E: Any>(&self) -> Option<&E> {
        self.value.downcast_ref::<E>()
    }
}

/// Destination for queued events.
#[cfg_attr(test, mockall::automock)]
pub trait EventStore: Send + Sync {
    /// Queues an event for later processing.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Security`] when the store rejects the event for
    /// security reasons, and [`StoreError::Failure`] otherwise.
    fn queue(&self, event: QueuedEvent) -> Result<(), StoreError>;
}

/// [`EventStore`] keeping events in memory, in queue order.
#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    events: Mutex<Vec<QueuedEvent>>,
}

impl InMemoryEventStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of the queued events.
    #[must_use]
    pub fn events(&self) -> Vec<QueuedEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the number of queued events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` when nothing was queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventStore for InMemoryEventStore {
    fn queue(&self, event: QueuedEvent) -> Result<(), StoreError> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
        Ok(())
    }
}
