//! Memoized handlers, one per event type.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use eventgate_catalog::TypeDescriptor;

use crate::handler::{HandlerError, HandlerTable, QueueHandler};

/// Concurrent cache of [`QueueHandler`]s keyed by qualified type name.
///
/// Lookups never block on construction. Two callers missing the same key at
/// once may both build a handler; the first insert wins and the other
/// instance is dropped, so every caller ends up using the same handler.
pub struct HandlerCache {
    table: HandlerTable,
    handlers: DashMap<String, Arc<dyn QueueHandler>>,
}

impl fmt::Debug for HandlerCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerCache")
            .field("table", &self.table)
            .field("cached", &self.handlers.len())
            .finish()
    }
}

impl HandlerCache {
    /// Creates an empty cache over `table`.
    #[must_use]
    pub fn new(table: HandlerTable) -> Self {
        Self {
            table,
            handlers: DashMap::new(),
        }
    }

    /// Returns the cached handler for `descriptor`, building it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError::Unregistered`] when the table has no factory
    /// for the type.
    pub fn get_or_create(
        &self,
        descriptor: &TypeDescriptor,
    ) -> Result<Arc<dyn QueueHandler>, HandlerError> {
        let name = descriptor.qualified_name();
        if let Some(handler) = self.handlers.get(name) {
            return Ok(Arc::clone(handler.value()));
        }
        let created = self.table.create(name)?;
        let handler = self.handlers.entry(name.to_owned()).or_insert(created);
        Ok(Arc::clone(handler.value()))
    }

    /// Returns the number of cached handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns `true` when no handler has been built yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
